//! phrase.rs
//!
//! Phrases to be marked in rendered scripture. A [`Phrase`] has the same shape
//! as an [`Alignment`]: a list of parts, each a list of text pieces with their
//! occurrence. Parts are separated by an ellipsis in the source and may have
//! any text between them when matched.
//!
//! A piece's occurrence is the occurrence of that exact text in the verse
//! (0 when unknown), so an alignment can be handed to the marker as is.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::alignment::Alignment;
use crate::config::SmallWords;
use crate::occurrence::tokenize;
use crate::regex::is_word_char;

lazy_static! {
    static ref ELLIPSIS_SPLIT: Regex = Regex::new(r"\s*…\s*|\s*\.\.\.\s*").unwrap();
}

/// A word or text run of a phrase and which occurrence of it is meant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhrasePart {
    #[serde(alias = "word")]
    pub text: String,
    #[serde(default)]
    pub occurrence: u32,
}

impl PhrasePart {
    pub fn new(text: impl Into<String>, occurrence: u32) -> Self {
        PhrasePart {
            text: text.into(),
            occurrence,
        }
    }

    /// Words and punctuation characters of the text.
    pub fn tokens(&self) -> Vec<&str> {
        tokenize(&self.text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phrase {
    pub parts: Vec<Vec<PhrasePart>>,
}

impl Phrase {
    pub fn new(parts: Vec<Vec<PhrasePart>>) -> Self {
        Phrase { parts }
    }

    /// A single-part phrase made of one piece of text.
    pub fn from_text(text: impl Into<String>, occurrence: u32) -> Self {
        Phrase {
            parts: vec![vec![PhrasePart::new(text, occurrence)]],
        }
    }

    /// `true` if the phrase has more than one part.
    pub fn is_split(&self) -> bool {
        self.parts.len() > 1
    }

    /// Parts that contain at least one token.
    pub fn non_empty_parts(&self) -> Vec<&Vec<PhrasePart>> {
        self.parts.iter().filter(|part| !part_tokens(part).is_empty()).collect()
    }

    /// Renders the phrase as a string, parts joined with ` … `.
    pub fn flatten(&self) -> String {
        self.parts
            .iter()
            .map(|part| part.iter().map(|p| p.text.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join(" … ")
    }

    /// Drops empty parts, then leading and trailing parts made only of small
    /// words, as long as more than one part is left. Inner parts are kept.
    pub fn trim_small_words(&self, small_words: &SmallWords) -> Phrase {
        let mut parts: Vec<Vec<PhrasePart>> = self
            .parts
            .iter()
            .filter(|part| !part_tokens(part).is_empty())
            .cloned()
            .collect();
        while parts.len() > 1 && is_small_part(&parts[0], small_words) {
            parts.remove(0);
        }
        while parts.len() > 1 && parts.last().map_or(false, |p| is_small_part(p, small_words)) {
            parts.pop();
        }
        Phrase { parts }
    }
}

impl From<&Alignment> for Phrase {
    fn from(alignment: &Alignment) -> Self {
        Phrase {
            parts: alignment
                .groups
                .iter()
                .map(|group| {
                    group
                        .iter()
                        .map(|f| PhrasePart::new(f.text.clone(), f.occurrence))
                        .collect()
                })
                .collect(),
        }
    }
}

/// Splits a phrase string on ellipses into parts with no occurrence of their
/// own.
pub fn split_string_into_phrase(s: &str) -> Phrase {
    Phrase {
        parts: ELLIPSIS_SPLIT
            .split(s)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| vec![PhrasePart::new(part, 0)])
            .collect(),
    }
}

fn part_tokens(part: &[PhrasePart]) -> Vec<&str> {
    part.iter().flat_map(|p| p.tokens()).collect()
}

/// A part is small if none of its words is outside the small-word set.
fn is_small_part(part: &[PhrasePart], small_words: &SmallWords) -> bool {
    part_tokens(part)
        .into_iter()
        .filter(|t| t.chars().next().map_or(false, is_word_char))
        .all(|word| small_words.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::AlignedFragment;

    #[test]
    fn test_split_string_into_phrase() {
        let phrase = split_string_into_phrase("the woman ... Moabite");
        assert_eq!(
            phrase.parts,
            vec![vec![PhrasePart::new("the woman", 0)], vec![PhrasePart::new("Moabite", 0)]]
        );
        assert!(phrase.is_split());
        assert_eq!(split_string_into_phrase("Hezron…Amminadab").parts.len(), 2);
        assert_eq!(split_string_into_phrase("God").flatten(), "God");
    }

    #[test]
    fn test_trim_small_words_only_at_edges() {
        let small = SmallWords::english();
        let phrase = split_string_into_phrase("I...am");
        assert_eq!(phrase.trim_small_words(&small).flatten(), "am");

        // A part with one real word is kept whole.
        let phrase = split_string_into_phrase("the woman ... Moabite");
        assert_eq!(phrase.trim_small_words(&small), phrase);

        // Inner small parts stay.
        let phrase = split_string_into_phrase("Naomi ... the ... Ruth");
        assert_eq!(phrase.trim_small_words(&small).parts.len(), 3);

        // Never trimmed to nothing.
        let phrase = split_string_into_phrase("to ... be");
        assert_eq!(phrase.trim_small_words(&small).flatten(), "be");
        let phrase = split_string_into_phrase("to be");
        assert_eq!(phrase.trim_small_words(&small), phrase);
    }

    #[test]
    fn test_from_alignment() {
        let alignment = Alignment {
            groups: vec![
                vec![AlignedFragment::new("Paul", 1)],
                vec![
                    AlignedFragment::new("an", 1),
                    AlignedFragment::new(" ", 0),
                    AlignedFragment::new("apostle", 1),
                ],
            ],
        };
        let phrase = Phrase::from(&alignment);
        assert_eq!(phrase.parts[1][2], PhrasePart::new("apostle", 1));
        assert_eq!(phrase.flatten(), "Paul … an apostle");
    }

    #[test]
    fn test_phrase_deserializes_word_or_text() {
        let phrase: Phrase =
            serde_json::from_str(r#"[[{"word": "δίκαιον", "occurrence": 1}, {"text": ",", "occurrence": 4}]]"#)
                .unwrap();
        assert_eq!(phrase.parts[0][0].text, "δίκαιον");
        assert_eq!(phrase.parts[0][1].occurrence, 4);
    }

    #[test]
    fn test_empty_parts_are_skipped() {
        let phrase = Phrase::new(vec![vec![PhrasePart::new(" ", 0)], vec![PhrasePart::new("God", 1)]]);
        assert_eq!(phrase.non_empty_parts().len(), 1);
        assert_eq!(phrase.trim_small_words(&SmallWords::default()).parts.len(), 1);
    }
}
