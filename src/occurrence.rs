//! occurrence.rs
//!
//! Word occurrence counting. Occurrence numbers throughout the crate are
//! 1-based and scoped to "this exact token within the enclosing text": the
//! third `the` of a verse has occurrence 3 no matter what else the verse holds.
//!
//! The module also owns the tokenizer used to compare phrase text with the
//! visible text of an HTML fragment, so both sides split words and
//! punctuation the same way.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A word, or one punctuation character.
    static ref TOKEN: Regex = Regex::new(r"\w+|[^\w\s]").unwrap();
    /// A whole word (apostrophes, hyphens and word joiners inside it kept),
    /// or one punctuation character.
    static ref WORD: Regex = Regex::new(r"\w+(?:['’\-\x{2060}]\w+)*|[^\w\s]").unwrap();
    /// Same as `WORD` but steps over tags and non-breaking space entities.
    static ref HTML_WORD: Regex =
        Regex::new(r"(?i)<[^>]*>|&nbsp;|\w+(?:['’\-\x{2060}]\w+)*|[^\w\s]").unwrap();
}

/// A token of visible text with its byte span in the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Returns how many times `tokens[position]` appears in `tokens[..=position]`.
///
/// Comparison is exact and case-sensitive. Returns 0 if `position` is out of
/// range.
pub fn occurrence_of<S: AsRef<str>>(tokens: &[S], position: usize) -> u32 {
    let Some(target) = tokens.get(position) else {
        return 0;
    };
    let target = target.as_ref();
    tokens[..=position]
        .iter()
        .filter(|t| t.as_ref() == target)
        .count() as u32
}

/// Computes [`occurrence_of`] for every position in one pass.
pub fn occurrences<S: AsRef<str>>(tokens: &[S]) -> Vec<u32> {
    let mut seen: std::collections::HashMap<&str, u32> = std::collections::HashMap::new();
    tokens
        .iter()
        .map(|t| {
            let count = seen.entry(t.as_ref()).or_insert(0);
            *count += 1;
            *count
        })
        .collect()
}

/// Generalizes [`occurrence_of`] to a run of tokens.
///
/// If `needle` starts at `position`, returns which (non-overlapping)
/// occurrence of `needle` that is. Returns `None` if `needle` does not start
/// there, is empty, or the run at `position` overlaps an earlier occurrence.
pub fn sequence_occurrence_of<S, T>(tokens: &[S], needle: &[T], position: usize) -> Option<u32>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    if needle.is_empty() {
        return None;
    }
    if needle.len() == 1 {
        let matches = tokens.get(position)?.as_ref() == needle[0].as_ref();
        return matches.then(|| occurrence_of(tokens, position));
    }
    let starts_at = |j: usize| {
        tokens.len() >= j + needle.len()
            && tokens[j..j + needle.len()]
                .iter()
                .zip(needle)
                .all(|(a, b)| a.as_ref() == b.as_ref())
    };
    let mut count = 0;
    let mut j = 0;
    while j <= position {
        if starts_at(j) {
            count += 1;
            if j == position {
                return Some(count);
            }
            j += needle.len();
        } else {
            if j == position {
                return None;
            }
            j += 1;
        }
    }
    None
}

/// Splits plain text into words and single punctuation characters.
pub fn tokenize(text: &str) -> Vec<&str> {
    TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Splits plain text into whole words and punctuation characters, so
/// `God’s` and `daughter-in-law` stay single words.
pub fn tokenize_words(text: &str) -> Vec<&str> {
    WORD.find_iter(text).map(|m| m.as_str()).collect()
}

/// [`tokenize_words`] over the visible text of `html`, skipping tags and
/// `&nbsp;`. Spans refer to byte offsets in `html`.
pub fn tokenize_html_words(html: &str) -> Vec<Token<'_>> {
    HTML_WORD
        .find_iter(html)
        .filter(|m| !m.as_str().starts_with('<') && !m.as_str().eq_ignore_ascii_case("&nbsp;"))
        .map(|m| Token {
            text: m.as_str(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occurrence_of_counts_each_token_in_order() {
        let tokens = ["to", "be", "or", "not", "to", "be"];
        let counts: Vec<u32> = (0..tokens.len()).map(|i| occurrence_of(&tokens, i)).collect();
        assert_eq!(counts, vec![1, 1, 1, 1, 2, 2]);
        assert_eq!(occurrences(&tokens), counts);
    }

    #[test]
    fn test_occurrence_of_is_case_sensitive() {
        let tokens = ["God", "god", "God"];
        assert_eq!(occurrence_of(&tokens, 1), 1);
        assert_eq!(occurrence_of(&tokens, 2), 2);
        assert_eq!(occurrence_of(&tokens, 7), 0);
    }

    #[test]
    fn test_sequence_occurrence_of() {
        let tokens = tokenize("to be or not to be that is the question");
        assert_eq!(sequence_occurrence_of(&tokens, &["to", "be"], 0), Some(1));
        assert_eq!(sequence_occurrence_of(&tokens, &["to", "be"], 4), Some(2));
        assert_eq!(sequence_occurrence_of(&tokens, &["to", "be"], 1), None);
        // Overlapping runs are not counted twice.
        let tokens = ["a", "a", "a"];
        assert_eq!(sequence_occurrence_of(&tokens, &["a", "a"], 0), Some(1));
        assert_eq!(sequence_occurrence_of(&tokens, &["a", "a"], 1), None);
    }

    #[test]
    fn test_tokenize_splits_punctuation() {
        assert_eq!(
            tokenize("her daughter-in-law, was"),
            vec!["her", "daughter", "-", "in", "-", "law", ",", "was"]
        );
    }

    #[test]
    fn test_tokenize_words_keeps_inner_punctuation() {
        assert_eq!(
            tokenize_words("of God’s people, her daughter-in-law’s"),
            vec!["of", "God’s", "people", ",", "her", "daughter-in-law’s"]
        );
        // A trailing apostrophe is punctuation of its own.
        assert_eq!(tokenize_words("brothers’ house"), vec!["brothers", "’", "house"]);
        assert_eq!(tokenize_words("וְ\u{2060}שֵׁם"), vec!["וְ\u{2060}שֵׁם"]);
    }

    #[test]
    fn test_tokenize_html_words() {
        let html = "faith of <b>God’s</b>&nbsp;people";
        let tokens = tokenize_html_words(html);
        let texts: Vec<&str> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["faith", "of", "God’s", "people"]);
        assert_eq!(&html[tokens[2].start..tokens[2].end], "God’s");
    }
}
