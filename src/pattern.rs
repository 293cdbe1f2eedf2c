//! pattern.rs
//!
//! Builds the regular expressions used to find a [`Phrase`] in text.
//!
//! Each part of a phrase becomes one pattern. Every piece of the part is a
//! capture group holding its tokens, escaped literally, and the tokens are
//! joined by a separator that tolerates whitespace and, for HTML input, tags
//! and `&nbsp;`. Two word tokens in a row need at least one separator
//! character so `to be` does not match `tobe`.
//!
//! For `the woman` the HTML pattern is roughly
//!
//! ```text
//! (the(?:\s|&nbsp;|<[^>]*>)+woman)
//! ```
//!
//! The capture indexes of the pieces are computed here so the marker can
//! check each piece's position (inside a tag? on a word boundary? right
//! occurrence?) without knowing how the pattern was put together.

use regex::Regex;

use crate::occurrence::tokenize_words;
use crate::phrase::{Phrase, PhrasePart};
use crate::regex::{has_tag, is_word_char};

const HTML_GAP: &str = r"(?:\s|&nbsp;|<[^>]*>)";
const TEXT_GAP: &str = r"\s";

/// One piece of a part, located by capture group `group`.
#[derive(Debug, Clone)]
pub struct WordPattern {
    /// The piece split into whole words, as occurrences are counted. The
    /// pattern itself is built from finer tokens so punctuation inside a
    /// word may be spaced differently.
    pub words: Vec<String>,
    /// Required occurrence of the word run in the visible text, 0 for any.
    pub occurrence: u32,
    pub group: usize,
}

/// The compiled pattern of one phrase part.
#[derive(Debug, Clone)]
pub struct PartPattern {
    pub regex: Regex,
    pub words: Vec<WordPattern>,
}

impl PartPattern {
    /// Number of capture groups, the implicit whole-match group included.
    pub fn capture_count(&self) -> usize {
        self.regex.captures_len()
    }

    /// Capture groups whose spans open and close the part's highlight.
    pub fn outer_groups(&self) -> Option<(usize, usize)> {
        Some((self.words.first()?.group, self.words.last()?.group))
    }
}

#[derive(Debug, Clone)]
pub struct PhrasePattern {
    pub parts: Vec<PartPattern>,
}

#[derive(Debug, Clone, Copy)]
pub struct PatternBuilder {
    is_html: bool,
}

fn is_word_token(token: &str) -> bool {
    token.chars().next().map_or(false, is_word_char)
}

impl PatternBuilder {
    pub fn new(is_html: bool) -> Self {
        PatternBuilder { is_html }
    }

    /// Picks HTML separators if `text` contains a tag.
    pub fn for_text(text: &str) -> Self {
        PatternBuilder::new(has_tag(text))
    }

    pub fn is_html(&self) -> bool {
        self.is_html
    }

    fn gap(&self, required: bool) -> String {
        let gap = if self.is_html { HTML_GAP } else { TEXT_GAP };
        format!("{}{}", gap, if required { "+" } else { "*" })
    }

    /// Joins `tokens` into a pattern, starting after `previous` (the last
    /// token already emitted, if any).
    fn push_tokens(&self, pattern: &mut String, tokens: &[&str], mut previous: Option<bool>) {
        for token in tokens {
            let word = is_word_token(token);
            if let Some(previous_word) = previous {
                pattern.push_str(&self.gap(previous_word && word));
            }
            pattern.push_str(&regex::escape(token));
            previous = Some(word);
        }
    }

    /// Pattern for a bare run of tokens, without capture groups.
    pub fn token_pattern(&self, tokens: &[&str]) -> String {
        let mut pattern = String::new();
        self.push_tokens(&mut pattern, tokens, None);
        pattern
    }

    /// Compiles one part. Pieces without tokens are skipped; a part with no
    /// tokens at all gives `None`.
    pub fn build_part(&self, part: &[PhrasePart]) -> Option<PartPattern> {
        let mut pattern = String::new();
        let mut words = Vec::new();
        let mut previous: Option<bool> = None;
        for piece in part {
            let tokens = piece.tokens();
            let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
                continue;
            };
            if let Some(previous_word) = previous {
                pattern.push_str(&self.gap(previous_word && is_word_token(first)));
            }
            pattern.push('(');
            self.push_tokens(&mut pattern, &tokens, None);
            pattern.push(')');
            previous = Some(is_word_token(last));
            words.push(WordPattern {
                words: tokenize_words(&piece.text).into_iter().map(str::to_string).collect(),
                occurrence: piece.occurrence,
                group: words.len() + 1,
            });
        }
        if words.is_empty() {
            return None;
        }
        // Escaped literals and fixed separators always compile.
        let regex = Regex::new(&pattern).ok()?;
        Some(PartPattern { regex, words })
    }

    /// Compiles every non-empty part of `phrase`; `None` if none is left.
    pub fn build(&self, phrase: &Phrase) -> Option<PhrasePattern> {
        let parts: Vec<PartPattern> = phrase
            .parts
            .iter()
            .filter_map(|part| self.build_part(part))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(PhrasePattern { parts })
        }
    }
}
