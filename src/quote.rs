//! quote.rs
//!
//! Original-language quotes as they come from translation notes and word
//! lists, and the expansion of a quote into every contiguous run of its words
//! (its "combinations").
//!
//! A quote is either a list of `{word, occurrence}` records or, in older data,
//! a plain string. Strings are split on whitespace and on the ellipsis marker
//! (`…` or `...`), and every resulting word gets the note's occurrence.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref QUOTE_SPLIT: Regex = Regex::new(r"\s*…\s*|\s*\.\.\.\s*|\s+").unwrap();
}

/// Joins clitics to their host word in OL text.
pub const WORD_JOINER: char = '\u{2060}';

/// One OL token of a quote and which occurrence of it is meant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteWord {
    pub word: String,
    /// 0 when the source record has no occurrence; such words are dropped.
    #[serde(default)]
    pub occurrence: u32,
}

impl QuoteWord {
    pub fn new(word: impl Into<String>, occurrence: u32) -> Self {
        QuoteWord {
            word: word.into(),
            occurrence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quote {
    Text(String),
    Words(Vec<QuoteWord>),
}

impl From<&str> for Quote {
    fn from(s: &str) -> Self {
        Quote::Text(s.to_string())
    }
}

impl From<Vec<QuoteWord>> for Quote {
    fn from(words: Vec<QuoteWord>) -> Self {
        Quote::Words(words)
    }
}

fn is_ellipsis(word: &str) -> bool {
    word == "…" || word == "..."
}

impl Quote {
    /// Reduces the quote to the list of words that have to be matched.
    ///
    /// String quotes are split with [`split_string_into_quote`] using
    /// `default_occurrence`. Word lists lose their ellipsis placeholders and any
    /// word without an occurrence.
    pub fn words(&self, default_occurrence: u32) -> Vec<QuoteWord> {
        match self {
            Quote::Text(s) => split_string_into_quote(s, default_occurrence),
            Quote::Words(words) => words
                .iter()
                .filter(|w| !w.word.is_empty() && !is_ellipsis(&w.word) && w.occurrence > 0)
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Quote::Text(s) => s.trim().is_empty(),
            Quote::Words(words) => words.is_empty(),
        }
    }
}

/// Splits `s` on whitespace and ellipses, giving each word `occurrence`.
pub fn split_string_into_quote(s: &str, occurrence: u32) -> Vec<QuoteWord> {
    QUOTE_SPLIT
        .split(s)
        .filter(|part| !part.is_empty())
        .map(|part| QuoteWord::new(part, occurrence))
        .collect()
}

/// Renders a quote as a single string, word-list quotes joined with `…`.
pub fn flatten_quote(quote: &Quote) -> String {
    match quote {
        Quote::Text(s) => s.clone(),
        Quote::Words(words) => words
            .iter()
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join("…"),
    }
}

/// A contiguous run `quote[i..=j]` of quote words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    pub text: Vec<String>,
    /// The first word's occurrence for a single word, 1 for longer runs.
    pub occurrence: u32,
    /// Positions of the covered words in the quote.
    pub indexes: Vec<usize>,
}

impl Combination {
    /// Returns `true` if a milestone's content spells this run, with words
    /// separated either by a space or by a word joiner.
    pub fn matches_content(&self, content: &str) -> bool {
        let joiner = WORD_JOINER.to_string();
        self.text.join(" ") == content || self.text.join(&joiner) == content
    }
}

/// Expands a quote into all N(N+1)/2 contiguous runs, ordered by start index
/// and then by length.
pub fn get_quote_combinations(quote: &[QuoteWord]) -> Vec<Combination> {
    let mut combinations = Vec::with_capacity(quote.len() * (quote.len() + 1) / 2);
    for i in 0..quote.len() {
        for j in i..quote.len() {
            combinations.push(Combination {
                text: quote[i..=j].iter().map(|w| w.word.clone()).collect(),
                occurrence: if i == j { quote[i].occurrence } else { 1 },
                indexes: (i..=j).collect(),
            });
        }
    }
    combinations
}
