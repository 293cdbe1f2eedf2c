//! config.rs
//!
//! Options for phrase marking and the file-level configuration they can be
//! loaded from.
//!
//! - **`MarkOptions`**: wrapping tag, small-word skipping, whole-word
//!   matching and the small-word list to use.
//! - **`SmallWords`**: a case-insensitive stopword set. Parts of a phrase
//!   made only of these words are dropped from the phrase edges so a match
//!   does not hang on a stray "the" or "I".
//! - **`HighlightConfig`**: the TOML form, e.g.
//!
//! ```toml
//! tag = '<span class="highlight">'
//! skip_small_words = true
//! break_on_word = true
//! small_words = ["the", "a", "an"]
//! quotes_to_ignore = ["general information:", "connecting statement:"]
//! ```

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::Result;

/// Tag used when the caller does not supply one.
pub const DEFAULT_TAG: &str = r#"<span class="highlight">"#;

/// Note headings that are not quotes and never get highlighted.
pub const DEFAULT_QUOTES_TO_IGNORE: [&str; 2] = ["general information:", "connecting statement:"];

static ENGLISH_SMALL_WORDS: Lazy<SmallWords> = Lazy::new(|| {
    SmallWords::new([
        "a", "an", "and", "as", "at", "be", "but", "by", "for", "from", "he", "her", "him",
        "his", "i", "if", "in", "into", "is", "it", "its", "me", "my", "nor", "not", "of", "on",
        "or", "our", "she", "so", "that", "the", "their", "them", "then", "they", "this",
        "to", "us", "was", "we", "were", "with", "you", "your",
    ])
});

/// A set of low-information words, compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmallWords(HashSet<String>);

impl SmallWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        SmallWords(words.into_iter().map(|w| w.as_ref().to_lowercase()).collect())
    }

    /// The built-in English list.
    pub fn english() -> Self {
        ENGLISH_SMALL_WORDS.clone()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(&word.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkOptions {
    /// Opening tag wrapped around each matched part; the closing tag is
    /// derived from it.
    pub tag: String,
    /// Drop parts made only of small words from the phrase edges.
    pub skip_small_words: bool,
    /// Only match whole words.
    pub break_on_word: bool,
    pub small_words: SmallWords,
}

impl Default for MarkOptions {
    fn default() -> Self {
        MarkOptions {
            tag: DEFAULT_TAG.to_string(),
            skip_small_words: true,
            break_on_word: true,
            small_words: SmallWords::english(),
        }
    }
}

impl MarkOptions {
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn skip_small_words(mut self, skip: bool) -> Self {
        self.skip_small_words = skip;
        self
    }

    pub fn break_on_word(mut self, on: bool) -> Self {
        self.break_on_word = on;
        self
    }

    pub fn with_small_words(mut self, small_words: SmallWords) -> Self {
        self.small_words = small_words;
        self
    }
}

/// Highlighting configuration as read from TOML. Missing keys take the
/// [`MarkOptions`] defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub tag: String,
    pub skip_small_words: bool,
    pub break_on_word: bool,
    /// Replaces the built-in small-word list when present.
    pub small_words: Option<Vec<String>>,
    pub quotes_to_ignore: Vec<String>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig {
            tag: DEFAULT_TAG.to_string(),
            skip_small_words: true,
            break_on_word: true,
            small_words: None,
            quotes_to_ignore: DEFAULT_QUOTES_TO_IGNORE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl HighlightConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn mark_options(&self) -> MarkOptions {
        MarkOptions {
            tag: self.tag.clone(),
            skip_small_words: self.skip_small_words,
            break_on_word: self.break_on_word,
            small_words: self
                .small_words
                .as_ref()
                .map(SmallWords::new)
                .unwrap_or_else(SmallWords::english),
        }
    }

    /// Lowercased set of phrases that are never highlighted.
    pub fn ignored_quotes(&self) -> HashSet<String> {
        self.quotes_to_ignore.iter().map(|q| q.to_lowercase()).collect()
    }
}
