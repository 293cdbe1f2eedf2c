//! highlight.rs
//!
//! Highlights every note phrase of a verse in its rendered HTML.
//!
//! The verse HTML may end with a `<div class="footnotes">` block, which is
//! split off first and never highlighted. Requests are then marked one after
//! the other on the growing HTML, each with its own tag, so later phrases
//! can be found across the markup added for earlier ones.
//!
//! A phrase that cannot be marked becomes a [`BadHighlight`]. The fix offered
//! with it, if any, is the first of:
//!
//! 1. a quote-character variant of the phrase that would have matched,
//! 2. a note that only the first occurrence exists, when a later one was asked for,
//! 3. the request's fallback phrase (usually the gateway-language quote), if that one matches.
//!
//! Phrases listed in `quotes_to_ignore` (note headings such as
//! "Connecting Statement:") are skipped without a report.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::config::{HighlightConfig, MarkOptions, DEFAULT_QUOTES_TO_IGNORE};
use crate::marker::PhraseMarker;
use crate::phrase::split_string_into_phrase;
use crate::variation::find_quote_variation_in_text;

lazy_static! {
    static ref FOOTNOTES: Regex = Regex::new(r#"(?i)<div class="footnotes">"#).unwrap();
}

/// Splits `html` into the scripture and the footnote block (opening `div`
/// included). The footnote part is empty when there is none.
pub fn split_footnotes(html: &str) -> (&str, &str) {
    match FOOTNOTES.find(html) {
        Some(m) => html.split_at(m.start()),
        None => (html, ""),
    }
}

/// Returns the occurrence to use for `phrase`, moving past any occurrence
/// already used for the same phrase in this verse, and records it.
pub fn next_occurrence(seen: &mut HashMap<String, u32>, phrase: &str, occurrence: u32) -> u32 {
    let occurrence = match seen.get(phrase) {
        Some(&last) if last >= occurrence => last + 1,
        _ => occurrence,
    };
    seen.insert(phrase.to_string(), occurrence);
    occurrence
}

/// `true` if the phrase string has an ellipsis, i.e. several parts.
pub fn is_split_phrase(phrase: &str) -> bool {
    phrase.contains('…') || phrase.contains("...")
}

fn split_class(split: bool) -> &'static str {
    if split {
        " split"
    } else {
        ""
    }
}

/// Highlight span for the `index`th (0-based) note of kind `kind`, e.g.
/// `<span class="highlight tn-phrase tn-phrase-1">`.
pub fn note_tag(kind: &str, index: usize, split: bool) -> String {
    format!(
        r#"<span class="highlight {kind}-phrase {kind}-phrase-{}{}">"#,
        index + 1,
        split_class(split)
    )
}

/// Link to a word article for the `index`th (0-based) linked word.
pub fn word_link_tag(rc: &str, index: usize, split: bool) -> String {
    format!(
        r#"<a href="{rc}" class="tw-phrase tw-phrase-{}{}">"#,
        index + 1,
        split_class(split)
    )
}

/// A phrase that could not be highlighted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadHighlight {
    pub phrase: String,
    pub fix: Option<String>,
    /// Where the phrase came from, e.g. a note's resource container link.
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightRequest {
    pub phrase: String,
    pub occurrence: u32,
    /// Overrides the highlighter's tag.
    pub tag: Option<String>,
    /// Phrase to suggest when `phrase` is not found.
    pub fallback: Option<String>,
    pub reference: Option<String>,
}

impl HighlightRequest {
    pub fn new(phrase: impl Into<String>, occurrence: u32) -> Self {
        HighlightRequest {
            phrase: phrase.into(),
            occurrence,
            tag: None,
            fallback: None,
            reference: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightOutcome {
    pub html: String,
    pub bad_highlights: Vec<BadHighlight>,
}

#[derive(Debug, Clone)]
pub struct VerseHighlighter {
    options: MarkOptions,
    quotes_to_ignore: HashSet<String>,
}

impl VerseHighlighter {
    pub fn new(options: MarkOptions) -> Self {
        VerseHighlighter {
            options,
            quotes_to_ignore: DEFAULT_QUOTES_TO_IGNORE.iter().map(|q| q.to_string()).collect(),
        }
    }

    pub fn from_config(config: &HighlightConfig) -> Self {
        VerseHighlighter {
            options: config.mark_options(),
            quotes_to_ignore: config.ignored_quotes(),
        }
    }

    pub fn with_quotes_to_ignore<I, S>(mut self, quotes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.quotes_to_ignore = quotes.into_iter().map(|q| q.as_ref().to_lowercase()).collect();
        self
    }

    pub fn options(&self) -> &MarkOptions {
        &self.options
    }

    fn is_ignored(&self, phrase: &str) -> bool {
        self.quotes_to_ignore.contains(&phrase.to_lowercase())
    }

    /// Marks every request in `html`, in order.
    pub fn highlight(&self, html: &str, requests: &[HighlightRequest]) -> HighlightOutcome {
        let (scripture, footnotes) = split_footnotes(html);
        let marker = PhraseMarker::new(&self.options);
        let mut marked = scripture.to_string();
        let mut seen = HashMap::new();
        let mut bad_highlights = Vec::new();

        for request in requests {
            let occurrence = next_occurrence(&mut seen, &request.phrase, request.occurrence);
            let tag = request.tag.as_deref().unwrap_or(&self.options.tag);
            let phrase = split_string_into_phrase(&request.phrase);
            if let Some(updated) = marker.mark_with_tag(&marked, &phrase, occurrence, tag) {
                marked = updated;
                continue;
            }
            if self.is_ignored(&request.phrase) {
                continue;
            }
            let fix = self.diagnose(scripture, &marked, request, occurrence);
            debug!(phrase = %request.phrase, occurrence, fix = ?fix, "bad highlight");
            bad_highlights.push(BadHighlight {
                phrase: request.phrase.clone(),
                fix,
                reference: request.reference.clone(),
            });
        }

        marked.push_str(footnotes);
        HighlightOutcome {
            html: marked,
            bad_highlights,
        }
    }

    fn diagnose(&self, original: &str, marked: &str, request: &HighlightRequest, occurrence: u32) -> Option<String> {
        if let Some(variation) = find_quote_variation_in_text(original, &request.phrase, occurrence, &self.options) {
            return Some(variation);
        }
        let marker = PhraseMarker::new(&self.options);
        if occurrence > 1 && marker.can_mark(marked, &split_string_into_phrase(&request.phrase), 1) {
            return Some(format!("(occurrence = {}, only occurrence 1 is found)", occurrence));
        }
        request
            .fallback
            .as_ref()
            .filter(|fallback| marker.can_mark(marked, &split_string_into_phrase(fallback), 1))
            .cloned()
    }

    /// Marks plain phrases, longest first, with the highlighter's tag. Each
    /// phrase is looked for once.
    pub fn highlight_phrases<S: AsRef<str>>(&self, html: &str, phrases: &[S]) -> HighlightOutcome {
        let mut sorted: Vec<&str> = phrases.iter().map(|p| p.as_ref()).collect();
        sorted.sort_by_key(|p| std::cmp::Reverse(p.chars().count()));
        let requests: Vec<HighlightRequest> = sorted.into_iter().map(|p| HighlightRequest::new(p, 1)).collect();
        self.highlight(html, &requests)
    }
}

/// Marks `phrases` in `html` with `options`, longest first.
pub fn highlight_text_with_phrases<S: AsRef<str>>(html: &str, phrases: &[S], options: &MarkOptions) -> HighlightOutcome {
    VerseHighlighter::new(options.clone()).highlight_phrases(html, phrases)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITUS_1_1: &str = r#"<span class="v-num">1</span> Paul, a servant of God and an apostle of Jesus Christ, for the faith of God’s chosen people <div class="footnotes"><p>God is the subject</p></div>"#;

    fn highlighter() -> VerseHighlighter {
        VerseHighlighter::new(MarkOptions::default())
    }

    #[test]
    fn test_split_footnotes() {
        let (scripture, footnotes) = split_footnotes(TITUS_1_1);
        assert!(scripture.ends_with("chosen people "));
        assert!(footnotes.starts_with(r#"<div class="footnotes">"#));
        assert_eq!(split_footnotes("no notes"), ("no notes", ""));
    }

    #[test]
    fn test_next_occurrence() {
        let mut seen = HashMap::new();
        assert_eq!(next_occurrence(&mut seen, "God", 1), 1);
        assert_eq!(next_occurrence(&mut seen, "God", 1), 2);
        assert_eq!(next_occurrence(&mut seen, "God", 5), 5);
        assert_eq!(next_occurrence(&mut seen, "God", 3), 6);
        assert_eq!(next_occurrence(&mut seen, "Paul", 1), 1);
    }

    #[test]
    fn test_tags() {
        assert_eq!(note_tag("tn", 0, false), r#"<span class="highlight tn-phrase tn-phrase-1">"#);
        assert_eq!(note_tag("sn", 2, true), r#"<span class="highlight sn-phrase sn-phrase-3 split">"#);
        assert_eq!(
            word_link_tag("rc://en/tw/dict/bible/kt/god", 0, false),
            r#"<a href="rc://en/tw/dict/bible/kt/god" class="tw-phrase tw-phrase-1">"#
        );
        assert!(is_split_phrase("apostle … Jesus"));
        assert!(!is_split_phrase("apostle"));
    }

    #[test]
    fn test_highlight_notes() {
        let requests = vec![
            HighlightRequest::new("servant of God", 1).with_tag(note_tag("tn", 0, false)),
            HighlightRequest::new("apostle … Jesus Christ", 1).with_tag(note_tag("tn", 1, true)),
            HighlightRequest::new("Titus", 1).with_reference("rc://en/tn/help/tit/01/01"),
        ];
        let outcome = highlighter().highlight(TITUS_1_1, &requests);
        assert_eq!(
            outcome.html,
            r#"<span class="v-num">1</span> Paul, a <span class="highlight tn-phrase tn-phrase-1">servant of God</span> and an <span class="highlight tn-phrase tn-phrase-2 split">apostle</span> of <span class="highlight tn-phrase tn-phrase-2 split">Jesus Christ</span>, for the faith of God’s chosen people <div class="footnotes"><p>God is the subject</p></div>"#
        );
        assert_eq!(
            outcome.bad_highlights,
            vec![BadHighlight {
                phrase: "Titus".to_string(),
                fix: None,
                reference: Some("rc://en/tn/help/tit/01/01".to_string()),
            }]
        );
    }

    #[test]
    fn test_word_links() {
        let rc = "rc://en/tw/dict/bible/kt/god";
        let requests = vec![
            HighlightRequest::new("God", 1).with_tag(word_link_tag(rc, 0, false)),
            HighlightRequest::new("God", 1).with_tag(word_link_tag(rc, 1, false)),
        ];
        let outcome = highlighter().highlight(TITUS_1_1, &requests);
        assert!(outcome.html.contains(r#"servant of <a href="rc://en/tw/dict/bible/kt/god" class="tw-phrase tw-phrase-1">God</a> and"#));
        assert!(outcome.html.contains(r#"faith of <a href="rc://en/tw/dict/bible/kt/god" class="tw-phrase tw-phrase-2">God</a>’s"#));
        assert!(outcome.bad_highlights.is_empty());
    }

    #[test]
    fn test_occurrence_fix_ignores_footnotes() {
        let outcome = highlighter().highlight(TITUS_1_1, &[HighlightRequest::new("God", 3)]);
        assert_eq!(outcome.html, TITUS_1_1);
        assert_eq!(
            outcome.bad_highlights[0].fix.as_deref(),
            Some("(occurrence = 3, only occurrence 1 is found)")
        );
    }

    #[test]
    fn test_fallback_fix() {
        let request = HighlightRequest::new("δοῦλος Θεοῦ", 1).with_fallback("servant of God");
        let outcome = highlighter().highlight(TITUS_1_1, &[request]);
        assert_eq!(outcome.bad_highlights[0].fix.as_deref(), Some("servant of God"));

        let request = HighlightRequest::new("δοῦλος Θεοῦ", 1).with_fallback("slave of God");
        let outcome = highlighter().highlight(TITUS_1_1, &[request]);
        assert_eq!(outcome.bad_highlights[0].fix, None);
    }

    #[test]
    fn test_ignored_quotes_are_not_reported() {
        let outcome = highlighter().highlight(TITUS_1_1, &[HighlightRequest::new("Connecting Statement:", 1)]);
        assert!(outcome.bad_highlights.is_empty());
        let outcome = highlighter()
            .with_quotes_to_ignore(Vec::<String>::new())
            .highlight(TITUS_1_1, &[HighlightRequest::new("Connecting Statement:", 1)]);
        assert_eq!(outcome.bad_highlights.len(), 1);
    }

    #[test]
    fn test_highlight_text_with_phrases() {
        let options = MarkOptions::default().with_tag("<b>");
        let outcome = highlight_text_with_phrases(
            "he said, ‘Go,’ to the servant of God",
            &["God", "servant of God", "'Go,'"],
            &options,
        );
        assert_eq!(outcome.html, "he said, ‘Go,’ to the <b>servant of <b>God</b></b>");
        assert_eq!(outcome.bad_highlights.len(), 1);
        assert_eq!(outcome.bad_highlights[0].phrase, "'Go,'");
        assert_eq!(outcome.bad_highlights[0].fix.as_deref(), Some("‘Go,’"));
    }

    #[test]
    fn test_from_config() {
        let config = HighlightConfig::from_toml_str(r#"tag = "<em>""#).unwrap();
        let outcome = VerseHighlighter::from_config(&config).highlight_phrases("Paul, a servant", &["Paul"]);
        assert_eq!(outcome.html, "<em>Paul</em>, a servant");
    }
}
