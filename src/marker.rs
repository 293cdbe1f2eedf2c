//! marker.rs
//!
//! Wraps a phrase found in (possibly already marked up) HTML in a tag.
//!
//! A phrase is located part by part. Each part is searched for after the end
//! of the previous one, so `the woman … Moabite` finds `the woman` and then
//! the first `Moabite` that follows it. A candidate is only accepted if each
//! of its pieces:
//!
//! - does not start inside a tag (attribute values are never matched),
//! - starts and ends on a word boundary (unless `break_on_word` is off),
//! - covers whole words and is the requested occurrence of its word run in
//!   the visible text, when the piece carries an occurrence. `God` with
//!   occurrence 1 never matches inside `God’s`.
//!
//! The `occurrence` argument picks the nth complete, non-overlapping match.
//! The matched parts are then wrapped one by one. A tag inside a part that
//! closes an element opened before the part, or opens one that ends after
//! it, closes the wrapper and the wrapper reopens after it, so the output
//! stays well nested. When the tag is an anchor, anchors nested in other
//! anchors are split into siblings afterwards.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::config::MarkOptions;
use crate::error::{Error, Result};
use crate::occurrence::{sequence_occurrence_of, tokenize_html_words, Token};
use crate::pattern::{PartPattern, PatternBuilder, PhrasePattern};
use crate::phrase::{split_string_into_phrase, Phrase};
use crate::regex::{
    closing_tag, end_tag_name, is_anchor_tag, is_inside_tag, is_on_word_boundary, is_void_tag, next_char_boundary,
    tag_name, tag_spans,
};

lazy_static! {
    static ref ANCHOR_TAG: Regex = Regex::new(r"(?i)<a\b[^>]*>|</a\s*>").unwrap();
    static ref EMPTY_ANCHOR: Regex = Regex::new(r"(?i)<a\b[^>]*></a\s*>").unwrap();
}

/// Byte span of one matched part.
pub type Span = (usize, usize);

/// The HTML being searched together with its visible words.
struct Haystack<'a> {
    html: &'a str,
    tokens: Vec<Token<'a>>,
    texts: Vec<&'a str>,
}

impl<'a> Haystack<'a> {
    fn new(html: &'a str) -> Self {
        let tokens = tokenize_html_words(html);
        let texts = tokens.iter().map(|t| t.text).collect();
        Haystack { html, tokens, texts }
    }

    /// Occurrence of the word run `needle` starting at byte `start`. `None`
    /// unless a word starts there and the run matches whole words.
    fn occurrence_at(&self, needle: &[String], start: usize) -> Option<u32> {
        let position = self.tokens.binary_search_by_key(&start, |t| t.start).ok()?;
        sequence_occurrence_of(&self.texts, needle, position)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PhraseMarker<'a> {
    options: &'a MarkOptions,
}

impl<'a> PhraseMarker<'a> {
    pub fn new(options: &'a MarkOptions) -> Self {
        PhraseMarker { options }
    }

    pub fn options(&self) -> &MarkOptions {
        self.options
    }

    /// Marks `phrase` with the configured tag.
    pub fn mark(&self, html: &str, phrase: &Phrase, occurrence: u32) -> Option<String> {
        self.mark_with_tag(html, phrase, occurrence, &self.options.tag)
    }

    /// Marks the `occurrence`th match of `phrase` in `html` with `tag`.
    ///
    /// Returns `None` if the phrase is not found that many times, or if
    /// marking would leave the text unchanged.
    pub fn mark_with_tag(&self, html: &str, phrase: &Phrase, occurrence: u32, tag: &str) -> Option<String> {
        let spans = self.locate(html, phrase, occurrence)?;
        let closing = closing_tag(tag).unwrap_or_default();
        let mut marked = String::with_capacity(html.len() + spans.len() * (tag.len() + closing.len()));
        let mut last = 0;
        for (start, end) in spans {
            marked.push_str(&html[last..start]);
            wrap_span(&mut marked, &html[start..end], tag, &closing);
            last = end;
        }
        marked.push_str(&html[last..]);
        if is_anchor_tag(tag) {
            marked = split_nested_anchors(&marked);
        }
        if marked == html {
            None
        } else {
            Some(marked)
        }
    }

    /// Finds the spans of each part of the `occurrence`th match without
    /// changing anything. An occurrence of 0 is treated as 1.
    pub fn locate(&self, html: &str, phrase: &Phrase, occurrence: u32) -> Option<Vec<Span>> {
        let trimmed;
        let phrase = if self.options.skip_small_words {
            trimmed = phrase.trim_small_words(&self.options.small_words);
            if trimmed.parts.len() != phrase.parts.len() {
                trace!(from = %phrase.flatten(), to = %trimmed.flatten(), "trimmed small words");
            }
            &trimmed
        } else {
            phrase
        };
        let pattern = PatternBuilder::for_text(html).build(phrase)?;
        let haystack = Haystack::new(html);

        let target = occurrence.max(1);
        let mut cursor = 0;
        let mut count = 0;
        loop {
            let Some(spans) = self.find_match(&haystack, &pattern, cursor) else {
                debug!(phrase = %phrase.flatten(), occurrence = target, found = count, "phrase not found");
                return None;
            };
            count += 1;
            if count == target {
                return Some(spans);
            }
            cursor = spans.last().map(|&(_, end)| end)?;
        }
    }

    /// Returns `true` if `phrase` can be found `occurrence` times.
    pub fn can_mark(&self, html: &str, phrase: &Phrase, occurrence: u32) -> bool {
        self.locate(html, phrase, occurrence).is_some()
    }

    fn find_match(&self, haystack: &Haystack, pattern: &PhrasePattern, from: usize) -> Option<Vec<Span>> {
        let mut spans = Vec::with_capacity(pattern.parts.len());
        let mut from = from;
        for part in &pattern.parts {
            let span = self.find_part(haystack, part, from)?;
            from = span.1;
            spans.push(span);
        }
        Some(spans)
    }

    fn find_part(&self, haystack: &Haystack, part: &PartPattern, from: usize) -> Option<Span> {
        let html = haystack.html;
        let (first, last) = part.outer_groups()?;
        let mut pos = from;
        while pos <= html.len() {
            let caps = part.regex.captures_at(html, pos)?;
            if self.accepts(haystack, part, &caps) {
                return Some((caps.get(first)?.start(), caps.get(last)?.end()));
            }
            let start = caps.get(0)?.start();
            trace!(start, "candidate rejected");
            if start >= html.len() {
                break;
            }
            pos = next_char_boundary(html, start);
        }
        None
    }

    fn accepts(&self, haystack: &Haystack, part: &PartPattern, caps: &Captures) -> bool {
        part.words.iter().all(|word| {
            let Some(m) = caps.get(word.group) else {
                return false;
            };
            if is_inside_tag(haystack.html, m.start()) {
                return false;
            }
            if self.options.break_on_word && !is_on_word_boundary(haystack.html, m.start(), m.end()) {
                return false;
            }
            word.occurrence == 0 || haystack.occurrence_at(&word.words, m.start()) == Some(word.occurrence)
        })
    }
}

/// Indexes of the tags in `tags` that are not balanced within `segment`.
fn unbalanced_tags(segment: &str, tags: &[(usize, usize)]) -> Vec<usize> {
    let mut breaks = Vec::new();
    let mut open: Vec<(String, usize)> = Vec::new();
    for (i, &(start, end)) in tags.iter().enumerate() {
        let tag = &segment[start..end];
        if let Some(name) = end_tag_name(tag) {
            if open.last().map_or(false, |(top, _)| *top == name) {
                open.pop();
            } else {
                // Elements still open here cannot be closed inside the wrapper.
                breaks.extend(open.drain(..).map(|(_, j)| j));
                breaks.push(i);
            }
        } else if !is_void_tag(tag) {
            if let Some(name) = tag_name(tag) {
                open.push((name, i));
            }
        }
    }
    breaks.extend(open.into_iter().map(|(_, i)| i));
    breaks.sort_unstable();
    breaks
}

/// Appends visible text, opening the wrapper first if it is closed. Leading
/// whitespace stays outside.
fn push_wrapped_text(out: &mut String, text: &str, tag: &str, open: &mut bool) {
    if *open {
        out.push_str(text);
        return;
    }
    let rest = text.trim_start();
    out.push_str(&text[..text.len() - rest.len()]);
    if !rest.is_empty() {
        out.push_str(tag);
        out.push_str(rest);
        *open = true;
    }
}

/// Appends `segment` wrapped in `tag`/`closing`. The wrapper is closed before
/// each unbalanced tag and reopened at the next visible text.
fn wrap_span(out: &mut String, segment: &str, tag: &str, closing: &str) {
    let tags = tag_spans(segment);
    let breaks = unbalanced_tags(segment, &tags);
    let mut open = false;
    let mut last = 0;
    for (i, &(start, end)) in tags.iter().enumerate() {
        push_wrapped_text(out, &segment[last..start], tag, &mut open);
        if breaks.binary_search(&i).is_ok() {
            if open {
                let trailing = out.len() - out.trim_end().len();
                let whitespace = out.split_off(out.len() - trailing);
                out.push_str(closing);
                out.push_str(&whitespace);
                open = false;
            }
        } else if !open {
            out.push_str(tag);
            open = true;
        }
        out.push_str(&segment[start..end]);
        last = end;
    }
    push_wrapped_text(out, &segment[last..], tag, &mut open);
    if open {
        out.push_str(closing);
    }
}

/// Marks the `occurrence`th match of `phrase` in `html` using `options`.
pub fn mark_phrases_in_html(html: &str, phrase: &Phrase, occurrence: u32, options: &MarkOptions) -> Option<String> {
    PhraseMarker::new(options).mark(html, phrase, occurrence)
}

/// Like [`mark_phrases_in_html`], for a phrase written as a string with
/// ellipses between its parts.
pub fn mark_phrase_in_html(html: &str, phrase: &str, occurrence: u32, options: &MarkOptions) -> Option<String> {
    mark_phrases_in_html(html, &split_string_into_phrase(phrase), occurrence, options)
}

pub fn try_mark_phrases_in_html(
    html: &str,
    phrase: &Phrase,
    occurrence: u32,
    options: &MarkOptions,
) -> Result<String> {
    mark_phrases_in_html(html, phrase, occurrence, options).ok_or_else(|| Error::PhraseNotFound {
        phrase: phrase.flatten(),
        occurrence,
    })
}

/// Rewrites anchors nested inside other anchors as siblings: the outer anchor
/// is closed before the inner one opens and reopened after it closes. Anchors
/// left empty by this are removed.
pub fn split_nested_anchors(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut open: Vec<&str> = Vec::new();
    let mut last = 0;
    for m in ANCHOR_TAG.find_iter(html) {
        out.push_str(&html[last..m.start()]);
        last = m.end();
        let tag = m.as_str();
        if tag.starts_with("</") {
            if open.pop().is_none() {
                out.push_str(tag);
                continue;
            }
            out.push_str("</a>");
            if let Some(outer) = open.last() {
                out.push_str(outer);
            }
        } else {
            if !open.is_empty() {
                out.push_str("</a>");
            }
            out.push_str(tag);
            open.push(tag);
        }
    }
    out.push_str(&html[last..]);
    EMPTY_ANCHOR.replace_all(&out, "").into_owned()
}
