//! fallback.rs
//!
//! Older target-text lookups used before milestone-combination alignment
//! existed. They return a flat string rather than an [`Alignment`] and are
//! kept for notes whose quotes the resolver cannot place.
//!
//! - **`find_target_from_combination`** works on the top-level milestones
//!   only, joining the target words of consecutive milestones and comparing
//!   the joined OL text with the quote.
//! - **`find_target_from_split`** walks the whole tree and gathers the text
//!   under every milestone or word whose content (or lemma) is one of the
//!   quote's words, putting `... ` where unrelated material separates two
//!   gathered runs.
//!
//! [`Alignment`]: crate::alignment::Alignment

use std::collections::HashMap;

use tracing::debug;

use crate::quote::Quote;
use crate::verse_object::VerseObject;

struct TopLevelEntry {
    ol: String,
    target: String,
    occurrence: u32,
}

/// Looks `quote` up among joined runs of the verse's top-level milestones.
///
/// Milestones repeating the same `(content, occurrence)` pair are merged,
/// their targets joined with ` ... `. Every contiguous run of entries is then
/// given an occurrence number per joined OL string; the target of the run
/// whose OL text equals `quote` at `occurrence` is returned.
pub fn find_target_from_combination(
    objects: &[VerseObject],
    quote: &str,
    occurrence: u32,
) -> Option<String> {
    let mut entries: Vec<TopLevelEntry> = Vec::new();
    for object in objects {
        let VerseObject::Milestone {
            content: Some(content),
            occurrence: milestone_occurrence,
            children,
        } = object
        else {
            continue;
        };
        let milestone_occurrence = milestone_occurrence.unwrap_or(0);
        let target = children
            .iter()
            .filter_map(|child| match child {
                VerseObject::Word { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ");
        let mut merged = false;
        for entry in entries
            .iter_mut()
            .filter(|e| &e.ol == content && e.occurrence == milestone_occurrence)
        {
            entry.target.push_str(" ... ");
            entry.target.push_str(&target);
            merged = true;
        }
        if !merged {
            entries.push(TopLevelEntry {
                ol: content.clone(),
                target,
                occurrence: milestone_occurrence,
            });
        }
    }

    let mut counts: HashMap<String, u32> = HashMap::new();
    for i in 0..entries.len() {
        let mut ol = entries[i].ol.clone();
        let mut target = entries[i].target.clone();
        for j in i..entries.len() {
            if i != j {
                ol.push(' ');
                ol.push_str(&entries[j].ol);
                target.push(' ');
                target.push_str(&entries[j].target);
            }
            let count = counts.entry(ol.clone()).or_insert(0);
            *count += 1;
            if ol == quote && *count == occurrence {
                return Some(target);
            }
        }
    }
    None
}

/// Gathers the text aligned to any of the quote's words at `occurrence`.
///
/// Returns an empty string when nothing matched.
pub fn find_target_from_split(objects: &[VerseObject], quote: &Quote, occurrence: u32) -> String {
    let words: Vec<String> = match quote {
        Quote::Text(s) => s.split(' ').map(str::to_string).collect(),
        Quote::Words(words) => words.iter().map(|w| w.word.clone()).collect(),
    };
    split_target(objects, &words, occurrence, false)
}

fn split_target(objects: &[VerseObject], words: &[String], occurrence: u32, is_match: bool) -> String {
    let mut separator = String::from(" ");
    let mut needs_ellipsis = false;
    let mut text = String::new();
    let is_quote_word = |s: Option<&str>| s.map_or(false, |s| words.iter().any(|w| w == s));

    for object in objects {
        let (hit, own_text, children) = match object {
            VerseObject::Milestone {
                content,
                occurrence: milestone_occurrence,
                children,
            } => (
                *milestone_occurrence == Some(occurrence) && is_quote_word(content.as_deref()),
                None,
                children.as_slice(),
            ),
            VerseObject::Word {
                text: word_text,
                occurrence: word_occurrence,
                lemma,
            } => (
                *word_occurrence == Some(occurrence) && is_quote_word(lemma.as_deref()),
                Some(word_text.as_str()),
                &[][..],
            ),
            _ => continue,
        };

        if hit || is_match {
            if needs_ellipsis {
                separator.push_str("... ");
                needs_ellipsis = false;
            }
            if !text.is_empty() {
                text.push_str(&separator);
            }
            separator = String::from(" ");
            if let Some(own_text) = own_text.filter(|t| !t.is_empty()) {
                text.push_str(own_text);
            }
            if !children.is_empty() {
                text.push_str(&split_target(children, words, occurrence, true));
            }
        } else if !children.is_empty() {
            let child_text = split_target(children, words, occurrence, is_match);
            if !child_text.is_empty() {
                if needs_ellipsis {
                    separator.push_str("... ");
                    needs_ellipsis = false;
                }
                if !text.is_empty() {
                    text.push_str(&separator);
                }
                text.push_str(&child_text);
                separator = String::from(" ");
            } else if !text.is_empty() {
                needs_ellipsis = true;
            }
        }
    }
    text
}

/// Tries [`find_target_from_combination`] (string quotes only), then
/// [`find_target_from_split`].
pub fn aligned_text(objects: &[VerseObject], quote: &Quote, occurrence: u32) -> Option<String> {
    if let Quote::Text(s) = quote {
        if let Some(target) = find_target_from_combination(objects, s, occurrence) {
            return Some(target);
        }
    }
    let text = find_target_from_split(objects, quote, occurrence);
    if text.is_empty() {
        debug!(occurrence, "no target text for quote");
        None
    } else {
        Some(text)
    }
}
