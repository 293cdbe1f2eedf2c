//! alignment.rs
//!
//! Resolves an original-language quote to the target-language text aligned to
//! it in a verse-object tree.
//!
//! The quote is expanded into its combinations (see
//! [`get_quote_combinations`]). The tree is then walked in order. A milestone
//! whose content spells a still-unused combination, at the combination's
//! occurrence, starts (or continues) a matched region, and every `word` and
//! `text` leaf below it is collected. Text between two matched milestones that
//! follow each other at the same level joins them into one group; any
//! unmatched milestone in between closes the group, so a quote with a gap
//! (`A … B`) yields two groups.
//!
//! Resolution is all or nothing: if any quote word is never matched the
//! result is `None`, since partial text would misrepresent the note.
//!
//! Which combination wins when several could match is decided by tree order
//! alone: the first milestone that satisfies a combination takes it.

use std::borrow::Cow;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::quote::{flatten_quote, get_quote_combinations, Combination, Quote, QuoteWord};
use crate::verse_object::{fill_missing_occurrences, has_missing_occurrences, VerseObject};

/// A piece of aligned target-language text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedFragment {
    pub text: String,
    /// Occurrence of a `word` leaf in its verse; 0 for `text` runs.
    pub occurrence: u32,
}

impl AlignedFragment {
    pub fn new(text: impl Into<String>, occurrence: u32) -> Self {
        AlignedFragment {
            text: text.into(),
            occurrence,
        }
    }
}

/// A contiguous run of aligned text.
pub type AlignmentGroup = Vec<AlignedFragment>;

/// The target-language text of a quote, one group per contiguous run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Alignment {
    pub groups: Vec<AlignmentGroup>,
}

impl Alignment {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Text of each group with fragments concatenated.
    pub fn group_texts(&self) -> Vec<String> {
        self.groups
            .iter()
            .map(|group| group.iter().map(|f| f.text.as_str()).collect())
            .collect()
    }
}

/// Renders an alignment as a string, groups joined with ` … `.
pub fn flatten_alignment(alignment: &Alignment) -> String {
    alignment.group_texts().join(" … ")
}

/// Which quote words and combinations have been consumed during one
/// resolution. A quote word is matched at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    words: Vec<bool>,
    combinations: Vec<bool>,
}

impl MatchState {
    pub fn new(word_count: usize, combination_count: usize) -> Self {
        MatchState {
            words: vec![false; word_count],
            combinations: vec![false; combination_count],
        }
    }

    pub fn is_word_found(&self, index: usize) -> bool {
        self.words.get(index).copied().unwrap_or(false)
    }

    pub fn is_combination_found(&self, index: usize) -> bool {
        self.combinations.get(index).copied().unwrap_or(false)
    }

    /// Marks combination `index` and its words as found, unless the
    /// combination or any of its words was already used.
    pub fn claim(&mut self, index: usize, combination: &Combination) -> bool {
        if self.is_combination_found(index)
            || combination.indexes.iter().any(|&i| self.is_word_found(i))
        {
            return false;
        }
        self.combinations[index] = true;
        for &i in &combination.indexes {
            self.words[i] = true;
        }
        true
    }

    pub fn all_words_found(&self) -> bool {
        self.words.iter().all(|&found| found)
    }

    /// Indexes of quote words never matched.
    pub fn missing_words(&self) -> Vec<usize> {
        self.words
            .iter()
            .enumerate()
            .filter(|(_, &found)| !found)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Groups being built at one level of the tree outside any matched region.
#[derive(Debug, Default)]
struct GroupCollector {
    groups: Vec<AlignmentGroup>,
    /// Text seen since the last matched milestone at this level.
    in_between: Vec<AlignedFragment>,
    last_found: bool,
}

/// Matches one quote against verse-object trees.
#[derive(Debug, Clone)]
pub struct AlignmentResolver {
    words: Vec<QuoteWord>,
    combinations: Vec<Combination>,
}

impl AlignmentResolver {
    /// Prepares `quote`; string quotes give every word `default_occurrence`.
    pub fn new(quote: &Quote, default_occurrence: u32) -> Self {
        let words = quote.words(default_occurrence);
        let combinations = get_quote_combinations(&words);
        AlignmentResolver {
            words,
            combinations,
        }
    }

    pub fn words(&self) -> &[QuoteWord] {
        &self.words
    }

    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    /// Returns the alignment of the quote in `objects`, or `None` if the quote
    /// is empty or some of its words cannot be matched.
    pub fn resolve(&self, objects: &[VerseObject]) -> Option<Alignment> {
        if self.words.is_empty() {
            debug!("empty quote, nothing to align");
            return None;
        }
        let objects: Cow<'_, [VerseObject]> = if has_missing_occurrences(objects) {
            let mut owned = objects.to_vec();
            fill_missing_occurrences(&mut owned);
            Cow::Owned(owned)
        } else {
            Cow::Borrowed(objects)
        };

        let mut state = MatchState::new(self.words.len(), self.combinations.len());
        let mut collector = GroupCollector::default();
        self.walk_unmatched(&objects, &mut state, &mut collector);

        if !state.all_words_found() {
            let missing: Vec<&str> = state
                .missing_words()
                .into_iter()
                .map(|i| self.words[i].word.as_str())
                .collect();
            debug!(?missing, "quote words without an aligned milestone");
            return None;
        }
        Some(Alignment {
            groups: collector.groups,
        })
    }

    /// Tries every unused combination against a milestone.
    fn try_match(&self, content: &str, occurrence: u32, state: &mut MatchState) -> bool {
        for (index, combination) in self.combinations.iter().enumerate() {
            if combination.occurrence == occurrence
                && combination.matches_content(content)
                && state.claim(index, combination)
            {
                trace!(content, occurrence, indexes = ?combination.indexes, "milestone matched");
                return true;
            }
        }
        false
    }

    fn walk_unmatched(
        &self,
        objects: &[VerseObject],
        state: &mut MatchState,
        collector: &mut GroupCollector,
    ) {
        for object in objects {
            match object {
                VerseObject::Milestone {
                    content,
                    occurrence,
                    children,
                } => {
                    let found = match content {
                        Some(content) => {
                            let found = self.try_match(content, occurrence.unwrap_or(0), state);
                            if !found {
                                collector.last_found = false;
                                collector.in_between.clear();
                            }
                            found
                        }
                        None => false,
                    };
                    if found {
                        let fragments = self.walk_matched(children, state);
                        if collector.last_found {
                            let in_between = std::mem::take(&mut collector.in_between);
                            if let Some(group) = collector.groups.last_mut() {
                                group.extend(in_between);
                                group.extend(fragments);
                            }
                        } else {
                            collector.groups.push(fragments);
                            collector.last_found = true;
                        }
                    } else {
                        let mut inner = GroupCollector::default();
                        self.walk_unmatched(children, state, &mut inner);
                        collector.groups.extend(inner.groups);
                    }
                }
                VerseObject::Char { children, .. } => {
                    self.walk_unmatched(children, state, collector);
                }
                VerseObject::Word { .. } | VerseObject::Text { .. } => {
                    if collector.last_found {
                        if let Some(text) = object.leaf_text() {
                            collector
                                .in_between
                                .push(AlignedFragment::new(text, object.leaf_occurrence()));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Collects the leaves under a matched milestone. Nested milestones may
    /// still consume quote words but do not start new groups.
    fn walk_matched(&self, objects: &[VerseObject], state: &mut MatchState) -> AlignmentGroup {
        let mut fragments = Vec::new();
        for object in objects {
            match object {
                VerseObject::Milestone {
                    content,
                    occurrence,
                    children,
                } => {
                    if let Some(content) = content {
                        self.try_match(content, occurrence.unwrap_or(0), state);
                    }
                    fragments.extend(self.walk_matched(children, state));
                }
                VerseObject::Char { children, .. } => {
                    fragments.extend(self.walk_matched(children, state));
                }
                VerseObject::Word { .. } | VerseObject::Text { .. } => {
                    if let Some(text) = object.leaf_text() {
                        fragments.push(AlignedFragment::new(text, object.leaf_occurrence()));
                    }
                }
                _ => {}
            }
        }
        fragments
    }
}

/// Aligns `quote` against a verse. See [`AlignmentResolver::resolve`].
pub fn get_alignment(objects: &[VerseObject], quote: &Quote, occurrence: u32) -> Option<Alignment> {
    AlignmentResolver::new(quote, occurrence).resolve(objects)
}

/// Like [`get_alignment`], but reports why nothing was returned.
pub fn try_alignment(objects: &[VerseObject], quote: &Quote, occurrence: u32) -> Result<Alignment> {
    let resolver = AlignmentResolver::new(quote, occurrence);
    if resolver.words().is_empty() {
        return Err(Error::MalformedQuote("quote has no words".to_string()));
    }
    resolver.resolve(objects).ok_or_else(|| Error::AlignmentNotFound {
        quote: flatten_quote(quote),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn milestone(content: &str, occurrence: u32, children: serde_json::Value) -> serde_json::Value {
        json!({"type": "milestone", "tag": "zaln", "content": content,
               "occurrence": occurrence, "children": children})
    }

    fn word(text: &str, occurrence: u32) -> serde_json::Value {
        json!({"type": "word", "tag": "w", "text": text, "occurrence": occurrence})
    }

    fn text(text: &str) -> serde_json::Value {
        json!({"type": "text", "text": text})
    }

    /// Titus 1:1a, "Paul, a servant of God and an apostle of Jesus Christ,"
    fn titus_1_1() -> Vec<VerseObject> {
        serde_json::from_value(json!([
            milestone("Παῦλος", 1, json!([word("Paul", 1)])),
            text(", "),
            milestone("δοῦλος", 1, json!([word("a", 1), text(" "), word("servant", 1)])),
            text(" "),
            milestone("Θεοῦ", 1, json!([word("of", 1), text(" "), word("God", 1)])),
            text(" "),
            milestone("δὲ", 1, json!([word("and", 1)])),
            text(" "),
            milestone("ἀπόστολος", 1, json!([word("an", 1), text(" "), word("apostle", 1)])),
            text(" "),
            milestone("Ἰησοῦ", 1, json!([word("of", 2), text(" "), word("Jesus", 1)])),
            text(" "),
            milestone("Χριστοῦ", 1, json!([word("Christ", 1)])),
            text(","),
        ]))
        .unwrap()
    }

    #[test]
    fn test_adjacent_milestones_form_one_group() {
        let alignment = get_alignment(&titus_1_1(), &Quote::from("δοῦλος Θεοῦ"), 1).unwrap();
        assert_eq!(alignment.groups.len(), 1);
        assert_eq!(flatten_alignment(&alignment), "a servant of God");
        // Word occurrences come from the tree, text runs have none.
        assert_eq!(alignment.groups[0][0], AlignedFragment::new("a", 1));
        assert_eq!(alignment.groups[0][1], AlignedFragment::new(" ", 0));
    }

    #[test]
    fn test_gap_starts_a_new_group() {
        let alignment = get_alignment(&titus_1_1(), &Quote::from("Παῦλος … ἀπόστολος"), 1).unwrap();
        assert_eq!(alignment.group_texts(), vec!["Paul", "an apostle"]);
        assert_eq!(flatten_alignment(&alignment), "Paul … an apostle");
    }

    #[test]
    fn test_missing_word_fails_whole_alignment() {
        assert_eq!(get_alignment(&titus_1_1(), &Quote::from("δοῦλος Κυρίου"), 1), None);
        let err = try_alignment(&titus_1_1(), &Quote::from("δοῦλος Κυρίου"), 1).unwrap_err();
        assert!(matches!(err, Error::AlignmentNotFound { .. }));
    }

    #[test]
    fn test_wrong_occurrence_fails() {
        assert_eq!(get_alignment(&titus_1_1(), &Quote::from("Θεοῦ"), 2), None);
    }

    #[test]
    fn test_empty_quote_is_malformed() {
        assert_eq!(get_alignment(&titus_1_1(), &Quote::from("  "), 1), None);
        let err = try_alignment(&titus_1_1(), &Quote::Words(vec![]), 1).unwrap_err();
        assert!(matches!(err, Error::MalformedQuote(_)));

        // Only placeholders and unplaced words.
        let quote = Quote::Words(vec![QuoteWord::new("…", 1), QuoteWord::new("θεοῦ", 0)]);
        assert!(matches!(try_alignment(&titus_1_1(), &quote, 1), Err(Error::MalformedQuote(_))));
        assert!(matches!(try_alignment(&titus_1_1(), &Quote::from(" … "), 1), Err(Error::MalformedQuote(_))));
        assert!(matches!(
            try_alignment(&titus_1_1(), &Quote::from("Θεοῦ"), 2),
            Err(Error::AlignmentNotFound { .. })
        ));
    }

    #[test]
    fn test_word_list_quote() {
        let quote = Quote::Words(vec![
            QuoteWord::new("Ἰησοῦ", 1),
            QuoteWord::new("…", 1),
            QuoteWord::new("Χριστοῦ", 1),
        ]);
        let alignment = get_alignment(&titus_1_1(), &quote, 1).unwrap();
        assert_eq!(flatten_alignment(&alignment), "of Jesus Christ");
    }

    #[test]
    fn test_multi_word_milestone() {
        let objects: Vec<VerseObject> = serde_json::from_value(json!([
            milestone("Ἰησοῦ Χριστοῦ", 1, json!([word("Jesus", 1), text(" "), word("Christ", 1)])),
        ]))
        .unwrap();
        let alignment = get_alignment(&objects, &Quote::from("Ἰησοῦ Χριστοῦ"), 1).unwrap();
        assert_eq!(flatten_alignment(&alignment), "Jesus Christ");
    }

    #[test]
    fn test_word_joiner_milestone() {
        // RUT 4:19, a clitic bound to its host with U+2060.
        let objects: Vec<VerseObject> = serde_json::from_value(json!([
            milestone("וְ\u{2060}חֶצְרוֹן֙", 1, json!([word("and", 1), text(" "), word("Hezron", 1)])),
        ]))
        .unwrap();
        let quote = Quote::Words(vec![QuoteWord::new("וְ", 1), QuoteWord::new("חֶצְרוֹן֙", 1)]);
        let alignment = get_alignment(&objects, &quote, 1).unwrap();
        assert_eq!(flatten_alignment(&alignment), "and Hezron");
    }

    #[test]
    fn test_nested_milestones_consume_words() {
        let objects: Vec<VerseObject> = serde_json::from_value(json!([
            text("the word "),
            milestone("τοῦ", 1, json!([milestone("θεοῦ", 1, json!([word("God's", 1)]))])),
            text(" servant"),
        ]))
        .unwrap();
        let alignment = get_alignment(&objects, &Quote::from("τοῦ θεοῦ"), 1).unwrap();
        assert_eq!(alignment.group_texts(), vec!["God's"]);
    }

    #[test]
    fn test_repeated_word_is_not_reused() {
        let objects: Vec<VerseObject> = serde_json::from_value(json!([
            milestone("καὶ", 1, json!([word("and", 1)])),
            text(" "),
            milestone("λόγος", 1, json!([word("word", 1)])),
            text(" "),
            milestone("καὶ", 2, json!([word("and", 2)])),
        ]))
        .unwrap();
        let quote = Quote::Words(vec![QuoteWord::new("καὶ", 1), QuoteWord::new("καὶ", 2)]);
        let alignment = get_alignment(&objects, &quote, 1).unwrap();
        assert_eq!(alignment.groups.len(), 2);
        assert_eq!(alignment.groups[1], vec![AlignedFragment::new("and", 2)]);
    }

    #[test]
    fn test_missing_milestone_occurrence_is_computed() {
        let objects: Vec<VerseObject> = serde_json::from_value(json!([
            {"type": "milestone", "content": "καὶ", "children": [word("and", 1)]},
            text(" "),
            {"type": "milestone", "content": "καὶ", "children": [word("also", 1)]},
        ]))
        .unwrap();
        let alignment = get_alignment(&objects, &Quote::from("καὶ"), 2).unwrap();
        assert_eq!(alignment.group_texts(), vec!["also"]);
    }

    #[test]
    fn test_match_state_claims_words_once() {
        let quote = vec![QuoteWord::new("a", 1), QuoteWord::new("b", 1)];
        let combinations = get_quote_combinations(&quote);
        let mut state = MatchState::new(2, combinations.len());
        // "a" then "a b": the second overlaps and is refused.
        assert!(state.claim(0, &combinations[0]));
        assert!(!state.claim(1, &combinations[1]));
        assert!(!state.all_words_found());
        assert_eq!(state.missing_words(), vec![1]);
        assert!(state.claim(2, &combinations[2]));
        assert!(state.all_words_found());
    }
}
