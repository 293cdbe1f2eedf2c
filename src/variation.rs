//! variation.rs
//!
//! Quote-character variants of a phrase. Notes and scripture do not always
//! agree on straight versus curly quotes, so when a phrase cannot be found
//! the variants below are tried to tell the user which spelling would have
//! matched. Nothing is ever corrected automatically.

use crate::config::MarkOptions;
use crate::marker::PhraseMarker;
use crate::phrase::split_string_into_phrase;

/// The variants tried, in order:
///
/// 1. curly quotes made straight
/// 2. straight quotes made curly, the first of each kind opening
/// 3. curly double quotes made straight
/// 4. straight double quotes made curly, the first opening
/// 5. straight single quotes made curly, the first opening
/// 6. straight single quotes made closing curly
/// 7. closing curly single quotes made straight
/// 8. opening curly single quotes made straight
pub fn quote_variations(phrase: &str) -> Vec<String> {
    vec![
        phrase
            .replace('‘', "'")
            .replace('’', "'")
            .replace('“', "\"")
            .replace('”', "\""),
        phrase
            .replace('\'', "’")
            .replacen('’', "‘", 1)
            .replace('"', "”")
            .replacen('”', "“", 1),
        phrase.replace('“', "\"").replace('”', "\""),
        phrase.replace('"', "”").replacen('”', "“", 1),
        phrase.replace('\'', "’").replacen('’', "‘", 1),
        phrase.replace('\'', "’"),
        phrase.replace('’', "'"),
        phrase.replace('‘', "'"),
    ]
}

/// Returns the first quote variant of `phrase` that can be found in `text`
/// at `occurrence`, or `None` if none can. Variants equal to `phrase` are
/// skipped.
pub fn find_quote_variation_in_text(
    text: &str,
    phrase: &str,
    occurrence: u32,
    options: &MarkOptions,
) -> Option<String> {
    let marker = PhraseMarker::new(options);
    quote_variations(phrase)
        .into_iter()
        .filter(|variant| variant != phrase)
        .find(|variant| marker.can_mark(text, &split_string_into_phrase(variant), occurrence))
}
