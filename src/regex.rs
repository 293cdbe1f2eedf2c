//! regex.rs
//!
//! Small helpers that stand in for regex features the `regex` crate does not
//! have. Lookahead such as `(?![^<]*>)` ("not inside an HTML tag") and
//! word-boundary checks on arbitrary match edges are done here by looking at
//! the haystack around a match instead of inside the pattern.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WORD_CHAR: Regex = Regex::new(r"^\w$").unwrap();
    static ref TAG_NAME: Regex = Regex::new(r"^<\s*([A-Za-z][A-Za-z0-9-]*)").unwrap();
    static ref END_TAG_NAME: Regex = Regex::new(r"^<\s*/\s*([A-Za-z][A-Za-z0-9-]*)").unwrap();
    static ref ANY_TAG: Regex = Regex::new(r"<[A-Za-z/][^>]*>").unwrap();
}

/// Elements that never have a closing tag.
const VOID_ELEMENTS: [&str; 9] = ["area", "br", "col", "hr", "img", "input", "link", "meta", "wbr"];

/// Returns `true` if `c` counts as a word character (`\w`, Unicode aware,
/// combining marks included).
pub fn is_word_char(c: char) -> bool {
    let mut buf = [0u8; 4];
    WORD_CHAR.is_match(c.encode_utf8(&mut buf))
}

/// Returns `true` if byte offset `pos` of `html` lies inside a tag, i.e. a
/// `>` appears before any `<` when scanning forward from `pos`.
///
/// This mimics the negative lookahead `(?![^<]*>)`.
pub fn is_inside_tag(html: &str, pos: usize) -> bool {
    match html[pos..].find(|c| c == '<' || c == '>') {
        Some(idx) => html[pos + idx..].starts_with('>'),
        None => false,
    }
}

/// Returns `true` if the span `start..end` of `text` neither begins nor ends
/// in the middle of a word.
///
/// An edge only needs checking when the span's own edge character is a word
/// character, so phrases that start or end with punctuation always pass.
pub fn is_on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let span = &text[start..end];
    let left_ok = match (span.chars().next(), text[..start].chars().next_back()) {
        (Some(first), Some(before)) => !(is_word_char(first) && is_word_char(before)),
        _ => true,
    };
    let right_ok = match (span.chars().next_back(), text[end..].chars().next()) {
        (Some(last), Some(after)) => !(is_word_char(last) && is_word_char(after)),
        _ => true,
    };
    left_ok && right_ok
}

/// Returns the lowercase element name of an opening tag such as
/// `<span class="x">`, or `None` if `tag` is not an opening tag.
pub fn tag_name(tag: &str) -> Option<String> {
    TAG_NAME
        .captures(tag.trim_start())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// Returns the lowercase element name of a closing tag such as `</span>`.
pub fn end_tag_name(tag: &str) -> Option<String> {
    END_TAG_NAME
        .captures(tag.trim_start())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// `true` if `text` contains at least one HTML tag. A bare `<` as in
/// `a < b` does not count.
pub fn has_tag(text: &str) -> bool {
    ANY_TAG.is_match(text)
}

/// Byte ranges of the tags in `text`.
pub fn tag_spans(text: &str) -> Vec<(usize, usize)> {
    ANY_TAG.find_iter(text).map(|m| (m.start(), m.end())).collect()
}

/// `true` for an opening tag that opens no element needing a close:
/// self-closing (`<br/>`) or a void element (`<img ...>`).
pub fn is_void_tag(tag: &str) -> bool {
    tag.trim_end_matches('>').trim_end().ends_with('/')
        || tag_name(tag).map_or(false, |name| VOID_ELEMENTS.contains(&name.as_str()))
}

/// Returns the closing tag matching the opening tag `tag`
/// (`<a href="..">` gives `</a>`).
pub fn closing_tag(tag: &str) -> Option<String> {
    tag_name(tag).map(|name| format!("</{}>", name))
}

/// Returns `true` if `tag` opens an anchor element.
pub fn is_anchor_tag(tag: &str) -> bool {
    tag_name(tag).as_deref() == Some("a")
}

/// Byte offset of the character following the one that starts at `pos`.
pub fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}
