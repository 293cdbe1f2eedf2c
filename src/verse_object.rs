//! verse_object.rs
//!
//! The verse-object tree produced by the USFM renderer: aligned scripture
//! where each `milestone` pairs an original-language (OL) content unit with
//! the target-language words aligned to it.
//!
//! ```text
//! milestone content="Παῦλος" occurrence=1
//! ├── word "Paul"
//! text ","
//! milestone content="δοῦλος" occurrence=1
//! ├── word "a"
//! ├── text " "
//! └── word "servant"
//! ```
//!
//! Trees arrive as JSON objects carrying a `type` tag. They are read into
//! [`VerseObject`], a tagged union holding only the fields each kind needs.
//! A milestone without an `occurrence` gets one computed from its position
//! among the verse's milestones (see [`fill_missing_occurrences`]).

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::occurrence::occurrences;

/// Tag, text and content of a formatting marker (quote, paragraph, section,
/// footnote). These play no part in alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marker {
    pub tag: Option<String>,
    pub text: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawVerseObject")]
pub enum VerseObject {
    /// An alignment unit: OL `content` and the target-language nodes under it.
    Milestone {
        content: Option<String>,
        occurrence: Option<u32>,
        children: Vec<VerseObject>,
    },
    /// A single target-language token.
    Word {
        text: String,
        occurrence: Option<u32>,
        lemma: Option<String>,
    },
    /// A literal run of text, usually whitespace or punctuation.
    Text { text: String },
    Quote(Marker),
    Paragraph(Marker),
    Section(Marker),
    Footnote(Marker),
    /// A character-style span such as `\add`. Its children are walked but it
    /// never matches a quote.
    Char {
        tag: Option<String>,
        children: Vec<VerseObject>,
    },
}

/// Flat shape of every verse object as it appears in JSON.
#[derive(Debug, Deserialize)]
struct RawVerseObject {
    #[serde(rename = "type")]
    kind: Option<String>,
    tag: Option<String>,
    text: Option<String>,
    content: Option<String>,
    lemma: Option<String>,
    occurrence: Option<serde_json::Value>,
    #[serde(default)]
    children: Vec<VerseObject>,
}

/// Occurrence fields are written both as numbers and as strings.
fn parse_occurrence(value: Option<serde_json::Value>) -> Option<u32> {
    match value? {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl TryFrom<RawVerseObject> for VerseObject {
    type Error = Error;

    fn try_from(raw: RawVerseObject) -> Result<Self> {
        let marker = |raw: RawVerseObject| Marker {
            tag: raw.tag,
            text: raw.text,
            content: raw.content,
        };
        let kind = raw.kind.clone().unwrap_or_else(|| {
            // Untyped objects with only text are plain text runs.
            if raw.text.is_some() { "text" } else { "" }.to_string()
        });
        let object = match kind.as_str() {
            "milestone" => VerseObject::Milestone {
                content: raw.content,
                occurrence: parse_occurrence(raw.occurrence),
                children: raw.children,
            },
            "word" => VerseObject::Word {
                text: raw.text.unwrap_or_default(),
                occurrence: parse_occurrence(raw.occurrence),
                lemma: raw.lemma,
            },
            "text" => VerseObject::Text {
                text: raw.text.unwrap_or_default(),
            },
            "quote" => VerseObject::Quote(marker(raw)),
            "paragraph" => VerseObject::Paragraph(marker(raw)),
            "section" => VerseObject::Section(marker(raw)),
            "footnote" => VerseObject::Footnote(marker(raw)),
            "char" => VerseObject::Char {
                tag: raw.tag,
                children: raw.children,
            },
            other => return Err(Error::UnknownVerseObject(other.to_string())),
        };
        Ok(object)
    }
}

impl VerseObject {
    /// Child nodes, empty for leaves and markers.
    pub fn children(&self) -> &[VerseObject] {
        match self {
            VerseObject::Milestone { children, .. } | VerseObject::Char { children, .. } => {
                children.as_slice()
            }
            _ => &[],
        }
    }

    /// Target-language text carried by a `word` or `text` leaf.
    pub fn leaf_text(&self) -> Option<&str> {
        match self {
            VerseObject::Word { text, .. } | VerseObject::Text { text } => Some(text.as_str()),
            _ => None,
        }
    }

    /// Occurrence of a leaf as recorded in the tree; `text` runs carry none
    /// and report 0.
    pub fn leaf_occurrence(&self) -> u32 {
        match self {
            VerseObject::Word { occurrence, .. } => occurrence.unwrap_or(0),
            _ => 0,
        }
    }
}

/// A verse entry of a chapter file: `{ "verseObjects": [...] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Verse {
    #[serde(rename = "verseObjects", default)]
    pub verse_objects: Vec<VerseObject>,
}

/// A chapter file, keyed by verse number (`"1"`, `"2"`, ... and `"front"`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Chapter {
    pub verses: HashMap<String, Verse>,
}

impl Chapter {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Verse objects of `verse`, or an empty slice if the chapter lacks it.
    pub fn verse_objects(&self, verse: &str) -> &[VerseObject] {
        self.verses
            .get(verse)
            .map(|v| v.verse_objects.as_slice())
            .unwrap_or(&[])
    }
}

/// Concatenates all text of a verse, descending into children.
pub fn plain_text(objects: &[VerseObject]) -> String {
    let mut text = String::new();
    push_text(objects, &mut text);
    text
}

fn push_text(objects: &[VerseObject], out: &mut String) {
    for object in objects {
        match object {
            VerseObject::Word { text, .. } | VerseObject::Text { text } => out.push_str(text),
            VerseObject::Quote(m)
            | VerseObject::Paragraph(m)
            | VerseObject::Section(m)
            | VerseObject::Footnote(m) => {
                if let Some(text) = &m.text {
                    out.push_str(text);
                }
            }
            _ => {}
        }
        push_text(object.children(), out);
    }
}

/// Returns `true` if some milestone with content lacks an occurrence.
pub fn has_missing_occurrences(objects: &[VerseObject]) -> bool {
    objects.iter().any(|object| match object {
        VerseObject::Milestone {
            content: Some(_),
            occurrence: None,
            ..
        } => true,
        other => has_missing_occurrences(other.children()),
    })
}

/// Gives every milestone with content but no occurrence the occurrence of
/// its content among all milestone contents of the verse, in tree order.
pub fn fill_missing_occurrences(objects: &mut [VerseObject]) {
    let mut contents = Vec::new();
    collect_contents(objects, &mut contents);
    let counts = occurrences(&contents);
    let mut next = counts.into_iter();
    assign_occurrences(objects, &mut next);
}

fn collect_contents(objects: &[VerseObject], out: &mut Vec<String>) {
    for object in objects {
        if let VerseObject::Milestone {
            content: Some(content),
            ..
        } = object
        {
            out.push(content.clone());
        }
        collect_contents(object.children(), out);
    }
}

fn assign_occurrences(objects: &mut [VerseObject], counts: &mut impl Iterator<Item = u32>) {
    for object in objects {
        match object {
            VerseObject::Milestone {
                content,
                occurrence,
                children,
            } => {
                if content.is_some() {
                    let computed = counts.next();
                    if occurrence.is_none() {
                        *occurrence = computed;
                    }
                }
                assign_occurrences(children, counts);
            }
            VerseObject::Char { children, .. } => assign_occurrences(children, counts),
            _ => {}
        }
    }
}
