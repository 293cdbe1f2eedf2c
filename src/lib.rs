//! Aligned-quote resolution and phrase highlighting for translation notes.
//!
//! Translation notes quote the original-language (OL) text of a verse. This
//! crate finds the words of a translation aligned to such a quote and
//! highlights them in the rendered verse:
//!
//! 1. **`get_alignment(objects, quote, occurrence)`**: walks the verse-object
//!    tree of an aligned translation and returns the target-language text
//!    aligned to each contiguous run of the quote, or `None` if any quote
//!    word cannot be placed.
//! 2. **`mark_phrases_in_html(html, phrase, occurrence, options)`**: wraps
//!    the `occurrence`th match of a phrase (for example a resolved
//!    alignment) in a tag, working across existing markup.
//! 3. **`VerseHighlighter`**: highlights all note phrases of a verse and
//!    reports the ones that could not be found, with a suggested fix.
//!
//! # Usage
//!
//! ```ignore
//! use quote_highlighter::{get_alignment, mark_phrases_in_html, MarkOptions, Phrase, Quote};
//! use quote_highlighter::fileio::load_chapter;
//!
//! fn example() -> quote_highlighter::Result<()> {
//!     let chapter = load_chapter("ult/tit/1.json")?;
//!     let objects = chapter.verse_objects("1");
//!
//!     if let Some(alignment) = get_alignment(objects, &Quote::from("δοῦλος Θεοῦ"), 1) {
//!         let phrase = Phrase::from(&alignment);
//!         let html = "Paul, a servant of God and an apostle of Jesus Christ";
//!         if let Some(marked) = mark_phrases_in_html(html, &phrase, 1, &MarkOptions::default()) {
//!             println!("{}", marked);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod alignment;
pub mod config;
pub mod error;
pub mod fallback;
pub mod fileio;
pub mod highlight;
pub mod marker;
pub mod occurrence;
pub mod pattern;
pub mod phrase;
pub mod quote;
pub mod regex;
pub mod variation;
pub mod verse_object;

pub use alignment::{flatten_alignment, get_alignment, try_alignment, AlignedFragment, Alignment, AlignmentResolver, MatchState};
pub use config::{HighlightConfig, MarkOptions, SmallWords};
pub use error::{Error, Result};
pub use highlight::{BadHighlight, HighlightOutcome, HighlightRequest, VerseHighlighter};
pub use marker::{mark_phrase_in_html, mark_phrases_in_html, try_mark_phrases_in_html, PhraseMarker};
pub use occurrence::occurrence_of;
pub use phrase::{Phrase, PhrasePart};
pub use quote::{get_quote_combinations, Combination, Quote, QuoteWord};
pub use variation::find_quote_variation_in_text;
pub use verse_object::{Chapter, VerseObject};
