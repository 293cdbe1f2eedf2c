//! error.rs
//!
//! Error type shared by the crate. The alignment and marking entry points
//! report failure with `None`; the `try_*` wrappers and the I/O and config
//! boundaries use [`Error`] instead.

use thiserror::Error;

/// Result alias for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Not every quote word could be matched to a milestone of the verse.
    #[error("alignment not found for quote `{quote}`")]
    AlignmentNotFound { quote: String },

    /// The requested occurrence of a phrase is not present in the text.
    #[error("phrase `{phrase}` (occurrence {occurrence}) not found")]
    PhraseNotFound { phrase: String, occurrence: u32 },

    /// Quote data is missing the pieces needed to look it up.
    #[error("malformed quote: {0}")]
    MalformedQuote(String),

    /// A verse object carried a `type` tag this crate does not model.
    #[error("unknown verse object type `{0}`")]
    UnknownVerseObject(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
