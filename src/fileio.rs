//! File input for verse data and configuration.
//!
//! Chapter files are the usfm-js JSON produced for each chapter of a book
//! (`<book>/<chapter>.json`), mapping verse numbers to their verse objects.
//! Configuration files are TOML (see [`HighlightConfig`]).
//!
//! Files are assumed to be UTF-8; a leading byte order mark is dropped.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::HighlightConfig;
use crate::error::Result;
use crate::verse_object::Chapter;

/// Reads a UTF-8 text file, removing a leading BOM if present.
///
/// # Examples
///
/// ```no_run
/// use quote_highlighter::fileio::read_text;
///
/// # fn main() -> quote_highlighter::error::Result<()> {
/// let json = read_text("bibles/ult/tit/1.json")?;
/// println!("{} bytes", json.len());
/// # Ok(())
/// # }
/// ```
pub fn read_text<P: AsRef<Path>>(filename: P) -> Result<String> {
    let content = fs::read_to_string(filename.as_ref())?;
    let content = match content.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    };
    debug!(path = %filename.as_ref().display(), bytes = content.len(), "read file");
    Ok(content)
}

/// Loads one chapter of verse objects.
pub fn load_chapter<P: AsRef<Path>>(filename: P) -> Result<Chapter> {
    Chapter::from_json_str(&read_text(filename)?)
}

/// Loads a highlighting configuration.
pub fn load_config<P: AsRef<Path>>(filename: P) -> Result<HighlightConfig> {
    HighlightConfig::from_toml_str(&read_text(filename)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::path::PathBuf;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("quote-highlighter-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_text_strips_bom() {
        let path = temp_file("bom.txt", "\u{FEFF}Παῦλος");
        assert_eq!(read_text(&path).unwrap(), "Παῦλος");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_chapter() {
        let path = temp_file(
            "1.json",
            r#"{"1": {"verseObjects": [
                {"type": "milestone", "content": "Παῦλος", "occurrence": 1,
                 "children": [{"type": "word", "text": "Paul", "occurrence": 1}]},
                {"type": "text", "text": ", "}
            ]}}"#,
        );
        let chapter = load_chapter(&path).unwrap();
        assert_eq!(chapter.verse_objects("1").len(), 2);
        assert!(chapter.verse_objects("2").is_empty());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_config() {
        let path = temp_file("highlight.toml", "skip_small_words = false\n");
        let config = load_config(&path).unwrap();
        assert!(!config.skip_small_words);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = read_text("/nonexistent/quote-highlighter/file.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
