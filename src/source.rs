// Source file loading and decoding

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::Charset;

const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Error)]
#[error("Cannot read {}: {source}", path.display())]
pub struct SourceError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// A decoded input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
    /// Charset the text was decoded with
    pub charset: Charset,
    /// Set when some bytes were not valid in `charset` and got replaced
    pub decode_error: bool,
}

impl SourceFile {
    /// Reads and decodes a file. Undecodable bytes are not an error here.
    pub fn read(path: impl AsRef<Path>, charset: Charset) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| SourceError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(path, &bytes, charset))
    }

    pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8], charset: Charset) -> Self {
        let (mut text, valid) = charset.decode(bytes);
        if text.starts_with(UTF8_BOM) {
            text.replace_range(..UTF8_BOM.len_utf8(), "");
        }
        Self {
            path: path.into(),
            text,
            charset,
            decode_error: !valid,
        }
    }

    /// In-memory source, always valid UTF-8
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            charset: Charset::Utf8,
            decode_error: false,
        }
    }
}
