//! Analysis configuration
//!
//! [`AnalysisConfig`] is built once (defaults, then an optional properties
//! file, then command-line overrides) and handed by value to every
//! [`Pipeline`](crate::pipeline::Pipeline).

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// Property key selecting the source character set
pub const SOURCE_ENCODING_KEY: &str = "sonar.sourceEncoding";

/// Property key switching parser error recovery on or off
pub const ERROR_RECOVERY_KEY: &str = "sonar.cxx.errorRecoveryEnabled";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported charset '{0}'")]
    UnknownCharset(String),

    #[error("Invalid value '{value}' for {key} at line {line}: expected true or false")]
    InvalidBoolean { key: String, value: String, line: usize },

    #[error("Malformed property at line {line}: '{text}'")]
    MalformedLine { line: usize, text: String },

    #[error("Cannot read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Character sets source files can be decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    #[default]
    Utf8,
    UsAscii,
    Iso8859_1,
}

impl Charset {
    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::UsAscii => "US-ASCII",
            Charset::Iso8859_1 => "ISO-8859-1",
        }
    }

    /// Decodes `bytes`; returns the text and whether every byte was valid.
    ///
    /// Invalid input never fails: bad sequences become U+FFFD.
    pub fn decode(self, bytes: &[u8]) -> (String, bool) {
        match self {
            Charset::Utf8 => match std::str::from_utf8(bytes) {
                Ok(text) => (text.to_string(), true),
                Err(_) => (String::from_utf8_lossy(bytes).into_owned(), false),
            },
            Charset::UsAscii => {
                let valid = bytes.is_ascii();
                let text = bytes
                    .iter()
                    .map(|&b| if b.is_ascii() { char::from(b) } else { char::REPLACEMENT_CHARACTER })
                    .collect();
                (text, valid)
            }
            // every byte maps to the code point of the same value
            Charset::Iso8859_1 => (bytes.iter().map(|&b| char::from(b)).collect(), true),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "us-ascii" | "ascii" | "us_ascii" => Ok(Charset::UsAscii),
            "iso-8859-1" | "iso8859-1" | "iso_8859_1" | "latin1" | "latin-1" => Ok(Charset::Iso8859_1),
            _ => Err(ConfigError::UnknownCharset(s.trim().to_string())),
        }
    }
}

/// Settings shared by every file of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub charset: Charset,
    /// Recover from syntax errors instead of stopping at the first one
    pub error_recovery: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            charset: Charset::Utf8,
            error_recovery: true,
        }
    }
}

impl AnalysisConfig {
    /// Reads `key=value` (or `key: value`) properties on top of the defaults.
    ///
    /// Lines starting with `#` or `!` and blank lines are skipped, unknown keys
    /// are ignored.
    pub fn from_properties(text: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (index, raw) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let Some((key, value)) = line.split_once(['=', ':']) else {
                return Err(ConfigError::MalformedLine {
                    line: line_number,
                    text: line.to_string(),
                });
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                SOURCE_ENCODING_KEY => config.charset = value.parse()?,
                ERROR_RECOVERY_KEY => config.error_recovery = parse_bool(key, value, line_number)?,
                _ => {}
            }
        }

        Ok(config)
    }

    /// Loads a properties file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_properties(&text)
    }
}

fn parse_bool(key: &str, value: &str, line: usize) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            key: key.to_string(),
            value: value.to_string(),
            line,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.charset, Charset::Utf8);
        assert!(config.error_recovery);
    }

    #[test]
    fn test_from_properties() {
        let text = "# project settings\n\
                    ! legacy comment\n\
                    \n\
                    sonar.sourceEncoding = ISO-8859-1\n\
                    sonar.cxx.errorRecoveryEnabled=False\n\
                    sonar.projectKey: demo\n";
        let config = AnalysisConfig::from_properties(text).unwrap();
        assert_eq!(config.charset, Charset::Iso8859_1);
        assert!(!config.error_recovery);
    }

    #[test]
    fn test_invalid_values() {
        let err = AnalysisConfig::from_properties("sonar.cxx.errorRecoveryEnabled=maybe").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBoolean { line: 1, .. }));

        let err = AnalysisConfig::from_properties("sonar.sourceEncoding=EBCDIC").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported charset 'EBCDIC'");

        let err = AnalysisConfig::from_properties("\njust some words").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn test_charset_names() {
        assert_eq!("utf8".parse::<Charset>().unwrap(), Charset::Utf8);
        assert_eq!("Latin1".parse::<Charset>().unwrap(), Charset::Iso8859_1);
        assert_eq!(" US-ASCII ".parse::<Charset>().unwrap(), Charset::UsAscii);
        assert_eq!(Charset::UsAscii.to_string(), "US-ASCII");
    }

    #[test]
    fn test_decode() {
        assert_eq!(Charset::Utf8.decode("héllo".as_bytes()), ("héllo".to_string(), true));

        let (text, valid) = Charset::Utf8.decode(&[b'a', 0xff, b'b']);
        assert!(!valid);
        assert_eq!(text, "a\u{fffd}b");

        let (text, valid) = Charset::UsAscii.decode(&[b'a', 0xe9]);
        assert!(!valid);
        assert_eq!(text, "a\u{fffd}");

        assert_eq!(Charset::Iso8859_1.decode(&[b'a', 0xe9]), ("aé".to_string(), true));
    }
}
