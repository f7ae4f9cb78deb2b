//! String payload encodings

use crate::error::{FileAccessError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How string payloads map to file bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Utf8,
    Base64,
    Ascii,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Base64 => "base64",
            Encoding::Ascii => "ascii",
        }
    }

    /// Bytes to write for `data`
    pub fn to_bytes(&self, data: &str) -> Result<Vec<u8>> {
        match self {
            Encoding::Utf8 => Ok(data.as_bytes().to_vec()),
            Encoding::Base64 => STANDARD.decode(data.trim()).map_err(|e| {
                FileAccessError::InvalidArgument(format!("Invalid base64 data: {}", e))
            }),
            Encoding::Ascii => match data.char_indices().find(|(_, c)| !c.is_ascii()) {
                Some((index, c)) => Err(FileAccessError::InvalidArgument(format!(
                    "Non-ASCII character {:?} at byte {}",
                    c, index
                ))),
                None => Ok(data.as_bytes().to_vec()),
            },
        }
    }

    /// Text rendering of file bytes
    ///
    /// Invalid UTF-8 sequences and bytes above 0x7F under `ascii` become
    /// U+FFFD.
    pub fn to_text(&self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Base64 => STANDARD.encode(bytes),
            Encoding::Ascii => bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        b as char
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect(),
        }
    }
}

impl FromStr for Encoding {
    type Err = FileAccessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "base64" => Ok(Encoding::Base64),
            "ascii" => Ok(Encoding::Ascii),
            _ => Err(FileAccessError::InvalidArgument(format!(
                "Unsupported encoding: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("utf8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("base64".parse::<Encoding>().unwrap(), Encoding::Base64);
        assert_eq!("Ascii".parse::<Encoding>().unwrap(), Encoding::Ascii);
        assert!(matches!(
            "latin1".parse::<Encoding>(),
            Err(FileAccessError::InvalidArgument(_))
        ));
        assert_eq!(Encoding::default(), Encoding::Utf8);
    }

    #[test]
    fn test_utf8() {
        assert_eq!(Encoding::Utf8.to_bytes("héllo").unwrap(), "héllo".as_bytes());
        assert_eq!(Encoding::Utf8.to_text(&[0x68, 0xff, 0x69]), "h\u{FFFD}i");
    }

    #[test]
    fn test_base64() {
        assert_eq!(Encoding::Base64.to_bytes("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(Encoding::Base64.to_text(&[0, 255, 1]), "AP8B");
        assert!(matches!(
            Encoding::Base64.to_bytes("not base64!"),
            Err(FileAccessError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_ascii() {
        assert_eq!(Encoding::Ascii.to_bytes("plain").unwrap(), b"plain");
        assert!(Encoding::Ascii.to_bytes("café").is_err());
        assert_eq!(Encoding::Ascii.to_text(b"a\x80b"), "a\u{FFFD}b");
    }
}
