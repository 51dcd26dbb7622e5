//! Encoding editor text into the bytes written to a snapshot
//!
//! Editors declare the charset of the file they edit. Snapshots are written
//! in that same charset so a recovered snapshot can be copied over the
//! original without transcoding. Characters the charset cannot represent are
//! replaced with `?`.

use crate::error::{Result, SnapshotError};
use std::str::FromStr;

const REPLACEMENT: u8 = b'?';

/// Character encodings a document may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    /// Big-endian with a leading byte order mark
    Utf16,
    Utf16Be,
    Utf16Le,
    Latin1,
    Ascii,
}

impl Charset {
    /// Canonical name of the charset
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16 => "UTF-16",
            Self::Utf16Be => "UTF-16BE",
            Self::Utf16Le => "UTF-16LE",
            Self::Latin1 => "ISO-8859-1",
            Self::Ascii => "US-ASCII",
        }
    }

    /// Encode `text` in this charset
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf16 => {
                let mut out = Vec::with_capacity(2 + text.len() * 2);
                out.extend_from_slice(&[0xFE, 0xFF]);
                out.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
                out
            }
            Self::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Self::Latin1 => encode_single_byte(text, 0xFF),
            Self::Ascii => encode_single_byte(text, 0x7F),
        }
    }
}

fn encode_single_byte(text: &str, max: u32) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= max {
                code as u8
            } else {
                REPLACEMENT
            }
        })
        .collect()
}

impl Default for Charset {
    fn default() -> Self {
        Self::Utf8
    }
}

impl FromStr for Charset {
    type Err = SnapshotError;

    fn from_str(name: &str) -> Result<Self> {
        let normalized = name.trim().to_ascii_uppercase().replace('_', "-");
        match normalized.as_str() {
            "UTF-8" | "UTF8" => Ok(Self::Utf8),
            "UTF-16" | "UTF16" => Ok(Self::Utf16),
            "UTF-16BE" | "UTF16BE" => Ok(Self::Utf16Be),
            "UTF-16LE" | "UTF16LE" => Ok(Self::Utf16Le),
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" | "LATIN-1" => Ok(Self::Latin1),
            "US-ASCII" | "ASCII" => Ok(Self::Ascii),
            _ => Err(SnapshotError::UnsupportedCharset(name.to_string())),
        }
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("utf-8".parse::<Charset>().unwrap(), Charset::Utf8);
        assert_eq!("UTF8".parse::<Charset>().unwrap(), Charset::Utf8);
        assert_eq!("latin1".parse::<Charset>().unwrap(), Charset::Latin1);
        assert_eq!("ISO_8859_1".parse::<Charset>().unwrap(), Charset::Latin1);
        assert_eq!(" utf-16le ".parse::<Charset>().unwrap(), Charset::Utf16Le);
    }

    #[test]
    fn test_unknown_charset_is_rejected() {
        let err = "EBCDIC-FANTASY".parse::<Charset>().unwrap_err();
        assert!(matches!(err, SnapshotError::UnsupportedCharset(name) if name == "EBCDIC-FANTASY"));
    }

    #[test]
    fn test_utf16_variants() {
        assert_eq!(Charset::Utf16Be.encode("A"), vec![0x00, 0x41]);
        assert_eq!(Charset::Utf16Le.encode("A"), vec![0x41, 0x00]);
        assert_eq!(Charset::Utf16.encode("A"), vec![0xFE, 0xFF, 0x00, 0x41]);
    }

    #[test]
    fn test_single_byte_replacement() {
        assert_eq!(Charset::Latin1.encode("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(Charset::Ascii.encode("café"), b"caf?".to_vec());
        assert_eq!(Charset::Latin1.encode("€"), b"?".to_vec());
    }

    #[test]
    fn test_utf8_passthrough() {
        assert_eq!(Charset::Utf8.encode("héllo"), "héllo".as_bytes().to_vec());
        assert_eq!(Charset::default().name(), "UTF-8");
    }
}
