//! Per-source text decoding
//!
//! Training rows, tag files and adversarial corpora may be stored under
//! different encodings. Only the two encodings the corpora actually use
//! are supported.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ArrError, ArrResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8", alias = "UTF-8")]
    Utf8,
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
}

impl TextEncoding {
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                String::from_utf8(bytes.to_vec()).ok()
            }
            // Latin-1 maps every byte to the code point of the same value
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
        }
    }

    /// Read a whole file under this encoding.
    pub fn read_to_string(self, path: &Path) -> ArrResult<String> {
        let bytes = std::fs::read(path).map_err(|e| ArrError::io(path, e))?;
        self.decode(&bytes).ok_or_else(|| ArrError::Decode {
            path: path.to_path_buf(),
            encoding: self.to_string(),
        })
    }
}

impl FromStr for TextEncoding {
    type Err = ArrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            other => Err(ArrError::InvalidInput(format!(
                "unknown encoding '{}'. Valid encodings: utf-8, latin-1",
                other
            ))),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "utf-8"),
            TextEncoding::Latin1 => write!(f, "latin-1"),
        }
    }
}
