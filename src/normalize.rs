//! Unicode normalization pass.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

/// Unicode normalization form applied before and after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationForm {
    /// Canonical composition
    #[default]
    Nfc,
    /// Canonical decomposition
    Nfd,
    /// Compatibility composition
    Nfkc,
    /// Compatibility decomposition
    Nfkd,
}

impl NormalizationForm {
    /// Parses a form name, falling back to NFC for anything unrecognised.
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::debug!("unknown normalization form {:?}, falling back to NFC", name);
            Self::Nfc
        })
    }

    /// Returns the compatibility counterpart (NFC -> NFKC, NFD -> NFKD).
    pub fn compatibility(self) -> Self {
        match self {
            Self::Nfc | Self::Nfkc => Self::Nfkc,
            Self::Nfd | Self::Nfkd => Self::Nfkd,
        }
    }

    /// Returns true for NFKC and NFKD.
    pub fn is_compatibility(self) -> bool {
        matches!(self, Self::Nfkc | Self::Nfkd)
    }

    /// Normalizes `input` into this form.
    pub fn apply(self, input: &str) -> String {
        let mut result = String::with_capacity(input.len());
        match self {
            Self::Nfc => result.extend(input.nfc()),
            Self::Nfd => result.extend(input.nfd()),
            Self::Nfkc => result.extend(input.nfkc()),
            Self::Nfkd => result.extend(input.nfkd()),
        }
        result
    }
}

impl FromStr for NormalizationForm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nfc" => Ok(Self::Nfc),
            "nfd" => Ok(Self::Nfd),
            "nfkc" => Ok(Self::Nfkc),
            "nfkd" => Ok(Self::Nfkd),
            _ => Err(Error::UnknownNormalizationForm(s.to_string())),
        }
    }
}

impl fmt::Display for NormalizationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nfc => write!(f, "NFC"),
            Self::Nfd => write!(f, "NFD"),
            Self::Nfkc => write!(f, "NFKC"),
            Self::Nfkd => write!(f, "NFKD"),
        }
    }
}
