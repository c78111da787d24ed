//! Pack format compatibility.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of comparing an overlay's pack format with the loaded content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compatibility {
    /// Formats match, or there is nothing to compare against.
    Compatible,
    /// Formats differ.
    Mismatch,
    /// The pack declares no format.
    NoMetadata,
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compatible => write!(f, "compatible"),
            Self::Mismatch => write!(f, "version_mismatch"),
            Self::NoMetadata => write!(f, "no_metadata"),
        }
    }
}

/// Visual weight of a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningTone {
    /// Known incompatibility.
    Orange,
    /// Unverifiable.
    Yellow,
}

/// Title/body pair shown for a non-compatible pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityWarning {
    /// Short heading.
    pub title: String,
    /// Explanation.
    pub body: String,
    /// Visual weight.
    pub tone: WarningTone,
}

/// Compare `pack_format` with `expected_format`.
pub fn compatibility(pack_format: Option<u32>, expected_format: Option<u32>) -> Compatibility {
    match (pack_format, expected_format) {
        (None, _) => Compatibility::NoMetadata,
        (Some(_), None) => Compatibility::Compatible,
        (Some(pack), Some(expected)) if pack == expected => Compatibility::Compatible,
        _ => Compatibility::Mismatch,
    }
}

/// Warning for `level`, or `None` when compatible.
pub fn message(
    level: Compatibility,
    pack_format: Option<u32>,
    expected_format: Option<u32>,
) -> Option<CompatibilityWarning> {
    match level {
        Compatibility::Compatible => None,
        Compatibility::Mismatch => {
            let made_for = match pack_format {
                Some(format) => format!("Pack Format {}", format),
                None => "Pack Format Unknown".to_string(),
            };
            let expected = match expected_format {
                Some(format) => format!("Selected Version: Pack Format {}", format),
                None => "Selected Version: Unknown Format".to_string(),
            };
            Some(CompatibilityWarning {
                title: "Incompatible Pack Format".to_string(),
                body: format!(
                    "{}\n{}\n\nThis data pack may not work correctly in the selected version.",
                    made_for, expected
                ),
                tone: WarningTone::Orange,
            })
        }
        Compatibility::NoMetadata => Some(CompatibilityWarning {
            title: "Cannot Verify Version".to_string(),
            body: "This data pack is missing pack.mcmeta or has an invalid pack_format value.\n\n\
                   Cannot determine version compatibility."
                .to_string(),
            tone: WarningTone::Yellow,
        }),
    }
}
