//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`FixtureName`] - Validated fixture name, safe to use in file names
//! - [`Fingerprint`] - SHA-256 digest of a metadata blob
//! - [`parse_hex`] - Hex decoding for metadata payloads
//!
//! # Validation
//!
//! These types enforce validity at construction time. A fixture name that
//! would escape the fixture root cannot be represented.
//!
//! # Examples
//!
//! ```
//! use metaconform::core::types::{Fingerprint, FixtureName};
//!
//! let name = FixtureName::new("relevant-chain").unwrap();
//! assert_eq!(name.as_str(), "relevant-chain");
//! assert!(FixtureName::new("../escape").is_err());
//!
//! let fp = Fingerprint::of(b"meta");
//! assert_eq!(fp.as_str().len(), 64);
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid fixture name: {0}")]
    InvalidFixtureName(String),

    #[error("invalid hex payload: {0}")]
    InvalidHex(String),
}

/// A validated fixture name.
///
/// Fixture names become part of a file name (`<name>-<kind>.json`):
/// - Cannot be empty
/// - Cannot start with `.` or `-`
/// - Only ASCII alphanumerics, `-`, `_` and `.`
///
/// # Example
///
/// ```
/// use metaconform::core::types::FixtureName;
///
/// assert!(FixtureName::new("kusama_9030").is_ok());
/// assert!(FixtureName::new("").is_err());
/// assert!(FixtureName::new("a/b").is_err());
/// assert!(FixtureName::new(".hidden").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FixtureName(String);

impl FixtureName {
    /// Create a new validated fixture name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidFixtureName` if the name is not file-name safe.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidFixtureName(
                "fixture name cannot be empty".into(),
            ));
        }
        if name.starts_with('.') || name.starts_with('-') {
            return Err(TypeError::InvalidFixtureName(format!(
                "'{name}' cannot start with '.' or '-'"
            )));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(TypeError::InvalidFixtureName(format!(
                "'{name}' contains '{c}'"
            )));
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FixtureName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FixtureName> for String {
    fn from(name: FixtureName) -> Self {
        name.0
    }
}

impl std::fmt::Display for FixtureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SHA-256 digest of a metadata payload, hex encoded.
///
/// Reports carry it so a failure can be tied to the exact input bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for display.
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decode a hex payload. A `0x` prefix and any whitespace are accepted.
///
/// # Errors
///
/// Returns `TypeError::InvalidHex` on odd length or non-hex digits.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, TypeError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    hex::decode(digits).map_err(|e| TypeError::InvalidHex(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod fixture_name {
        use super::*;

        #[test]
        fn valid_names() {
            assert!(FixtureName::new("relevant-chain").is_ok());
            assert!(FixtureName::new("polkadot_9110").is_ok());
            assert!(FixtureName::new("v1.2").is_ok());
        }

        #[test]
        fn path_separators_rejected() {
            assert!(FixtureName::new("a/b").is_err());
            assert!(FixtureName::new("a\\b").is_err());
            assert!(FixtureName::new("..").is_err());
        }

        #[test]
        fn whitespace_rejected() {
            assert!(FixtureName::new("has space").is_err());
        }

        #[test]
        fn serde_validates() {
            let ok: FixtureName = serde_json::from_str("\"chain\"").unwrap();
            assert_eq!(ok.as_str(), "chain");
            assert!(serde_json::from_str::<FixtureName>("\"-x\"").is_err());
        }
    }

    mod fingerprint {
        use super::*;

        #[test]
        fn deterministic() {
            assert_eq!(Fingerprint::of(b"abc"), Fingerprint::of(b"abc"));
            assert_ne!(Fingerprint::of(b"abc"), Fingerprint::of(b"abd"));
        }

        #[test]
        fn known_digest() {
            assert_eq!(
                Fingerprint::of(b"").as_str(),
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
            );
            assert_eq!(Fingerprint::of(b"").short(), "e3b0c44298fc");
        }
    }

    mod hex_payload {
        use super::*;

        #[test]
        fn prefix_optional() {
            assert_eq!(parse_hex("0x6d657461").unwrap(), b"meta");
            assert_eq!(parse_hex("6d657461\n").unwrap(), b"meta");
        }

        #[test]
        fn odd_length_rejected() {
            assert!(matches!(parse_hex("0x123"), Err(TypeError::InvalidHex(_))));
        }

        #[test]
        fn empty_is_empty() {
            assert_eq!(parse_hex("0x").unwrap(), Vec::<u8>::new());
        }
    }
}
