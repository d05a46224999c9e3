//! core::check
//!
//! The immutable input of one fixture run.

use super::exemption::Exemption;
use super::types::{parse_hex, Fingerprint, TypeError};

/// Encoded metadata plus the locations expected to fail default validation.
///
/// # Example
///
/// ```
/// use metaconform::core::check::Check;
/// use metaconform::core::exemption::Exemption;
///
/// let check = Check::from_hex("0x6d657461")
///     .unwrap()
///     .with_exemption(Exemption::item("System", "Events"));
///
/// assert_eq!(check.data(), b"meta");
/// assert_eq!(check.fails().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    data: Vec<u8>,
    fails: Vec<Exemption>,
    fingerprint: Fingerprint,
}

impl Check {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        let fingerprint = Fingerprint::of(&data);
        Self {
            data,
            fails: Vec::new(),
            fingerprint,
        }
    }

    /// Build from a hex payload (`0x` prefix optional).
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidHex` for malformed hex.
    pub fn from_hex(hex: &str) -> Result<Self, TypeError> {
        parse_hex(hex).map(Self::new)
    }

    /// Replace the exemption list.
    pub fn with_fails(mut self, fails: impl IntoIterator<Item = Exemption>) -> Self {
        self.fails = fails.into_iter().collect();
        self
    }

    /// Append one exemption.
    pub fn with_exemption(mut self, exemption: Exemption) -> Self {
        self.fails.push(exemption);
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn fails(&self) -> &[Exemption] {
        &self.fails
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}
