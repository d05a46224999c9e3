//! harness::errors
//!
//! Error taxonomy for conformance checks.
//!
//! Only [`HarnessError::Decode`] and [`HarnessError::Fidelity`] raised while
//! validating storage defaults are classified (tolerated or fatal). Every
//! other variant fails the check that raised it.

use thiserror::Error;

use crate::codec::{CodecError, TypeId};
use crate::fixtures::{FixtureKind, StoreError};

/// Errors raised by harness components.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Bytes do not conform to the declared or resolved type.
    #[error("decode failed: {0}")]
    Decode(#[from] CodecError),

    /// Re-encoded bytes differ from the source bytes.
    #[error(
        "re-encoded bytes differ from original: expected {expected} bytes, got {actual} bytes (delta {delta:+}){}",
        .first_difference.map(|at| format!(", first difference at offset {at}")).unwrap_or_default()
    )]
    Fidelity {
        expected: usize,
        actual: usize,
        delta: i64,
        first_difference: Option<usize>,
    },

    /// Re-encoding was impossible because decode failed.
    #[error("re-encoded bytes differ from original: expected {expected} bytes, got no bytes ({source})")]
    Unreproducible { expected: usize, source: CodecError },

    /// Latest-shape materialization failed.
    #[error("conversion to latest failed: {0}")]
    Conversion(CodecError),

    /// Two distinct type definitions share one deduplication identity.
    #[error("type identity collision: '{identity}' is defined by types {first} and {second}")]
    Collision {
        identity: String,
        first: TypeId,
        second: TypeId,
    },

    /// The structural tree differs from the stored golden fixture.
    #[error("fixture v{version}/{name}-{kind} mismatch: {detail}")]
    FixtureMismatch {
        version: u32,
        name: String,
        kind: FixtureKind,
        detail: String,
    },

    #[error("decoded version {decoded} does not match declared version {declared}")]
    VersionMismatch { declared: u32, decoded: u32 },

    #[error("no active schema bound to the registry")]
    NoActiveSchema,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl HarnessError {
    /// Whether the default-value validator may tolerate this error.
    pub fn is_classifiable(&self) -> bool {
        matches!(self, HarnessError::Decode(_) | HarnessError::Fidelity { .. })
    }
}

/// Compare source bytes with re-encoded bytes.
///
/// # Errors
///
/// Returns `HarnessError::Fidelity` with the length delta and the first
/// differing offset when the slices are not equal.
pub fn compare_bytes(expected: &[u8], actual: &[u8]) -> Result<(), HarnessError> {
    if expected == actual {
        return Ok(());
    }
    let first_difference = expected
        .iter()
        .zip(actual)
        .position(|(a, b)| a != b)
        .or(Some(expected.len().min(actual.len())));
    Err(HarnessError::Fidelity {
        expected: expected.len(),
        actual: actual.len(),
        delta: actual.len() as i64 - expected.len() as i64,
        first_difference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_bytes_pass() {
        assert!(compare_bytes(&[1, 2], &[1, 2]).is_ok());
    }

    #[test]
    fn truncated_reports_negative_delta() {
        let err = compare_bytes(&[1, 2, 3, 4], &[1, 2]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "re-encoded bytes differ from original: expected 4 bytes, got 2 bytes (delta -2), first difference at offset 2"
        );
    }

    #[test]
    fn same_length_reports_offset() {
        let err = compare_bytes(&[1, 2, 3], &[1, 9, 3]).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Fidelity {
                delta: 0,
                first_difference: Some(1),
                ..
            }
        ));
    }

    #[test]
    fn unreproducible_names_decode_error() {
        let err = HarnessError::Unreproducible {
            expected: 10,
            source: CodecError::TrailingBytes(3),
        };
        let msg = err.to_string();
        assert!(msg.contains("re-encoded bytes differ"));
        assert!(msg.contains("3 trailing bytes"));
    }

    #[test]
    fn classification_scope() {
        assert!(HarnessError::Decode(CodecError::TypeNotFound(1)).is_classifiable());
        assert!(compare_bytes(&[1], &[]).unwrap_err().is_classifiable());
        assert!(!HarnessError::NoActiveSchema.is_classifiable());
        assert!(!HarnessError::Conversion(CodecError::TypeNotFound(1)).is_classifiable());
    }
}
