//! harness::roundtrip
//!
//! Round-trip verifier.
//!
//! Two checks per fixture:
//!
//! - [`REENCODES`]: decode, re-encode, compare byte for byte. Everything
//!   downstream assumes decode is lossless.
//! - [`CALLS_ONLY`]: the calls-only projection, re-encoded, decodes again.
//!
//! Rebuilding metadata from its own re-encoded bytes is implied by the
//! first check and is not run separately.

use super::errors::{compare_bytes, HarnessError};
use super::report::CheckResult;
use crate::codec::{DecodedMetadata, MetadataCodec, Registry};
use crate::core::check::Check;

pub const REENCODES: &str = "re-encodes identically";
pub const CALLS_ONLY: &str = "calls-only projection decodes";

/// Run both round-trip checks.
pub fn verify_round_trip<C: MetadataCodec>(registry: &Registry<C>, check: &Check) -> Vec<CheckResult> {
    vec![
        CheckResult::from_result(REENCODES, reencodes(registry, check)),
        CheckResult::from_result(CALLS_ONLY, calls_only(registry, check)),
    ]
}

fn reencodes<C: MetadataCodec>(registry: &Registry<C>, check: &Check) -> Result<(), HarnessError> {
    let metadata = registry
        .decode(check.data())
        .map_err(|source| HarnessError::Unreproducible {
            expected: check.data().len(),
            source,
        })?;
    compare_bytes(check.data(), &metadata.to_bytes())
}

fn calls_only<C: MetadataCodec>(registry: &Registry<C>, check: &Check) -> Result<(), HarnessError> {
    let metadata = registry.decode(check.data())?;
    let projected = metadata.as_calls_only().to_bytes();
    registry.decode(&projected)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::metadata::{
        LegacyCall, LegacyMetadata, LegacyModule, MetadataBody, RuntimeMetadata,
    };
    use crate::codec::ReferenceCodec;

    fn blob() -> Vec<u8> {
        RuntimeMetadata::new(
            10,
            MetadataBody::Legacy(LegacyMetadata {
                modules: vec![LegacyModule {
                    name: "Timestamp".into(),
                    storage: None,
                    calls: Some(vec![LegacyCall {
                        name: "set".into(),
                        args: vec![],
                        docs: vec![],
                    }]),
                    events: None,
                    constants: vec![],
                    errors: vec![],
                    index: None,
                }],
                extrinsic: None,
            }),
        )
        .unwrap()
        .to_bytes()
    }

    #[test]
    fn valid_blob_passes_both() {
        let registry = Registry::new(ReferenceCodec);
        let results = verify_round_trip(&registry, &Check::new(blob()));
        assert!(results.iter().all(CheckResult::passed), "{results:?}");
        assert_eq!(results[0].description, REENCODES);
        assert_eq!(results[1].description, CALLS_ONLY);
    }

    #[test]
    fn truncated_blob_fails_with_byte_inequality() {
        let mut data = blob();
        data.truncate(data.len() - 3);
        let registry = Registry::new(ReferenceCodec);
        let results = verify_round_trip(&registry, &Check::new(data));

        let msg = results[0].failure().unwrap();
        assert!(msg.starts_with("re-encoded bytes differ from original"), "{msg}");
        assert!(!results[1].passed());
    }

    #[test]
    fn trailing_garbage_fails() {
        let mut data = blob();
        data.push(0);
        let registry = Registry::new(ReferenceCodec);
        let results = verify_round_trip(&registry, &Check::new(data));
        assert!(results[0]
            .failure()
            .unwrap()
            .contains("trailing bytes"));
    }
}
