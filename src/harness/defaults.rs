//! harness::defaults
//!
//! Default-value validator.
//!
//! # Per-item steps
//!
//! For each storage item of each module, in declaration order:
//!
//! 1. Compute the item's [`Location`].
//! 2. Resolve the decode strategy (optional items unwrap a declared
//!    `Option<T>` to `T`).
//! 3. Decode the fallback bytes with `DecodeOptions { is_optional }`.
//! 4. If enabled, re-encode in [`EncodeMode::Full`] and compare bytes.
//! 5. [`classify`] the result.
//!
//! Steps 2 to 4 are structural; step 5 is a pure function of their result,
//! the strict flag and whether the location is exempt. A check fails only
//! for [`DefaultOutcome::Fatal`].

use super::errors::{compare_bytes, HarnessError};
use super::report::CheckResult;
use crate::codec::metadata::StorageEntry;
use crate::codec::{DecodeOptions, EncodeMode, MetadataCodec, Registry, SchemaContext};
use crate::core::check::Check;
use crate::core::exemption::{is_exempt, Location};
use crate::ui::output::{self, Verbosity};

/// Description of the check that fails when no schema can be bound.
pub const DEFAULTS_BOUND: &str = "storage defaults validated";

/// Classified result of one storage item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultOutcome {
    Ok,
    /// Failure demoted to a warning.
    Tolerated(String),
    /// Failure that fails the check.
    Fatal(String),
}

impl DefaultOutcome {
    pub fn is_fatal(&self) -> bool {
        matches!(self, DefaultOutcome::Fatal(_))
    }
}

/// Classify a per-item result.
///
/// A failure is fatal only when `strict` is set and the location is not
/// exempt; otherwise it is tolerated.
///
/// # Example
///
/// ```
/// use metaconform::harness::defaults::{classify, DefaultOutcome};
///
/// assert_eq!(classify(Ok(()), true, false), DefaultOutcome::Ok);
/// assert!(classify(Err("bad".into()), true, false).is_fatal());
/// assert!(!classify(Err("bad".into()), true, true).is_fatal());
/// assert!(!classify(Err("bad".into()), false, false).is_fatal());
/// ```
pub fn classify(result: Result<(), String>, strict: bool, exempt: bool) -> DefaultOutcome {
    match result {
        Ok(()) => DefaultOutcome::Ok,
        Err(reason) if strict && !exempt => DefaultOutcome::Fatal(reason),
        Err(reason) => DefaultOutcome::Tolerated(reason),
    }
}

/// Check description for one location.
pub fn describe(location: &Location) -> String {
    format!("default decodes: {location}")
}

/// Validate every storage default of the check's metadata.
///
/// Binds the decoded metadata as the active schema, then returns one check
/// per storage item. If decode or binding fails, a single failed
/// [`DEFAULTS_BOUND`] check is returned instead.
pub fn validate_defaults<C: MetadataCodec>(
    registry: &mut Registry<C>,
    check: &Check,
    strict: bool,
    verify_round_trip: bool,
    verbosity: Verbosity,
) -> Vec<CheckResult> {
    let bound = registry
        .decode(check.data())
        .map_err(HarnessError::Decode)
        .and_then(|m| registry.set_active_schema(&m).map_err(HarnessError::Conversion));
    if let Err(e) = bound {
        return vec![CheckResult::fail(DEFAULTS_BOUND, e)];
    }
    let (Some(latest), Some(schema)) = (registry.latest(), registry.schema()) else {
        return vec![CheckResult::fail(DEFAULTS_BOUND, HarnessError::NoActiveSchema)];
    };

    let mut results = Vec::new();
    for pallet in &latest.pallets {
        let Some(storage) = &pallet.storage else { continue };
        for entry in &storage.entries {
            let location = location_of(&schema, &pallet.name, entry);
            let result = validate_entry(&schema, entry, verify_round_trip);
            let exempt = is_exempt(check.fails(), &location);
            results.push(entry_check(&location, result, strict, exempt, verbosity));
        }
    }
    results
}

/// Turn one entry's validation result into its check.
///
/// Decode and fidelity errors are classified; any other error fails the
/// check regardless of `strict` or exemptions.
pub fn entry_check(
    location: &Location,
    result: Result<(), HarnessError>,
    strict: bool,
    exempt: bool,
    verbosity: Verbosity,
) -> CheckResult {
    let description = describe(location);
    let result = match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_classifiable() => Err(e.to_string()),
        Err(e) => return CheckResult::fail(description, e),
    };
    match classify(result, strict, exempt) {
        DefaultOutcome::Ok => CheckResult::pass(description),
        DefaultOutcome::Tolerated(reason) => {
            let msg = format!("{location}: {reason}");
            output::warn(&msg, verbosity);
            CheckResult::pass(description).with_warning(msg)
        }
        DefaultOutcome::Fatal(reason) => CheckResult::fail(description, reason),
    }
}

/// Location of a storage entry; falls back to the declared type's name if
/// the strategy cannot be resolved.
pub fn location_of(schema: &SchemaContext<'_>, module: &str, entry: &StorageEntry) -> Location {
    let type_name = match schema.resolve_storage_type(entry) {
        Ok(strategy) => strategy.type_name(),
        Err(_) => {
            let declared = schema.lookup().type_name(entry.ty.value());
            if entry.modifier.is_optional() {
                format!("Option<{declared}>")
            } else {
                declared
            }
        }
    };
    Location::new(module, &entry.name, type_name)
}

/// Decode (and optionally re-encode) one entry's fallback.
pub fn validate_entry(
    schema: &SchemaContext<'_>,
    entry: &StorageEntry,
    verify_round_trip: bool,
) -> Result<(), HarnessError> {
    let strategy = schema.resolve_storage_type(entry)?;
    let options = DecodeOptions {
        is_optional: strategy.optional,
    };
    let instance = schema.decode_value(&strategy, &entry.fallback, options)?;
    if verify_round_trip {
        compare_bytes(&entry.fallback, &instance.to_bytes(EncodeMode::Full))?;
    }
    Ok(())
}
