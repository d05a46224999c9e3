//! harness
//!
//! Conformance harness for versioned metadata.
//!
//! # Architecture
//!
//! Four components run in sequence for each fixture, against one freshly
//! constructed [`Registry`]:
//!
//! 1. [`roundtrip`] - byte-exact re-encoding, calls-only decodability
//! 2. [`golden`] - structural tree vs stored golden fixture
//! 3. [`conversion`] - latest projection, legacy identity collisions
//! 4. [`defaults`] - every storage fallback decodes (and round-trips)
//!
//! Each component registers independent named checks in a
//! [`FixtureReport`]. A failure fails only its own check.
//!
//! # Example
//!
//! ```
//! use metaconform::codec::metadata::{LegacyMetadata, MetadataBody, RuntimeMetadata};
//! use metaconform::codec::{DecodedMetadata, ReferenceCodec};
//! use metaconform::core::check::Check;
//! use metaconform::core::types::FixtureName;
//! use metaconform::fixtures::MemoryFixtureStore;
//! use metaconform::harness::{run_fixture, Fixture, HarnessOptions, StrictMode};
//!
//! let bytes = RuntimeMetadata::new(
//!     9,
//!     MetadataBody::Legacy(LegacyMetadata { modules: vec![], extrinsic: None }),
//! )
//! .unwrap()
//! .to_bytes();
//!
//! let fixture = Fixture::new(FixtureName::new("empty").unwrap(), 9, Check::new(bytes));
//! let store = MemoryFixtureStore::new();
//! let options = HarnessOptions::default().with_mode(StrictMode::Reconcile);
//!
//! let report = run_fixture(ReferenceCodec, &store, &fixture, &options);
//! report.assert_passed();
//! assert_eq!(store.len(), 1);
//! ```

pub mod conversion;
pub mod defaults;
pub mod errors;
pub mod golden;
pub mod report;
pub mod roundtrip;

pub use defaults::{classify, DefaultOutcome};
pub use errors::HarnessError;
pub use golden::{ParseModeError, StrictMode};
pub use report::{CheckOutcome, CheckResult, FixtureReport, SkippedFixture, SuiteReport};

use crate::codec::{MetadataCodec, Registry};
use crate::core::check::Check;
use crate::core::types::FixtureName;
use crate::fixtures::{FixtureSpec, FixtureStore, Manifest};
use crate::ui::output::{self, Verbosity};

/// Knobs for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessOptions {
    pub mode: StrictMode,
    /// Non-exempt default failures are fatal.
    pub strict_defaults: bool,
    /// Re-encode storage defaults and compare bytes.
    pub verify_round_trip: bool,
    /// Legacy identity collisions are fatal.
    pub strict_uniqueness: bool,
    pub verbosity: Verbosity,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            mode: StrictMode::Reconcile,
            strict_defaults: true,
            verify_round_trip: true,
            strict_uniqueness: true,
            verbosity: Verbosity::Normal,
        }
    }
}

impl HarnessOptions {
    pub fn with_mode(mut self, mode: StrictMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Apply a manifest entry's overrides.
    pub fn for_spec(mut self, spec: &FixtureSpec) -> Self {
        if let Some(v) = spec.strict_defaults {
            self.strict_defaults = v;
        }
        if let Some(v) = spec.verify_round_trip {
            self.verify_round_trip = v;
        }
        if let Some(v) = spec.strict_uniqueness {
            self.strict_uniqueness = v;
        }
        self
    }
}

/// A named check declared under a schema version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub name: FixtureName,
    pub version: u32,
    pub check: Check,
}

impl Fixture {
    pub fn new(name: FixtureName, version: u32, check: Check) -> Self {
        Self {
            name,
            version,
            check,
        }
    }
}

/// Run all four components for one fixture on a fresh registry.
pub fn run_fixture<C, S>(codec: C, store: &S, fixture: &Fixture, options: &HarnessOptions) -> FixtureReport
where
    C: MetadataCodec,
    S: FixtureStore + ?Sized,
{
    let Fixture {
        name,
        version,
        check,
    } = fixture;
    let verbosity = options.verbosity;
    output::debug(
        format!("running v{version} {name} ({})", check.fingerprint().short()),
        verbosity,
    );

    let mut registry = Registry::new(codec);
    let mut report = FixtureReport::new(name.clone(), *version, check.fingerprint().clone());

    report.extend(roundtrip::verify_round_trip(&registry, check));
    report.extend(golden::reconcile_fixture(
        &mut registry,
        store,
        options.mode,
        name,
        *version,
        check,
        verbosity,
    ));
    report.push(conversion::check_conversion(
        &mut registry,
        *version,
        check,
        options.strict_uniqueness,
        verbosity,
    ));
    report.extend(defaults::validate_defaults(
        &mut registry,
        check,
        options.strict_defaults,
        options.verify_round_trip,
        verbosity,
    ));

    output::debug(
        format!(
            "v{version} {name}: {} check(s), {} failed",
            report.checks.len(),
            report.failures().count()
        ),
        verbosity,
    );
    report
}

/// Runs the fixtures of a manifest.
#[derive(Debug, Clone)]
pub struct Suite {
    manifest: Manifest,
    options: HarnessOptions,
    version: Option<u32>,
    name: Option<String>,
}

impl Suite {
    pub fn new(manifest: Manifest, options: HarnessOptions) -> Self {
        Self {
            manifest,
            options,
            version: None,
            name: None,
        }
    }

    /// Only run fixtures declared under `version`.
    pub fn version(mut self, version: Option<u32>) -> Self {
        self.version = version;
        self
    }

    /// Only run the fixture called `name`.
    pub fn fixture(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Run every selected fixture, each on its own registry.
    ///
    /// Fixtures whose payload cannot be loaded are reported as skipped.
    pub fn run<C, S>(&self, codec: &C, store: &S) -> SuiteReport
    where
        C: MetadataCodec + Clone,
        S: FixtureStore + ?Sized,
    {
        let mut report = SuiteReport::default();
        for spec in self.manifest.select(self.version, self.name.as_deref()) {
            let check = match spec.to_check(&self.manifest.base_dir) {
                Ok(check) => check,
                Err(e) => {
                    output::warn(
                        format!("skipping v{} {}: {e}", spec.version, spec.name),
                        self.options.verbosity,
                    );
                    report.skipped.push(SkippedFixture {
                        name: spec.name.to_string(),
                        version: spec.version,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            let fixture = Fixture::new(spec.name.clone(), spec.version, check);
            let options = self.options.for_spec(spec);
            report
                .fixtures
                .push(run_fixture(codec.clone(), store, &fixture, &options));
        }
        report
    }
}
