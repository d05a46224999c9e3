//! harness::golden
//!
//! Golden-fixture reconciler.
//!
//! # Protocol
//!
//! 1. Decode the check and assert the decoded version equals the declared
//!    one; bind the metadata as the registry's active schema.
//! 2. Render the structural tree and remove `metadata.v<N>.lookup`.
//! 3. Compare with the stored `(version, name, json)` fixture.
//! 4. For v14+, compare the removed lookup with `(version, name, types)`.
//!
//! On a missing or different fixture, [`StrictMode::Enforce`] fails the
//! check; [`StrictMode::Reconcile`] logs the difference and overwrites the
//! fixture, so the same run doubles as a fixture generator.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use super::errors::HarnessError;
use super::report::CheckResult;
use crate::codec::{DecodedMetadata, MetadataCodec, Registry, LOOKUP_VERSION};
use crate::core::check::Check;
use crate::core::types::FixtureName;
use crate::fixtures::{FixtureKind, FixtureStore, StoreError};
use crate::ui::output::{self, Verbosity};

pub const VERSION_MATCHES: &str = "decoded version matches declared version";
pub const TREE_MATCHES: &str = "structural tree matches fixture";
pub const TYPES_MATCH: &str = "type lookup matches fixture";

/// Environment variable marking automated runs.
pub const CI_ENV: &str = "CI";

/// Maximum differing paths listed in a mismatch.
const DIFF_LIMIT: usize = 5;

/// Fixture mismatch policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrictMode {
    /// Mismatches fail the check.
    Enforce,
    /// Mismatches overwrite the stored fixture.
    Reconcile,
}

impl StrictMode {
    /// `Enforce` when `CI` is set to anything but empty, `0` or `false`.
    pub fn from_env() -> Self {
        Self::from_ci_value(std::env::var(CI_ENV).ok().as_deref())
    }

    /// Decide from a raw `CI` value.
    ///
    /// # Example
    ///
    /// ```
    /// use metaconform::harness::StrictMode;
    ///
    /// assert_eq!(StrictMode::from_ci_value(Some("true")), StrictMode::Enforce);
    /// assert_eq!(StrictMode::from_ci_value(Some("0")), StrictMode::Reconcile);
    /// assert_eq!(StrictMode::from_ci_value(None), StrictMode::Reconcile);
    /// ```
    pub fn from_ci_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("0") => StrictMode::Reconcile,
            Some(v) if v.eq_ignore_ascii_case("false") => StrictMode::Reconcile,
            Some(_) => StrictMode::Enforce,
        }
    }

    /// Pick the effective mode.
    ///
    /// An explicit flag always wins. Otherwise an `Enforce` environment
    /// cannot be downgraded by configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use metaconform::harness::StrictMode::{Enforce, Reconcile};
    /// use metaconform::harness::StrictMode;
    ///
    /// assert_eq!(StrictMode::resolve(None, Some(Reconcile), Enforce), Enforce);
    /// assert_eq!(StrictMode::resolve(Some(Reconcile), None, Enforce), Reconcile);
    /// assert_eq!(StrictMode::resolve(None, Some(Enforce), Reconcile), Enforce);
    /// ```
    pub fn resolve(flag: Option<Self>, configured: Option<Self>, env: Self) -> Self {
        match (flag, env) {
            (Some(mode), _) => mode,
            (None, StrictMode::Enforce) => StrictMode::Enforce,
            (None, StrictMode::Reconcile) => configured.unwrap_or(env),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrictMode::Enforce => "enforce",
            StrictMode::Reconcile => "reconcile",
        }
    }
}

impl fmt::Display for StrictMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a [`StrictMode`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode '{0}', expected 'enforce' or 'reconcile'")]
pub struct ParseModeError(String);

impl FromStr for StrictMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enforce" => Ok(StrictMode::Enforce),
            "reconcile" => Ok(StrictMode::Reconcile),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Compare a fixture's trees with the store, reconciling per `mode`.
///
/// Binds the decoded metadata as the registry's active schema.
pub fn reconcile_fixture<C, S>(
    registry: &mut Registry<C>,
    store: &S,
    mode: StrictMode,
    name: &FixtureName,
    version: u32,
    check: &Check,
    verbosity: Verbosity,
) -> Vec<CheckResult>
where
    C: MetadataCodec,
    S: FixtureStore + ?Sized,
{
    let with_types = version >= LOOKUP_VERSION;
    let metadata = match registry.decode(check.data()) {
        Ok(m) => m,
        Err(e) => {
            let err = HarnessError::Decode(e);
            let mut results = vec![
                CheckResult::fail(VERSION_MATCHES, &err),
                CheckResult::fail(TREE_MATCHES, &err),
            ];
            if with_types {
                results.push(CheckResult::fail(TYPES_MATCH, &err));
            }
            return results;
        }
    };

    let mut version_check = CheckResult::from_result(VERSION_MATCHES, {
        let decoded = metadata.version();
        if decoded == version {
            Ok(())
        } else {
            Err(HarnessError::VersionMismatch {
                declared: version,
                decoded,
            })
        }
    });
    if let Err(e) = registry.set_active_schema(&metadata) {
        let msg = format!("active schema not bound: {e}");
        output::warn(&msg, verbosity);
        version_check = version_check.with_warning(msg);
    }

    let (tree, lookup) = match structural_trees(&metadata) {
        Ok(trees) => trees,
        Err(e) => {
            let mut results = vec![version_check, CheckResult::fail(TREE_MATCHES, &e)];
            if with_types {
                results.push(CheckResult::fail(TYPES_MATCH, &e));
            }
            return results;
        }
    };

    let ctx = Reconcile {
        store,
        mode,
        name,
        version,
        verbosity,
    };
    let mut results = vec![version_check, ctx.check(TREE_MATCHES, FixtureKind::Json, &tree)];
    if with_types {
        results.push(ctx.check(TYPES_MATCH, FixtureKind::Types, &lookup));
    }
    results
}

/// The structural tree with `metadata.v<N>.lookup` removed, and the lookup.
///
/// The lookup is `null` when the body has none (legacy versions).
pub fn structural_trees<M: DecodedMetadata>(metadata: &M) -> Result<(Value, Value), HarnessError> {
    let mut tree = metadata.to_json()?;
    let key = format!("v{}", metadata.version());
    let lookup = tree
        .get_mut("metadata")
        .and_then(|m| m.get_mut(&key))
        .and_then(Value::as_object_mut)
        .and_then(|body| body.remove("lookup"))
        .unwrap_or(Value::Null);
    Ok((tree, lookup))
}

struct Reconcile<'a, S: ?Sized> {
    store: &'a S,
    mode: StrictMode,
    name: &'a FixtureName,
    version: u32,
    verbosity: Verbosity,
}

impl<S: FixtureStore + ?Sized> Reconcile<'_, S> {
    fn check(&self, description: &str, kind: FixtureKind, tree: &Value) -> CheckResult {
        match self.compare(kind, tree) {
            Ok(None) => CheckResult::pass(description),
            Ok(Some(warning)) => CheckResult::pass(description).with_warning(warning),
            Err(e) => CheckResult::fail(description, e),
        }
    }

    /// `Ok(Some(msg))` when the fixture was rewritten.
    fn compare(&self, kind: FixtureKind, tree: &Value) -> Result<Option<String>, HarnessError> {
        let detail = match self.store.read(self.version, self.name, kind) {
            Ok(Some(stored)) if &stored == tree => return Ok(None),
            Ok(Some(stored)) => describe_diff(&stored, tree),
            Ok(None) => "no stored fixture".to_string(),
            Err(e @ StoreError::Parse { .. }) => format!("stored fixture is unreadable: {e}"),
            Err(e) => return Err(e.into()),
        };

        let mismatch = HarnessError::FixtureMismatch {
            version: self.version,
            name: self.name.to_string(),
            kind,
            detail,
        };
        match self.mode {
            StrictMode::Enforce => Err(mismatch),
            StrictMode::Reconcile => {
                self.store.write(self.version, self.name, kind, tree)?;
                let msg = format!("{mismatch}; fixture rewritten");
                output::warn(&msg, self.verbosity);
                Ok(Some(msg))
            }
        }
    }
}

fn describe_diff(expected: &Value, actual: &Value) -> String {
    let mut paths = Vec::new();
    let total = diff_paths(expected, actual, String::new(), &mut paths);
    let listed = paths.join(", ");
    if total > paths.len() {
        format!("{total} differing path(s): {listed}, ...")
    } else {
        format!("{total} differing path(s): {listed}")
    }
}

/// Collect JSON pointers where the trees differ; returns the total count.
pub fn diff_paths(expected: &Value, actual: &Value, at: String, out: &mut Vec<String>) -> usize {
    match (expected, actual) {
        (Value::Object(a), Value::Object(b)) => {
            let mut keys: Vec<&String> = a.keys().chain(b.keys()).collect();
            keys.sort();
            keys.dedup();
            keys.into_iter()
                .map(|k| {
                    let path = format!("{at}/{}", escape_pointer(k));
                    match (a.get(k), b.get(k)) {
                        (Some(x), Some(y)) => diff_paths(x, y, path, out),
                        _ => record(path, out),
                    }
                })
                .sum()
        }
        (Value::Array(a), Value::Array(b)) => {
            let common: usize = a
                .iter()
                .zip(b)
                .enumerate()
                .map(|(i, (x, y))| diff_paths(x, y, format!("{at}/{i}"), out))
                .sum();
            let extra = a.len().abs_diff(b.len());
            for i in a.len().min(b.len())..a.len().max(b.len()) {
                record(format!("{at}/{i}"), out);
            }
            common + extra
        }
        (x, y) if x == y => 0,
        _ => record(at, out),
    }
}

fn record(path: String, out: &mut Vec<String>) -> usize {
    if out.len() < DIFF_LIMIT {
        out.push(if path.is_empty() { "/".to_string() } else { path });
    }
    1
}

fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod strict_mode {
        use super::*;

        #[test]
        fn ci_values() {
            for (value, expected) in [
                (None, StrictMode::Reconcile),
                (Some(""), StrictMode::Reconcile),
                (Some("0"), StrictMode::Reconcile),
                (Some("false"), StrictMode::Reconcile),
                (Some("FALSE"), StrictMode::Reconcile),
                (Some("1"), StrictMode::Enforce),
                (Some("true"), StrictMode::Enforce),
                (Some("github-actions"), StrictMode::Enforce),
            ] {
                assert_eq!(StrictMode::from_ci_value(value), expected, "{value:?}");
            }
        }

        #[test]
        fn environment_enforce_beats_config() {
            use StrictMode::{Enforce, Reconcile};
            for (flag, configured, env, expected) in [
                (None, None, Reconcile, Reconcile),
                (None, None, Enforce, Enforce),
                (None, Some(Reconcile), Enforce, Enforce),
                (None, Some(Enforce), Reconcile, Enforce),
                (None, Some(Reconcile), Reconcile, Reconcile),
                (Some(Reconcile), Some(Enforce), Enforce, Reconcile),
                (Some(Enforce), None, Reconcile, Enforce),
            ] {
                assert_eq!(
                    StrictMode::resolve(flag, configured, env),
                    expected,
                    "{flag:?} {configured:?} {env:?}"
                );
            }
        }

        #[test]
        fn parse_names() {
            assert_eq!("enforce".parse::<StrictMode>(), Ok(StrictMode::Enforce));
            assert_eq!(" Reconcile ".parse::<StrictMode>(), Ok(StrictMode::Reconcile));
            assert!("strict".parse::<StrictMode>().is_err());
            assert_eq!(StrictMode::Enforce.to_string(), "enforce");
        }
    }

    mod diff {
        use super::*;

        fn paths(a: &Value, b: &Value) -> (usize, Vec<String>) {
            let mut out = Vec::new();
            let n = diff_paths(a, b, String::new(), &mut out);
            (n, out)
        }

        #[test]
        fn equal_trees() {
            assert_eq!(paths(&json!({"a": [1, 2]}), &json!({"a": [1, 2]})).0, 0);
        }

        #[test]
        fn nested_scalar_change() {
            let (n, out) = paths(
                &json!({"metadata": {"v9": {"modules": [{"name": "System"}]}}}),
                &json!({"metadata": {"v9": {"modules": [{"name": "Sys"}]}}}),
            );
            assert_eq!(n, 1);
            assert_eq!(out, vec!["/metadata/v9/modules/0/name"]);
        }

        #[test]
        fn missing_keys_and_extra_elements() {
            let (n, out) = paths(&json!({"a": 1, "b": [1]}), &json!({"c": 1, "b": [1, 2, 3]}));
            assert_eq!(n, 4);
            assert_eq!(out, vec!["/a", "/b/1", "/b/2", "/c"]);
        }

        #[test]
        fn root_scalar() {
            assert_eq!(paths(&json!(1), &json!(2)).1, vec!["/"]);
        }

        #[test]
        fn pointer_escaping() {
            let (_, out) = paths(&json!({"a/b": 1}), &json!({"a/b": 2}));
            assert_eq!(out, vec!["/a~1b"]);
        }

        #[test]
        fn listing_is_bounded() {
            let a: Vec<u32> = (0..20).collect();
            let b: Vec<u32> = (100..120).collect();
            let (n, out) = paths(&json!(a), &json!(b));
            assert_eq!(n, 20);
            assert_eq!(out.len(), DIFF_LIMIT);
            assert!(describe_diff(&json!(a), &json!(b)).ends_with(", ..."));
        }
    }
}
