//! fixtures::manifest
//!
//! Suite manifest: the list of fixtures a run exercises.
//!
//! # Format
//!
//! ```toml
//! [[fixture]]
//! name = "relevant-chain"
//! version = 9
//! data_file = "data/relevant-chain-v9.hex"
//! fails = ["balances."]
//! exempt = [{ module = "Staking", item = "ErasStakers" }]
//!
//! [[fixture]]
//! name = "tiny"
//! version = 14
//! data = "0x6d657461..."
//! strict_uniqueness = false
//! ```
//!
//! `data_file` is resolved against the manifest's directory and holds hex
//! text. Exactly one of `data` and `data_file` is required. `fails` are
//! legacy substring patterns; `exempt` entries are structured keys.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::check::Check;
use crate::core::exemption::Exemption;
use crate::core::types::{parse_hex, FixtureName, TypeError};

/// Errors from loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse manifest '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("fixture '{name}': {message}")]
    Invalid { name: String, message: String },

    #[error("fixture '{name}': {source}")]
    Data { name: String, source: TypeError },

    #[error("duplicate fixture '{name}' for version {version}")]
    Duplicate { name: String, version: u32 },
}

/// Structured exemption entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExemptKey {
    pub module: String,
    pub item: String,
}

/// One `[[fixture]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureSpec {
    pub name: FixtureName,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    #[serde(default)]
    pub fails: Vec<String>,
    #[serde(default)]
    pub exempt: Vec<ExemptKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_defaults: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_round_trip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_uniqueness: Option<bool>,
}

impl FixtureSpec {
    /// Exemptions in declaration order: structured keys, then substrings.
    pub fn exemptions(&self) -> Vec<Exemption> {
        self.exempt
            .iter()
            .map(|k| Exemption::item(&k.module, &k.item))
            .chain(self.fails.iter().map(Exemption::substring))
            .collect()
    }

    /// Load the payload and build the check.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError` if the data file is unreadable or not hex.
    pub fn to_check(&self, base_dir: &Path) -> Result<Check, ManifestError> {
        let hex = match (&self.data, &self.data_file) {
            (Some(data), None) => data.clone(),
            (None, Some(file)) => {
                let path = base_dir.join(file);
                fs::read_to_string(&path).map_err(|e| ManifestError::Read { path, source: e })?
            }
            _ => {
                return Err(ManifestError::Invalid {
                    name: self.name.to_string(),
                    message: "exactly one of 'data' and 'data_file' is required".into(),
                })
            }
        };
        let bytes = parse_hex(&hex).map_err(|e| ManifestError::Data {
            name: self.name.to_string(),
            source: e,
        })?;
        Ok(Check::new(bytes).with_fails(self.exemptions()))
    }
}

/// A parsed suite manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, rename = "fixture")]
    pub fixtures: Vec<FixtureSpec>,
    /// Directory `data_file` entries resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Manifest {
    /// Read and validate a manifest file.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError` on I/O, parse or validation failures.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = fs::read_to_string(path).map_err(|e| ManifestError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut manifest = Self::parse(&contents).map_err(|e| match e {
            ManifestError::Parse { message, .. } => ManifestError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        manifest.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(manifest)
    }

    /// Parse manifest text; `data_file` entries resolve against the cwd.
    pub fn parse(contents: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = toml::from_str(contents).map_err(|e| ManifestError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = std::collections::HashSet::new();
        for spec in &self.fixtures {
            if !seen.insert((spec.version, spec.name.clone())) {
                return Err(ManifestError::Duplicate {
                    name: spec.name.to_string(),
                    version: spec.version,
                });
            }
            if spec.data.is_some() == spec.data_file.is_some() {
                return Err(ManifestError::Invalid {
                    name: spec.name.to_string(),
                    message: "exactly one of 'data' and 'data_file' is required".into(),
                });
            }
        }
        Ok(())
    }

    /// Fixtures matching the optional filters, in declaration order.
    pub fn select<'a>(
        &'a self,
        version: Option<u32>,
        name: Option<&'a str>,
    ) -> impl Iterator<Item = &'a FixtureSpec> + 'a {
        self.fixtures.iter().filter(move |spec| {
            version.map_or(true, |v| spec.version == v)
                && name.map_or(true, |n| spec.name.as_str() == n)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
        [[fixture]]
        name = "relevant-chain"
        version = 9
        data = "0x6d657461"
        fails = ["balances."]
        exempt = [{ module = "Staking", item = "ErasStakers" }]

        [[fixture]]
        name = "tiny"
        version = 14
        data_file = "tiny.hex"
        strict_uniqueness = false
    "#;

    #[test]
    fn parses_fixtures() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.fixtures.len(), 2);
        assert_eq!(manifest.fixtures[1].strict_uniqueness, Some(false));
        assert_eq!(
            manifest.fixtures[0].exemptions(),
            vec![
                Exemption::item("Staking", "ErasStakers"),
                Exemption::substring("balances.")
            ]
        );
    }

    #[test]
    fn select_filters() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.select(Some(14), None).count(), 1);
        assert_eq!(manifest.select(None, Some("relevant-chain")).count(), 1);
        assert_eq!(manifest.select(Some(9), Some("tiny")).count(), 0);
        assert_eq!(manifest.select(None, None).count(), 2);
    }

    #[test]
    fn data_file_resolves_against_manifest_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("tiny.hex"), "0x6d657461\n").unwrap();
        let path = temp.path().join("suite.toml");
        fs::write(&path, SAMPLE).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        let check = manifest.fixtures[1].to_check(&manifest.base_dir).unwrap();
        assert_eq!(check.data(), b"meta");
    }

    #[test]
    fn both_data_sources_rejected() {
        let result = Manifest::parse(
            r#"
            [[fixture]]
            name = "x"
            version = 9
            data = "0x00"
            data_file = "x.hex"
            "#,
        );
        assert!(matches!(result, Err(ManifestError::Invalid { .. })));
    }

    #[test]
    fn duplicates_rejected() {
        let result = Manifest::parse(
            r#"
            [[fixture]]
            name = "x"
            version = 9
            data = "0x00"

            [[fixture]]
            name = "x"
            version = 9
            data = "0x01"
            "#,
        );
        assert!(matches!(result, Err(ManifestError::Duplicate { .. })));
    }

    #[test]
    fn invalid_name_rejected() {
        let result = Manifest::parse(
            r#"
            [[fixture]]
            name = "../x"
            version = 9
            data = "0x00"
            "#,
        );
        assert!(matches!(result, Err(ManifestError::Parse { .. })));
    }

    #[test]
    fn bad_hex_is_data_error() {
        let manifest = Manifest::parse(
            r#"
            [[fixture]]
            name = "x"
            version = 9
            data = "0xabc"
            "#,
        )
        .unwrap();
        assert!(matches!(
            manifest.fixtures[0].to_check(Path::new(".")),
            Err(ManifestError::Data { .. })
        ));
    }
}
