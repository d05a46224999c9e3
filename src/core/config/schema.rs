//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$METACONFORM_CONFIG` if set
//! 2. `<config dir>/metaconform/config.toml`
//!
//! # Project Config
//!
//! `metaconform.toml` in the project directory, or the file named by
//! `--config`. Project values override global ones.
//!
//! # Validation
//!
//! Config values are validated after parsing (e.g., `mode` must name a
//! known strict mode, paths cannot be empty).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::harness::StrictMode;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// mode = "reconcile"
/// verify_round_trip = true
/// strict_defaults = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Fixture mismatch policy outside CI: "enforce" or "reconcile"
    pub mode: Option<String>,

    /// Re-encode storage defaults and compare bytes
    pub verify_round_trip: Option<bool>,

    /// Treat non-exempt default failures as fatal
    pub strict_defaults: Option<bool>,

    /// Treat legacy type collisions as fatal
    pub strict_uniqueness: Option<bool>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_mode(self.mode.as_deref())
    }
}

/// Project configuration.
///
/// # Example
///
/// ```toml
/// fixture_root = "fixtures"
/// manifest = "fixtures/suite.toml"
/// strict_uniqueness = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Directory holding golden fixtures
    pub fixture_root: Option<PathBuf>,

    /// Suite manifest path
    pub manifest: Option<PathBuf>,

    pub mode: Option<String>,
    pub verify_round_trip: Option<bool>,
    pub strict_defaults: Option<bool>,
    pub strict_uniqueness: Option<bool>,
}

impl ProjectConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_mode(self.mode.as_deref())?;

        if let Some(root) = &self.fixture_root {
            if root.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "fixture_root cannot be empty".to_string(),
                ));
            }
        }
        if let Some(manifest) = &self.manifest {
            if manifest.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "manifest cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn validate_mode(mode: Option<&str>) -> Result<(), ConfigError> {
    if let Some(mode) = mode {
        mode.parse::<StrictMode>()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod global_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = GlobalConfig::default();
            assert!(config.mode.is_none());
            assert!(config.verify_round_trip.is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn valid_modes() {
            for mode in ["enforce", "reconcile"] {
                let config = GlobalConfig {
                    mode: Some(mode.to_string()),
                    ..Default::default()
                };
                assert!(config.validate().is_ok(), "{mode}");
            }
        }

        #[test]
        fn invalid_mode() {
            let config = GlobalConfig {
                mode: Some("lenient".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn roundtrip() {
            let config = GlobalConfig {
                mode: Some("enforce".to_string()),
                verify_round_trip: Some(false),
                strict_defaults: Some(true),
                strict_uniqueness: Some(false),
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: GlobalConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }
    }

    mod project_config {
        use super::*;

        #[test]
        fn empty_fixture_root_rejected() {
            let config = ProjectConfig {
                fixture_root: Some(PathBuf::new()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn roundtrip() {
            let config = ProjectConfig {
                fixture_root: Some(PathBuf::from("fixtures")),
                manifest: Some(PathBuf::from("fixtures/suite.toml")),
                mode: Some("reconcile".to_string()),
                ..Default::default()
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: ProjectConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }

        #[test]
        fn reject_unknown_fields() {
            let toml = r#"
                fixture_root = "fixtures"
                unknown_field = true
            "#;

            let result: Result<ProjectConfig, _> = toml::from_str(toml);
            assert!(result.is_err());
        }
    }
}
