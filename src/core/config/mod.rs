//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! metaconform has two configuration scopes:
//! - **Global**: User-level defaults
//! - **Project**: Per-project fixture layout and overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file (or `--config`)
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$METACONFORM_CONFIG` if set
//! 2. `<dirs::config_dir()>/metaconform/config.toml`
//!
//! # Project Config Locations
//!
//! An explicit path if given, otherwise `metaconform.toml` in the project
//! directory. Relative paths inside a project config resolve against the
//! directory containing it.
//!
//! # Example
//!
//! ```no_run
//! use metaconform::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new(".")), None).unwrap();
//! let config = result.config;
//!
//! println!("Fixtures: {}", config.fixture_root().display());
//! println!("Round-trip defaults: {}", config.verify_round_trip());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, ProjectConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::harness::StrictMode;

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "metaconform.toml";

/// Default fixture directory, relative to the project.
pub const DEFAULT_FIXTURE_ROOT: &str = "fixtures";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: Config,
    /// Files that were read, in precedence order.
    pub sources: Vec<PathBuf>,
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub global: GlobalConfig,
    pub project: Option<ProjectConfig>,
    /// Directory relative project paths resolve against.
    base_dir: PathBuf,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// An `explicit` path must exist; the default project file is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// holds invalid values.
    pub fn load(
        project_dir: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let global_path = Self::global_config_path();
        Self::load_from(global_path.as_deref(), project_dir, explicit)
    }

    /// Load with an explicit global config path instead of the environment.
    pub fn load_from(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut sources = Vec::new();

        let global = match global_path {
            Some(path) if path.exists() => {
                sources.push(path.to_path_buf());
                read_toml::<GlobalConfig>(path)?
            }
            _ => GlobalConfig::default(),
        };

        let project_path = match explicit {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => project_dir
                .map(|dir| dir.join(PROJECT_CONFIG_FILE))
                .filter(|p| p.exists()),
        };

        let project = match &project_path {
            Some(path) => {
                sources.push(path.clone());
                Some(read_toml::<ProjectConfig>(path)?)
            }
            None => None,
        };

        global.validate()?;
        if let Some(p) = &project {
            p.validate()?;
        }

        let base_dir = project_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .or_else(|| project_dir.map(Path::to_path_buf))
            .unwrap_or_default();

        Ok(ConfigLoadResult {
            config: Config {
                global,
                project,
                base_dir,
            },
            sources,
        })
    }

    /// Global config location after applying `$METACONFORM_CONFIG`.
    pub fn global_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("METACONFORM_CONFIG") {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::config_dir().map(|dir| dir.join("metaconform/config.toml"))
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Fixture root directory.
    ///
    /// Defaults to `fixtures` under the project directory.
    pub fn fixture_root(&self) -> PathBuf {
        let root = self
            .project
            .as_ref()
            .and_then(|p| p.fixture_root.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FIXTURE_ROOT));
        self.resolve(root)
    }

    /// Suite manifest path, if configured.
    pub fn manifest(&self) -> Option<PathBuf> {
        self.project
            .as_ref()
            .and_then(|p| p.manifest.clone())
            .map(|m| self.resolve(m))
    }

    /// Configured strict mode, if any. Ignored when `CI` is set.
    pub fn mode(&self) -> Option<StrictMode> {
        self.project
            .as_ref()
            .and_then(|p| p.mode.as_deref())
            .or(self.global.mode.as_deref())
            .and_then(|m| m.parse().ok())
    }

    /// Defaults to `true` if not configured.
    pub fn verify_round_trip(&self) -> bool {
        self.project
            .as_ref()
            .and_then(|p| p.verify_round_trip)
            .or(self.global.verify_round_trip)
            .unwrap_or(true)
    }

    /// Defaults to `true` if not configured.
    pub fn strict_defaults(&self) -> bool {
        self.project
            .as_ref()
            .and_then(|p| p.strict_defaults)
            .or(self.global.strict_defaults)
            .unwrap_or(true)
    }

    /// Defaults to `true` if not configured.
    pub fn strict_uniqueness(&self) -> bool {
        self.project
            .as_ref()
            .and_then(|p| p.strict_uniqueness)
            .or(self.global.strict_uniqueness)
            .unwrap_or(true)
    }

    fn resolve(&self, path: PathBuf) -> PathBuf {
        if path.is_absolute() {
            path
        } else {
            self.base_dir.join(path)
        }
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
