//! cli
//!
//! Command-line interface layer for metaconform.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Resolve the working directory and verbosity
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers load configuration, then call into
//! [`crate::harness`] and [`crate::codec`]. Exit status is non-zero when a
//! handler returns an error, including any failed check.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::Result;

use crate::ui::output::Verbosity;

/// Resolved global flags shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory for config discovery and relative paths.
    pub cwd: Option<std::path::PathBuf>,
    /// Explicit project config file.
    pub config: Option<std::path::PathBuf>,
    pub verbosity: Verbosity,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = Context {
        cwd: cli.cwd.clone(),
        config: cli.config.clone(),
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
    };

    commands::dispatch(cli.command, &ctx)
}
