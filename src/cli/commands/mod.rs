//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves paths against `--cwd` and loads configuration
//! 2. Calls the harness or codec
//! 3. Formats and displays output
//!
//! Handlers never write fixtures directly; only the golden reconciler does.

mod completion;
mod inspect;
mod locations;
mod run;

pub use completion::completion;
pub use inspect::inspect;
pub use locations::locations;
pub use run::run;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::args::Command;
use super::Context;
use crate::core::check::Check;
use crate::core::config::Config;
use crate::ui::output;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Run {
            manifest,
            schema_version,
            fixture,
            mode,
            json,
        } => run::run(
            ctx,
            manifest.as_deref(),
            schema_version,
            fixture,
            mode.map(Into::into),
            json,
        ),
        Command::Inspect { file } => inspect::inspect(ctx, &file),
        Command::Locations { file } => locations::locations(ctx, &file),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Working directory: `--cwd` if given, else the process directory.
fn working_dir(ctx: &Context) -> Result<PathBuf> {
    match &ctx.cwd {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}

/// Resolve a user-supplied path against the working directory.
fn resolve(ctx: &Context, path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(working_dir(ctx)?.join(path))
    }
}

fn load_config(ctx: &Context) -> Result<Config> {
    let cwd = working_dir(ctx)?;
    let explicit = ctx.config.as_deref().map(|p| resolve(ctx, p)).transpose()?;
    let result = Config::load(Some(&cwd), explicit.as_deref()).context("Failed to load config")?;
    for source in &result.sources {
        output::debug(format!("config: {}", source.display()), ctx.verbosity);
    }
    Ok(result.config)
}

/// Read a hex-encoded metadata file into a check with no exemptions.
fn read_hex_file(ctx: &Context, path: &Path) -> Result<Check> {
    let path = resolve(ctx, path)?;
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    Check::from_hex(&contents).with_context(|| format!("Invalid hex in '{}'", path.display()))
}
