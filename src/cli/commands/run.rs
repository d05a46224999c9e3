//! run command - Run the fixtures of a suite manifest

use std::path::Path;

use anyhow::{anyhow, bail, Context as _, Result};

use super::{load_config, resolve};
use crate::cli::Context;
use crate::codec::ReferenceCodec;
use crate::fixtures::{FsFixtureStore, Manifest};
use crate::harness::{HarnessOptions, StrictMode, Suite};
use crate::ui::output;

/// Run a suite manifest against the configured fixture root.
///
/// The mode comes from `--mode` if given. Otherwise a set `CI` variable
/// forces enforce mode, and config only applies outside CI.
pub fn run(
    ctx: &Context,
    manifest: Option<&Path>,
    version: Option<u32>,
    fixture: Option<String>,
    mode: Option<StrictMode>,
    json: bool,
) -> Result<()> {
    let config = load_config(ctx)?;

    let manifest_path = match manifest {
        Some(path) => resolve(ctx, path)?,
        None => config.manifest().ok_or_else(|| {
            anyhow!("No manifest given. Pass --manifest or set 'manifest' in metaconform.toml.")
        })?,
    };
    let manifest = Manifest::load(&manifest_path)
        .with_context(|| format!("Failed to load manifest '{}'", manifest_path.display()))?;

    let mode = StrictMode::resolve(mode, config.mode(), StrictMode::from_env());
    let options = HarnessOptions {
        mode,
        strict_defaults: config.strict_defaults(),
        verify_round_trip: config.verify_round_trip(),
        strict_uniqueness: config.strict_uniqueness(),
        verbosity: ctx.verbosity,
    };
    let store = FsFixtureStore::new(config.fixture_root());
    output::debug(
        format!(
            "mode {mode}, fixtures at {}",
            store.paths().root().display()
        ),
        ctx.verbosity,
    );

    let report = Suite::new(manifest, options)
        .version(version)
        .fixture(fixture)
        .run(&ReferenceCodec, &store);

    if json {
        println!("{}", report.to_json().context("Failed to serialize report")?);
    } else {
        output::print(report.format(), ctx.verbosity);
    }

    if report.fixtures.is_empty() && report.skipped.is_empty() {
        output::warn("no fixtures matched", ctx.verbosity);
    }
    if !report.passed() {
        bail!(
            "{} check(s) failed, {} fixture(s) skipped",
            report.failure_count(),
            report.skipped.len()
        );
    }
    Ok(())
}
