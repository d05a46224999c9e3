//! inspect command - Summarize a hex-encoded metadata blob

use std::path::Path;

use anyhow::{anyhow, Context as _, Result};

use super::read_hex_file;
use crate::cli::Context;
use crate::codec::{DecodedMetadata, ReferenceCodec, Registry};
use crate::ui::output;

/// Decode a blob and print its version, module and storage item counts.
pub fn inspect(ctx: &Context, file: &Path) -> Result<()> {
    let check = read_hex_file(ctx, file)?;
    let mut registry = Registry::new(ReferenceCodec);
    let metadata = registry.decode(check.data()).context("Failed to decode metadata")?;
    registry
        .set_active_schema(&metadata)
        .context("Failed to convert metadata to latest")?;
    let latest = registry
        .latest()
        .ok_or_else(|| anyhow!("No active schema after binding"))?;

    let storage_items: usize = latest
        .pallets
        .iter()
        .filter_map(|p| p.storage.as_ref())
        .map(|s| s.entries.len())
        .sum();

    output::print(format!("version:       v{}", metadata.version()), ctx.verbosity);
    output::print(format!("fingerprint:   {}", check.fingerprint()), ctx.verbosity);
    output::print(format!("bytes:         {}", check.data().len()), ctx.verbosity);
    output::print(format!("modules:       {}", latest.pallets.len()), ctx.verbosity);
    output::print(format!("storage items: {storage_items}"), ctx.verbosity);
    output::print(format!("types:         {}", latest.types.types.len()), ctx.verbosity);
    Ok(())
}
