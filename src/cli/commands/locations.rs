//! locations command - List the storage locations of a metadata blob
//!
//! The printed strings are exactly what exemption substrings match against.

use std::path::Path;

use anyhow::{anyhow, Context as _, Result};

use super::read_hex_file;
use crate::cli::Context;
use crate::codec::{ReferenceCodec, Registry};
use crate::harness::defaults::location_of;

/// Print one location per storage item, in declaration order.
pub fn locations(ctx: &Context, file: &Path) -> Result<()> {
    let check = read_hex_file(ctx, file)?;
    let mut registry = Registry::new(ReferenceCodec);
    let metadata = registry.decode(check.data()).context("Failed to decode metadata")?;
    registry
        .set_active_schema(&metadata)
        .context("Failed to convert metadata to latest")?;
    let (Some(latest), Some(schema)) = (registry.latest(), registry.schema()) else {
        return Err(anyhow!("No active schema after binding"));
    };

    for pallet in &latest.pallets {
        let Some(storage) = &pallet.storage else { continue };
        for entry in &storage.entries {
            println!("{}", location_of(&schema, &pallet.name, entry));
        }
    }
    Ok(())
}
