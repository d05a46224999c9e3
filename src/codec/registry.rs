//! codec::registry
//!
//! Per-run registry holding the active schema.
//!
//! Decoding a storage value needs the type lookup of the metadata it came
//! from. Instead of a process-wide binding, each fixture run owns one
//! [`Registry`]; binding a schema replaces the previous one, and decode calls
//! borrow it as a [`SchemaContext`].
//!
//! # Example
//!
//! ```
//! use metaconform::codec::metadata::{LegacyMetadata, MetadataBody, RuntimeMetadata};
//! use metaconform::codec::{DecodedMetadata, ReferenceCodec, Registry};
//!
//! let bytes = RuntimeMetadata::new(
//!     9,
//!     MetadataBody::Legacy(LegacyMetadata { modules: vec![], extrinsic: None }),
//! )
//! .unwrap()
//! .to_bytes();
//!
//! let mut registry = Registry::new(ReferenceCodec);
//! assert!(registry.schema().is_none());
//!
//! let meta = registry.decode(&bytes).unwrap();
//! registry.set_active_schema(&meta).unwrap();
//! assert_eq!(registry.active_version(), Some(9));
//! assert!(registry.schema().is_some());
//! ```

use super::metadata::LatestMetadata;
use super::value::SchemaContext;
use super::{CodecError, DecodedMetadata, MetadataCodec, ReferenceCodec};

/// Active schema binding.
#[derive(Debug, Clone)]
struct ActiveSchema {
    version: u32,
    latest: LatestMetadata,
}

/// Schema-aware registry scoped to one fixture run.
#[derive(Debug, Clone, Default)]
pub struct Registry<C = ReferenceCodec> {
    codec: C,
    active: Option<ActiveSchema>,
}

impl<C: MetadataCodec> Registry<C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            active: None,
        }
    }

    /// Decode raw metadata with this registry's codec.
    pub fn decode(&self, bytes: &[u8]) -> Result<C::Metadata, CodecError> {
        self.codec.decode(bytes)
    }

    /// Bind `metadata` as the active schema.
    ///
    /// The latest projection is materialized once here. A failed bind leaves
    /// the registry without an active schema rather than keeping a stale one.
    ///
    /// # Errors
    ///
    /// Returns the conversion error if the latest projection fails.
    pub fn set_active_schema(&mut self, metadata: &C::Metadata) -> Result<(), CodecError> {
        self.active = None;
        let latest = metadata.as_latest()?;
        self.active = Some(ActiveSchema {
            version: metadata.version(),
            latest,
        });
        Ok(())
    }

    /// Version of the bound schema, if any.
    pub fn active_version(&self) -> Option<u32> {
        self.active.as_ref().map(|a| a.version)
    }

    /// Latest projection of the bound schema, if any.
    pub fn latest(&self) -> Option<&LatestMetadata> {
        self.active.as_ref().map(|a| &a.latest)
    }

    /// Borrow the bound schema for value decoding.
    pub fn schema(&self) -> Option<SchemaContext<'_>> {
        self.latest().map(|latest| SchemaContext::new(&latest.types))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::metadata::{LegacyMetadata, MetadataBody, RuntimeMetadata};

    fn blob(version: u32) -> Vec<u8> {
        RuntimeMetadata::new(
            version,
            MetadataBody::Legacy(LegacyMetadata {
                modules: vec![],
                extrinsic: None,
            }),
        )
        .unwrap()
        .to_bytes()
    }

    #[test]
    fn fresh_registry_has_no_schema() {
        let registry = Registry::new(ReferenceCodec);
        assert!(registry.schema().is_none());
        assert_eq!(registry.active_version(), None);
    }

    #[test]
    fn binding_overwrites_previous() {
        let mut registry = Registry::new(ReferenceCodec);
        let v9 = registry.decode(&blob(9)).unwrap();
        let v12 = registry.decode(&blob(12)).unwrap();

        registry.set_active_schema(&v9).unwrap();
        assert_eq!(registry.active_version(), Some(9));
        registry.set_active_schema(&v12).unwrap();
        assert_eq!(registry.active_version(), Some(12));
    }

    #[test]
    fn bad_bytes_do_not_bind() {
        let registry = Registry::new(ReferenceCodec);
        assert!(registry.decode(b"nope").is_err());
        assert!(registry.schema().is_none());
    }
}
