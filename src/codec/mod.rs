//! codec
//!
//! Reference codec for the versioned metadata format.
//!
//! # Modules
//!
//! - [`wire`] - Byte reader/writer (fixed ints, compact ints, prefixes)
//! - [`types`] - Portable type lookup (v14+)
//! - [`metadata`] - Metadata model, versions 9 through 15
//! - [`names`] - Legacy type-name parser (v9-v13 storage types)
//! - [`convert`] - Legacy to latest conversion
//! - [`value`] - Schema context and storage value decoding
//! - [`registry`] - Per-run registry holding the active schema
//!
//! # Boundary
//!
//! The harness only talks to the codec through [`MetadataCodec`],
//! [`DecodedMetadata`], [`registry::Registry`] and [`value::SchemaContext`].
//! Anything else here is an implementation detail of the reference format.

pub mod convert;
pub mod metadata;
pub mod names;
pub mod registry;
pub mod types;
pub mod value;
pub mod wire;

pub use metadata::{LatestMetadata, RuntimeMetadata, LATEST_VERSION, LOOKUP_VERSION, MAGIC};
pub use registry::Registry;
pub use types::{PortableRegistry, PortableType, TypeDef, TypeId};
pub use value::{DecodeOptions, DecodeStrategy, EncodeMode, Instance, SchemaContext, Value};

use thiserror::Error;

/// Errors raised by the codec.
///
/// Every variant is a structural failure: the bytes do not conform to the
/// declared or resolved type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of input at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("invalid {what} tag 0x{tag:02x} at offset {offset}")]
    InvalidTag {
        what: &'static str,
        tag: u8,
        offset: usize,
    },

    #[error("{what} overflows at offset {offset}")]
    Overflow { what: &'static str, offset: usize },

    #[error("invalid utf-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("{0} trailing bytes after decode")]
    TrailingBytes(usize),

    #[error("bad magic number 0x{0:08x}")]
    BadMagic(u32),

    #[error("unsupported metadata version {0}")]
    UnsupportedVersion(u32),

    #[error("type {0} not found in lookup")]
    TypeNotFound(TypeId),

    #[error("cannot parse type name '{name}': {reason}")]
    TypeName { name: String, reason: String },

    #[error("recursion limit reached while decoding type {0}")]
    RecursionLimit(TypeId),

    #[error("conversion failed: {0}")]
    Conversion(String),

    #[error("json projection failed: {0}")]
    Json(String),
}

/// A decoded metadata object.
///
/// Implementations are immutable once decoded; projections return new
/// values rather than mutating in place.
pub trait DecodedMetadata: Sized {
    /// Schema version declared in the encoded header.
    fn version(&self) -> u32;

    /// Re-encode to the wire format.
    fn to_bytes(&self) -> Vec<u8>;

    /// Canonical structural tree, rooted at `{ magicNumber, metadata: { v<N>: ... } }`.
    fn to_json(&self) -> Result<serde_json::Value, CodecError>;

    /// Reduced view keeping only what is needed to build and decode calls.
    fn as_calls_only(&self) -> Self;

    /// Materialize the latest-version projection.
    fn as_latest(&self) -> Result<LatestMetadata, CodecError>;
}

/// Decoder entry point for raw metadata bytes.
pub trait MetadataCodec {
    type Metadata: DecodedMetadata;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Metadata, CodecError>;
}

/// The reference codec implemented by this module tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceCodec;

impl MetadataCodec for ReferenceCodec {
    type Metadata = RuntimeMetadata;

    fn decode(&self, bytes: &[u8]) -> Result<RuntimeMetadata, CodecError> {
        RuntimeMetadata::decode(bytes)
    }
}
