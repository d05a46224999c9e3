//! codec::metadata
//!
//! Metadata model for schema versions 9 through 15.
//!
//! # Layout
//!
//! Every blob starts with the 4-byte magic `meta` followed by a one-byte
//! version. The body shape depends on the version:
//!
//! - **v9-v13 (legacy)**: modules describe their types as source-level
//!   names (see [`super::names`]). Module indices appear from v12, the
//!   extrinsic descriptor from v11, and N-key storage maps from v13.
//! - **v14-v15 (portable)**: a unified type lookup, with every type
//!   reference being a lookup id. Pallet docs appear from v15.
//!
//! # Structural Tree
//!
//! [`RuntimeMetadata::to_json`] renders
//! `{ "magicNumber": .., "metadata": { "v<N>": <body> } }`. Portable bodies
//! carry the type table under `lookup`.

use serde::{Serialize, Serializer};

use super::convert::LegacyConverter;
use super::types::{PortableRegistry, TypeId};
use super::wire::{Reader, Writer};
use super::{CodecError, DecodedMetadata};

/// Magic prefix of every metadata blob.
pub const MAGIC: [u8; 4] = *b"meta";

/// Oldest version this codec understands.
pub const MIN_VERSION: u32 = 9;

/// First version with a unified type lookup.
pub const LOOKUP_VERSION: u32 = 14;

/// Newest version; the shape of [`LatestMetadata`].
pub const LATEST_VERSION: u32 = 15;

/// First legacy version with explicit module indices.
const MODULE_INDEX_VERSION: u32 = 12;

/// First legacy version with an extrinsic descriptor.
const EXTRINSIC_VERSION: u32 = 11;

/// First legacy version with N-key storage maps.
const NMAP_VERSION: u32 = 13;

/// First portable version with pallet docs.
const PALLET_DOCS_VERSION: u32 = 15;

#[allow(clippy::ptr_arg)]
fn serialize_hex<S: Serializer>(bytes: &Vec<u8>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("0x{}", hex::encode(bytes)))
}

/// Whether a storage item may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorageModifier {
    Optional,
    Default,
}

impl StorageModifier {
    pub fn is_optional(self) -> bool {
        self == StorageModifier::Optional
    }

    fn encode(self, w: &mut Writer) {
        w.u8(match self {
            StorageModifier::Optional => 0,
            StorageModifier::Default => 1,
        });
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let offset = r.position();
        match r.u8()? {
            0 => Ok(StorageModifier::Optional),
            1 => Ok(StorageModifier::Default),
            tag => Err(CodecError::InvalidTag {
                what: "storage modifier",
                tag,
                offset,
            }),
        }
    }
}

/// Key hashing scheme of a storage map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(non_camel_case_types)]
pub enum StorageHasher {
    Blake2_128,
    Blake2_256,
    Blake2_128Concat,
    Twox128,
    Twox256,
    Twox64Concat,
    Identity,
}

impl StorageHasher {
    const ALL: [StorageHasher; 7] = [
        StorageHasher::Blake2_128,
        StorageHasher::Blake2_256,
        StorageHasher::Blake2_128Concat,
        StorageHasher::Twox128,
        StorageHasher::Twox256,
        StorageHasher::Twox64Concat,
        StorageHasher::Identity,
    ];

    fn encode(self, w: &mut Writer) {
        let tag = Self::ALL.iter().position(|h| *h == self).unwrap_or_default();
        w.u8(tag as u8);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let offset = r.position();
        let tag = r.u8()?;
        Self::ALL
            .get(usize::from(tag))
            .copied()
            .ok_or(CodecError::InvalidTag {
                what: "storage hasher",
                tag,
                offset,
            })
    }
}

// =============================================================================
// Legacy layout (v9-v13)
// =============================================================================

/// Storage type of a legacy item, expressed with type names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LegacyStorageType {
    Plain(String),
    #[serde(rename_all = "camelCase")]
    Map {
        hasher: StorageHasher,
        key: String,
        value: String,
        unused: bool,
    },
    #[serde(rename_all = "camelCase")]
    DoubleMap {
        hasher: StorageHasher,
        key1: String,
        key2: String,
        value: String,
        key2_hasher: StorageHasher,
    },
    NMap {
        keys: Vec<String>,
        hashers: Vec<StorageHasher>,
        value: String,
    },
}

impl LegacyStorageType {
    /// The stored value's type name.
    pub fn value(&self) -> &str {
        match self {
            LegacyStorageType::Plain(v) => v,
            LegacyStorageType::Map { value, .. }
            | LegacyStorageType::DoubleMap { value, .. }
            | LegacyStorageType::NMap { value, .. } => value,
        }
    }

    fn encode(&self, w: &mut Writer) {
        match self {
            LegacyStorageType::Plain(v) => {
                w.u8(0);
                w.str(v);
            }
            LegacyStorageType::Map {
                hasher,
                key,
                value,
                unused,
            } => {
                w.u8(1);
                hasher.encode(w);
                w.str(key);
                w.str(value);
                w.bool(*unused);
            }
            LegacyStorageType::DoubleMap {
                hasher,
                key1,
                key2,
                value,
                key2_hasher,
            } => {
                w.u8(2);
                hasher.encode(w);
                w.str(key1);
                w.str(key2);
                w.str(value);
                key2_hasher.encode(w);
            }
            LegacyStorageType::NMap {
                keys,
                hashers,
                value,
            } => {
                w.u8(3);
                w.strings(keys);
                w.seq(hashers, |w, h| h.encode(w));
                w.str(value);
            }
        }
    }

    fn decode(r: &mut Reader<'_>, version: u32) -> Result<Self, CodecError> {
        let offset = r.position();
        match r.u8()? {
            0 => Ok(LegacyStorageType::Plain(r.str()?)),
            1 => Ok(LegacyStorageType::Map {
                hasher: StorageHasher::decode(r)?,
                key: r.str()?,
                value: r.str()?,
                unused: r.bool()?,
            }),
            2 => Ok(LegacyStorageType::DoubleMap {
                hasher: StorageHasher::decode(r)?,
                key1: r.str()?,
                key2: r.str()?,
                value: r.str()?,
                key2_hasher: StorageHasher::decode(r)?,
            }),
            3 if version >= NMAP_VERSION => Ok(LegacyStorageType::NMap {
                keys: r.strings()?,
                hashers: r.seq(StorageHasher::decode)?,
                value: r.str()?,
            }),
            tag => Err(CodecError::InvalidTag {
                what: "storage entry type",
                tag,
                offset,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyStorageItem {
    pub name: String,
    pub modifier: StorageModifier,
    #[serde(rename = "type")]
    pub ty: LegacyStorageType,
    #[serde(serialize_with = "serialize_hex")]
    pub fallback: Vec<u8>,
    pub docs: Vec<String>,
}

impl LegacyStorageItem {
    fn encode(&self, w: &mut Writer) {
        w.str(&self.name);
        self.modifier.encode(w);
        self.ty.encode(w);
        w.bytes(&self.fallback);
        w.strings(&self.docs);
    }

    fn decode(r: &mut Reader<'_>, version: u32) -> Result<Self, CodecError> {
        Ok(Self {
            name: r.str()?,
            modifier: StorageModifier::decode(r)?,
            ty: LegacyStorageType::decode(r, version)?,
            fallback: r.bytes()?,
            docs: r.strings()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyStorage {
    pub prefix: String,
    pub items: Vec<LegacyStorageItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyArg {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyCall {
    pub name: String,
    pub args: Vec<LegacyArg>,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyEvent {
    pub name: String,
    pub args: Vec<String>,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyConstant {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(serialize_with = "serialize_hex")]
    pub value: Vec<u8>,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyError {
    pub name: String,
    pub docs: Vec<String>,
}

/// A legacy module. `index` is present from v12.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyModule {
    pub name: String,
    pub storage: Option<LegacyStorage>,
    pub calls: Option<Vec<LegacyCall>>,
    pub events: Option<Vec<LegacyEvent>>,
    pub constants: Vec<LegacyConstant>,
    pub errors: Vec<LegacyError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u8>,
}

impl LegacyModule {
    fn encode(&self, w: &mut Writer, version: u32) {
        w.str(&self.name);
        w.option(self.storage.as_ref(), |w, s| {
            w.str(&s.prefix);
            w.seq(&s.items, |w, item| item.encode(w));
        });
        w.option(self.calls.as_ref(), |w, calls| {
            w.seq(calls, |w, c| {
                w.str(&c.name);
                w.seq(&c.args, |w, a| {
                    w.str(&a.name);
                    w.str(&a.ty);
                });
                w.strings(&c.docs);
            });
        });
        w.option(self.events.as_ref(), |w, events| {
            w.seq(events, |w, e| {
                w.str(&e.name);
                w.strings(&e.args);
                w.strings(&e.docs);
            });
        });
        w.seq(&self.constants, |w, c| {
            w.str(&c.name);
            w.str(&c.ty);
            w.bytes(&c.value);
            w.strings(&c.docs);
        });
        w.seq(&self.errors, |w, e| {
            w.str(&e.name);
            w.strings(&e.docs);
        });
        if version >= MODULE_INDEX_VERSION {
            w.u8(self.index.unwrap_or_default());
        }
    }

    fn decode(r: &mut Reader<'_>, version: u32) -> Result<Self, CodecError> {
        let name = r.str()?;
        let storage = r.option(|r| {
            Ok(LegacyStorage {
                prefix: r.str()?,
                items: r.seq(|r| LegacyStorageItem::decode(r, version))?,
            })
        })?;
        let calls = r.option(|r| {
            r.seq(|r| {
                Ok(LegacyCall {
                    name: r.str()?,
                    args: r.seq(|r| {
                        Ok(LegacyArg {
                            name: r.str()?,
                            ty: r.str()?,
                        })
                    })?,
                    docs: r.strings()?,
                })
            })
        })?;
        let events = r.option(|r| {
            r.seq(|r| {
                Ok(LegacyEvent {
                    name: r.str()?,
                    args: r.strings()?,
                    docs: r.strings()?,
                })
            })
        })?;
        let constants = r.seq(|r| {
            Ok(LegacyConstant {
                name: r.str()?,
                ty: r.str()?,
                value: r.bytes()?,
                docs: r.strings()?,
            })
        })?;
        let errors = r.seq(|r| {
            Ok(LegacyError {
                name: r.str()?,
                docs: r.strings()?,
            })
        })?;
        let index = if version >= MODULE_INDEX_VERSION {
            Some(r.u8()?)
        } else {
            None
        };
        Ok(Self {
            name,
            storage,
            calls,
            events,
            constants,
            errors,
            index,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyExtrinsic {
    pub version: u8,
    pub signed_extensions: Vec<String>,
}

/// Body of a v9-v13 blob. `extrinsic` is present from v11.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyMetadata {
    pub modules: Vec<LegacyModule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extrinsic: Option<LegacyExtrinsic>,
}

impl LegacyMetadata {
    fn encode(&self, w: &mut Writer, version: u32) {
        w.seq(&self.modules, |w, m| m.encode(w, version));
        if version >= EXTRINSIC_VERSION {
            let default = LegacyExtrinsic {
                version: 4,
                signed_extensions: Vec::new(),
            };
            let ext = self.extrinsic.as_ref().unwrap_or(&default);
            w.u8(ext.version);
            w.strings(&ext.signed_extensions);
        }
    }

    fn decode(r: &mut Reader<'_>, version: u32) -> Result<Self, CodecError> {
        let modules = r.seq(|r| LegacyModule::decode(r, version))?;
        let extrinsic = if version >= EXTRINSIC_VERSION {
            Some(LegacyExtrinsic {
                version: r.u8()?,
                signed_extensions: r.strings()?,
            })
        } else {
            None
        };
        Ok(Self { modules, extrinsic })
    }

    fn calls_only(&self) -> Self {
        Self {
            modules: self
                .modules
                .iter()
                .map(|m| LegacyModule {
                    name: m.name.clone(),
                    storage: None,
                    calls: m.calls.clone(),
                    events: None,
                    constants: Vec::new(),
                    errors: Vec::new(),
                    index: m.index,
                })
                .collect(),
            extrinsic: self.extrinsic.clone(),
        }
    }
}

// =============================================================================
// Portable layout (v14+)
// =============================================================================

/// Storage type of a portable entry, expressed with lookup ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageEntryType {
    Plain(TypeId),
    Map {
        hashers: Vec<StorageHasher>,
        key: TypeId,
        value: TypeId,
    },
}

impl StorageEntryType {
    /// The stored value's type.
    pub fn value(&self) -> TypeId {
        match self {
            StorageEntryType::Plain(ty) => *ty,
            StorageEntryType::Map { value, .. } => *value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageEntry {
    pub name: String,
    pub modifier: StorageModifier,
    #[serde(rename = "type")]
    pub ty: StorageEntryType,
    #[serde(serialize_with = "serialize_hex")]
    pub fallback: Vec<u8>,
    pub docs: Vec<String>,
}

impl StorageEntry {
    fn encode(&self, w: &mut Writer) {
        w.str(&self.name);
        self.modifier.encode(w);
        match &self.ty {
            StorageEntryType::Plain(ty) => {
                w.u8(0);
                w.compact(u128::from(*ty));
            }
            StorageEntryType::Map { hashers, key, value } => {
                w.u8(1);
                w.seq(hashers, |w, h| h.encode(w));
                w.compact(u128::from(*key));
                w.compact(u128::from(*value));
            }
        }
        w.bytes(&self.fallback);
        w.strings(&self.docs);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let name = r.str()?;
        let modifier = StorageModifier::decode(r)?;
        let offset = r.position();
        let ty = match r.u8()? {
            0 => StorageEntryType::Plain(r.compact_u32()?),
            1 => StorageEntryType::Map {
                hashers: r.seq(StorageHasher::decode)?,
                key: r.compact_u32()?,
                value: r.compact_u32()?,
            },
            tag => {
                return Err(CodecError::InvalidTag {
                    what: "storage entry type",
                    tag,
                    offset,
                })
            }
        };
        Ok(Self {
            name,
            modifier,
            ty,
            fallback: r.bytes()?,
            docs: r.strings()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PalletStorage {
    pub prefix: String,
    pub entries: Vec<StorageEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PalletConstant {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeId,
    #[serde(serialize_with = "serialize_hex")]
    pub value: Vec<u8>,
    pub docs: Vec<String>,
}

/// A pallet in portable metadata. `docs` is only encoded from v15.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pallet {
    pub name: String,
    pub storage: Option<PalletStorage>,
    pub calls: Option<TypeId>,
    pub event: Option<TypeId>,
    pub constants: Vec<PalletConstant>,
    pub error: Option<TypeId>,
    pub index: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
}

impl Pallet {
    fn encode(&self, w: &mut Writer, version: u32) {
        let id = |w: &mut Writer, ty: &TypeId| w.compact(u128::from(*ty));
        w.str(&self.name);
        w.option(self.storage.as_ref(), |w, s| {
            w.str(&s.prefix);
            w.seq(&s.entries, |w, e| e.encode(w));
        });
        w.option(self.calls.as_ref(), id);
        w.option(self.event.as_ref(), id);
        w.seq(&self.constants, |w, c| {
            w.str(&c.name);
            w.compact(u128::from(c.ty));
            w.bytes(&c.value);
            w.strings(&c.docs);
        });
        w.option(self.error.as_ref(), id);
        w.u8(self.index);
        if version >= PALLET_DOCS_VERSION {
            w.strings(&self.docs);
        }
    }

    fn decode(r: &mut Reader<'_>, version: u32) -> Result<Self, CodecError> {
        let name = r.str()?;
        let storage = r.option(|r| {
            Ok(PalletStorage {
                prefix: r.str()?,
                entries: r.seq(StorageEntry::decode)?,
            })
        })?;
        let calls = r.option(|r| r.compact_u32())?;
        let event = r.option(|r| r.compact_u32())?;
        let constants = r.seq(|r| {
            Ok(PalletConstant {
                name: r.str()?,
                ty: r.compact_u32()?,
                value: r.bytes()?,
                docs: r.strings()?,
            })
        })?;
        let error = r.option(|r| r.compact_u32())?;
        let index = r.u8()?;
        let docs = if version >= PALLET_DOCS_VERSION {
            r.strings()?
        } else {
            Vec::new()
        };
        Ok(Self {
            name,
            storage,
            calls,
            event,
            constants,
            error,
            index,
            docs,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedExtension {
    pub identifier: String,
    #[serde(rename = "type")]
    pub ty: TypeId,
    pub additional_signed: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extrinsic {
    #[serde(rename = "type")]
    pub ty: TypeId,
    pub version: u8,
    pub signed_extensions: Vec<SignedExtension>,
}

/// Body of a portable (v14+) blob, and the shape every version converts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestMetadata {
    #[serde(rename = "lookup")]
    pub types: PortableRegistry,
    pub pallets: Vec<Pallet>,
    pub extrinsic: Extrinsic,
    #[serde(rename = "type")]
    pub runtime_ty: TypeId,
}

impl LatestMetadata {
    fn encode(&self, w: &mut Writer, version: u32) {
        self.types.encode(w);
        w.seq(&self.pallets, |w, p| p.encode(w, version));
        w.compact(u128::from(self.extrinsic.ty));
        w.u8(self.extrinsic.version);
        w.seq(&self.extrinsic.signed_extensions, |w, s| {
            w.str(&s.identifier);
            w.compact(u128::from(s.ty));
            w.compact(u128::from(s.additional_signed));
        });
        w.compact(u128::from(self.runtime_ty));
    }

    fn decode(r: &mut Reader<'_>, version: u32) -> Result<Self, CodecError> {
        let types = PortableRegistry::decode(r)?;
        let pallets = r.seq(|r| Pallet::decode(r, version))?;
        let extrinsic = Extrinsic {
            ty: r.compact_u32()?,
            version: r.u8()?,
            signed_extensions: r.seq(|r| {
                Ok(SignedExtension {
                    identifier: r.str()?,
                    ty: r.compact_u32()?,
                    additional_signed: r.compact_u32()?,
                })
            })?,
        };
        Ok(Self {
            types,
            pallets,
            extrinsic,
            runtime_ty: r.compact_u32()?,
        })
    }

    fn calls_only(&self) -> Self {
        Self {
            types: self.types.clone(),
            pallets: self
                .pallets
                .iter()
                .map(|p| Pallet {
                    name: p.name.clone(),
                    storage: None,
                    calls: p.calls,
                    event: None,
                    constants: Vec::new(),
                    error: None,
                    index: p.index,
                    docs: Vec::new(),
                })
                .collect(),
            extrinsic: self.extrinsic.clone(),
            runtime_ty: self.runtime_ty,
        }
    }
}

// =============================================================================
// Versioned envelope
// =============================================================================

/// Version-dependent body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataBody {
    Legacy(LegacyMetadata),
    Portable(LatestMetadata),
}

/// A decoded metadata blob of any supported version.
///
/// # Example
///
/// ```
/// use metaconform::codec::metadata::{LegacyMetadata, MetadataBody, RuntimeMetadata};
/// use metaconform::codec::DecodedMetadata;
///
/// let meta = RuntimeMetadata::new(
///     9,
///     MetadataBody::Legacy(LegacyMetadata { modules: vec![], extrinsic: None }),
/// )
/// .unwrap();
///
/// let bytes = meta.to_bytes();
/// assert_eq!(&bytes[..4], b"meta");
/// assert_eq!(RuntimeMetadata::decode(&bytes).unwrap(), meta);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeMetadata {
    version: u32,
    body: MetadataBody,
}

impl RuntimeMetadata {
    /// Pair a body with a version, checking the two are compatible.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::UnsupportedVersion` if the version is outside
    /// the supported range or does not match the body layout.
    pub fn new(version: u32, body: MetadataBody) -> Result<Self, CodecError> {
        let layout_ok = match &body {
            MetadataBody::Legacy(_) => (MIN_VERSION..LOOKUP_VERSION).contains(&version),
            MetadataBody::Portable(_) => (LOOKUP_VERSION..=LATEST_VERSION).contains(&version),
        };
        if !layout_ok {
            return Err(CodecError::UnsupportedVersion(version));
        }
        Ok(Self { version, body })
    }

    pub fn body(&self) -> &MetadataBody {
        &self.body
    }

    /// Decode a complete blob; trailing input is an error.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(bytes);
        let magic = r.u32()?;
        if magic != u32::from_le_bytes(MAGIC) {
            return Err(CodecError::BadMagic(magic));
        }
        let version = u32::from(r.u8()?);
        let body = if (MIN_VERSION..LOOKUP_VERSION).contains(&version) {
            MetadataBody::Legacy(LegacyMetadata::decode(&mut r, version)?)
        } else if (LOOKUP_VERSION..=LATEST_VERSION).contains(&version) {
            MetadataBody::Portable(LatestMetadata::decode(&mut r, version)?)
        } else {
            return Err(CodecError::UnsupportedVersion(version));
        };
        r.finish()?;
        Ok(Self { version, body })
    }
}

impl DecodedMetadata for RuntimeMetadata {
    fn version(&self) -> u32 {
        self.version
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.raw(&MAGIC);
        w.u8(self.version as u8);
        match &self.body {
            MetadataBody::Legacy(m) => m.encode(&mut w, self.version),
            MetadataBody::Portable(m) => m.encode(&mut w, self.version),
        }
        w.into_bytes()
    }

    fn to_json(&self) -> Result<serde_json::Value, CodecError> {
        let body = match &self.body {
            MetadataBody::Legacy(m) => serde_json::to_value(m),
            MetadataBody::Portable(m) => serde_json::to_value(m),
        }
        .map_err(|e| CodecError::Json(e.to_string()))?;

        let mut versioned = serde_json::Map::new();
        versioned.insert(format!("v{}", self.version), body);

        let mut root = serde_json::Map::new();
        root.insert(
            "magicNumber".to_string(),
            serde_json::Value::from(u32::from_le_bytes(MAGIC)),
        );
        root.insert("metadata".to_string(), serde_json::Value::Object(versioned));
        Ok(serde_json::Value::Object(root))
    }

    fn as_calls_only(&self) -> Self {
        let body = match &self.body {
            MetadataBody::Legacy(m) => MetadataBody::Legacy(m.calls_only()),
            MetadataBody::Portable(m) => MetadataBody::Portable(m.calls_only()),
        };
        Self {
            version: self.version,
            body,
        }
    }

    fn as_latest(&self) -> Result<LatestMetadata, CodecError> {
        match &self.body {
            MetadataBody::Legacy(m) => LegacyConverter::new().convert(m),
            MetadataBody::Portable(m) => Ok(m.clone()),
        }
    }
}
