//! codec::value
//!
//! Decoding storage values against the active schema.
//!
//! # Model
//!
//! A [`SchemaContext`] borrows the lookup of the latest projection of the
//! active metadata. It resolves a storage entry's declared type into a
//! [`DecodeStrategy`] and decodes raw bytes into an [`Instance`], which can
//! be re-encoded for fidelity checks.
//!
//! # Optional Values
//!
//! Items with the `Optional` modifier are decoded with
//! `DecodeOptions { is_optional: true }`: the bytes carry an option tag in
//! front of the inner value. [`EncodeMode::Full`] reproduces the tag;
//! [`EncodeMode::Bare`] emits only the inner value.

use super::metadata::StorageEntry;
use super::types::{PortableRegistry, Primitive, TypeDef, TypeId};
use super::wire::{Reader, Writer};
use super::CodecError;

/// Nesting limit for recursive type definitions.
const DECODE_DEPTH_LIMIT: usize = 256;

/// Options passed through to a value decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub is_optional: bool,
}

/// Re-encoding mode for an [`Instance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeMode {
    /// Preserve every structural byte, including option tags.
    Full,
    /// Inner value only.
    Bare,
}

/// A resolved decode target for one storage entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeStrategy {
    /// Effective inner type.
    pub ty: TypeId,
    /// Display name of the inner type.
    pub inner_name: String,
    /// Whether the entry is absent-capable.
    pub optional: bool,
}

impl DecodeStrategy {
    /// Display name as declared: `Option<inner>` for optional entries.
    pub fn type_name(&self) -> String {
        if self.optional {
            format!("Option<{}>", self.inner_name)
        } else {
            self.inner_name.clone()
        }
    }
}

/// A decoded value tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Char(char),
    Str(String),
    /// Unsigned integer with its encoded width in bytes.
    UInt { width: usize, value: u128 },
    /// Signed integer with its encoded width in bytes.
    Int { width: usize, value: i128 },
    Compact(u128),
    Composite(Vec<Value>),
    Sequence(Vec<Value>),
    Array(Vec<Value>),
    Tuple(Vec<Value>),
    Variant { index: u8, fields: Vec<Value> },
}

impl Value {
    fn encode(&self, w: &mut Writer) {
        match self {
            Value::Bool(b) => w.bool(*b),
            Value::Char(c) => w.u32(u32::from(*c)),
            Value::Str(s) => w.str(s),
            Value::UInt { width, value } => w.raw(&value.to_le_bytes()[..*width]),
            Value::Int { width, value } => w.raw(&value.to_le_bytes()[..*width]),
            Value::Compact(v) => w.compact(*v),
            Value::Composite(items) | Value::Array(items) | Value::Tuple(items) => {
                for item in items {
                    item.encode(w);
                }
            }
            Value::Sequence(items) => {
                w.len_prefix(items.len());
                for item in items {
                    item.encode(w);
                }
            }
            Value::Variant { index, fields } => {
                w.u8(*index);
                for field in fields {
                    field.encode(w);
                }
            }
        }
    }
}

/// A decoded storage value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// `None` only for an absent optional value.
    pub value: Option<Value>,
    pub optional: bool,
}

impl Instance {
    /// Re-encode the instance.
    pub fn to_bytes(&self, mode: EncodeMode) -> Vec<u8> {
        let mut w = Writer::new();
        match (self.optional, mode) {
            (true, EncodeMode::Full) => {
                w.option(self.value.as_ref(), |w, v| v.encode(w));
            }
            _ => {
                if let Some(v) = &self.value {
                    v.encode(&mut w);
                }
            }
        }
        w.into_bytes()
    }
}

/// Explicit schema context for value decoding.
///
/// Borrowed from a registry's active schema; it never outlives it.
#[derive(Debug, Clone, Copy)]
pub struct SchemaContext<'a> {
    lookup: &'a PortableRegistry,
}

impl<'a> SchemaContext<'a> {
    pub fn new(lookup: &'a PortableRegistry) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> &'a PortableRegistry {
        self.lookup
    }

    /// Resolve the type a storage entry's fallback is decoded with.
    ///
    /// An optional entry whose declared type is itself `Option<T>` is
    /// unwrapped to `T`, so the option tag is not applied twice.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::TypeNotFound` if the declared type is missing.
    pub fn resolve_storage_type(&self, entry: &StorageEntry) -> Result<DecodeStrategy, CodecError> {
        let declared = entry.ty.value();
        let optional = entry.modifier.is_optional();
        let ty = self.lookup.get(declared)?;
        let inner = match ty.option_inner() {
            Some(inner) if optional => inner,
            _ => declared,
        };
        // The unwrapped id must exist too.
        self.lookup.get(inner)?;
        Ok(DecodeStrategy {
            ty: inner,
            inner_name: self.lookup.type_name(inner),
            optional,
        })
    }

    /// Decode `bytes` under a resolved strategy.
    ///
    /// Bytes left over after the value are not an error here; a re-encode
    /// comparison surfaces them as a length difference.
    pub fn decode_value(
        &self,
        strategy: &DecodeStrategy,
        bytes: &[u8],
        options: DecodeOptions,
    ) -> Result<Instance, CodecError> {
        let mut r = Reader::new(bytes);
        let value = if options.is_optional {
            r.option(|r| self.decode_type(r, strategy.ty, 0))?
        } else {
            Some(self.decode_type(&mut r, strategy.ty, 0)?)
        };
        Ok(Instance {
            value,
            optional: options.is_optional,
        })
    }

    fn decode_type(&self, r: &mut Reader<'_>, id: TypeId, depth: usize) -> Result<Value, CodecError> {
        if depth > DECODE_DEPTH_LIMIT {
            return Err(CodecError::RecursionLimit(id));
        }
        let next = depth + 1;
        let ty = self.lookup.get(id)?;
        match &ty.def {
            TypeDef::Primitive(p) => decode_primitive(r, *p),
            TypeDef::Compact { .. } => Ok(Value::Compact(r.compact()?)),
            TypeDef::Composite { fields } => {
                let mut values = Vec::with_capacity(fields.len());
                for field in fields {
                    values.push(self.decode_type(r, field.ty, next)?);
                }
                Ok(Value::Composite(values))
            }
            TypeDef::Tuple(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.decode_type(r, *item, next)?);
                }
                Ok(Value::Tuple(values))
            }
            TypeDef::Array { len, ty } => {
                let len = bounded_len(r, *len as usize, r.position())?;
                let mut values = Vec::with_capacity(len.min(r.remaining()));
                for _ in 0..len {
                    values.push(self.decode_type(r, *ty, next)?);
                }
                Ok(Value::Array(values))
            }
            TypeDef::Sequence { ty } => {
                let offset = r.position();
                let len = usize::try_from(r.compact()?).map_err(|_| CodecError::Overflow {
                    what: "sequence length",
                    offset,
                })?;
                let len = bounded_len(r, len, offset)?;
                let mut values = Vec::with_capacity(len.min(r.remaining()));
                for _ in 0..len {
                    values.push(self.decode_type(r, *ty, next)?);
                }
                Ok(Value::Sequence(values))
            }
            TypeDef::Variant { variants } => {
                let offset = r.position();
                let index = r.u8()?;
                let variant = variants.iter().find(|v| v.index == index).ok_or(
                    CodecError::InvalidTag {
                        what: "variant index",
                        tag: index,
                        offset,
                    },
                )?;
                let mut fields = Vec::with_capacity(variant.fields.len());
                for field in &variant.fields {
                    fields.push(self.decode_type(r, field.ty, next)?);
                }
                Ok(Value::Variant { index, fields })
            }
        }
    }
}

/// Reject element counts the remaining input cannot plausibly hold.
///
/// Elements may be zero-sized, so the bound is loose.
fn bounded_len(r: &Reader<'_>, len: usize, offset: usize) -> Result<usize, CodecError> {
    if len > r.remaining().saturating_mul(8).max(1024) {
        return Err(CodecError::UnexpectedEof {
            offset,
            needed: len,
            remaining: r.remaining(),
        });
    }
    Ok(len)
}

fn decode_primitive(r: &mut Reader<'_>, p: Primitive) -> Result<Value, CodecError> {
    match p {
        Primitive::Bool => Ok(Value::Bool(r.bool()?)),
        Primitive::Char => {
            let offset = r.position();
            let raw = r.u32()?;
            char::from_u32(raw)
                .map(Value::Char)
                .ok_or(CodecError::InvalidUtf8 { offset })
        }
        Primitive::Str => Ok(Value::Str(r.str()?)),
        _ => {
            let width = p.int_width().unwrap_or_default();
            let raw = r.take(width)?;
            let mut buf = [0u8; 16];
            buf[..width].copy_from_slice(raw);
            if p.is_signed() {
                // Sign-extend from the encoded width.
                let shift = 128 - width * 8;
                let value = (i128::from_le_bytes(buf) << shift) >> shift;
                Ok(Value::Int { width, value })
            } else {
                Ok(Value::UInt {
                    width,
                    value: u128::from_le_bytes(buf),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::metadata::{StorageEntryType, StorageModifier};
    use crate::codec::types::{Field, PortableType, TypeParam, Variant};

    /// 0: u32, 1: Vec<u8>, 2: u8, 3: Option<u32>, 4: i16, 5: { a: u32, b: Vec<u8> }
    fn lookup() -> PortableRegistry {
        PortableRegistry {
            types: vec![
                PortableType::anonymous(0, TypeDef::Primitive(Primitive::U32)),
                PortableType::anonymous(1, TypeDef::Sequence { ty: 2 }),
                PortableType::anonymous(2, TypeDef::Primitive(Primitive::U8)),
                PortableType {
                    id: 3,
                    path: vec!["Option".into()],
                    params: vec![TypeParam {
                        name: "T".into(),
                        ty: Some(0),
                    }],
                    def: TypeDef::Variant {
                        variants: vec![
                            Variant {
                                name: "None".into(),
                                fields: vec![],
                                index: 0,
                                docs: vec![],
                            },
                            Variant {
                                name: "Some".into(),
                                fields: vec![Field::unnamed(0)],
                                index: 1,
                                docs: vec![],
                            },
                        ],
                    },
                    docs: vec![],
                },
                PortableType::anonymous(4, TypeDef::Primitive(Primitive::I16)),
                PortableType {
                    id: 5,
                    path: vec!["Pair".into()],
                    params: vec![],
                    def: TypeDef::Composite {
                        fields: vec![
                            Field::named("a", 0, None),
                            Field::named("b", 1, None),
                        ],
                    },
                    docs: vec![],
                },
            ],
        }
    }

    fn entry(modifier: StorageModifier, ty: TypeId, fallback: Vec<u8>) -> StorageEntry {
        StorageEntry {
            name: "Item".into(),
            modifier,
            ty: StorageEntryType::Plain(ty),
            fallback,
            docs: vec![],
        }
    }

    #[test]
    fn plain_value_round_trips() {
        let reg = lookup();
        let ctx = SchemaContext::new(&reg);
        let e = entry(StorageModifier::Default, 5, vec![1, 0, 0, 0, 0x08, 0xaa, 0xbb]);
        let strategy = ctx.resolve_storage_type(&e).unwrap();
        assert_eq!(strategy.type_name(), "Pair");
        let inst = ctx
            .decode_value(&strategy, &e.fallback, DecodeOptions::default())
            .unwrap();
        assert_eq!(inst.to_bytes(EncodeMode::Full), e.fallback);
    }

    #[test]
    fn optional_none_full_and_bare() {
        let reg = lookup();
        let ctx = SchemaContext::new(&reg);
        let e = entry(StorageModifier::Optional, 0, vec![0x00]);
        let strategy = ctx.resolve_storage_type(&e).unwrap();
        assert_eq!(strategy.type_name(), "Option<u32>");
        let inst = ctx
            .decode_value(&strategy, &e.fallback, DecodeOptions { is_optional: true })
            .unwrap();
        assert_eq!(inst.value, None);
        assert_eq!(inst.to_bytes(EncodeMode::Full), vec![0x00]);
        assert!(inst.to_bytes(EncodeMode::Bare).is_empty());
    }

    #[test]
    fn optional_declared_as_option_is_unwrapped() {
        let reg = lookup();
        let ctx = SchemaContext::new(&reg);
        let e = entry(StorageModifier::Optional, 3, vec![0x01, 7, 0, 0, 0]);
        let strategy = ctx.resolve_storage_type(&e).unwrap();
        assert_eq!(strategy.ty, 0);
        assert_eq!(strategy.type_name(), "Option<u32>");
        let inst = ctx
            .decode_value(&strategy, &e.fallback, DecodeOptions { is_optional: true })
            .unwrap();
        assert_eq!(inst.value, Some(Value::UInt { width: 4, value: 7 }));
    }

    #[test]
    fn non_optional_option_type_is_kept() {
        let reg = lookup();
        let ctx = SchemaContext::new(&reg);
        let e = entry(StorageModifier::Default, 3, vec![0x00]);
        let strategy = ctx.resolve_storage_type(&e).unwrap();
        assert_eq!(strategy.ty, 3);
        assert_eq!(strategy.type_name(), "Option<u32>");
    }

    #[test]
    fn truncated_fallback_is_structural_error() {
        let reg = lookup();
        let ctx = SchemaContext::new(&reg);
        let e = entry(StorageModifier::Default, 0, vec![1, 2]);
        let strategy = ctx.resolve_storage_type(&e).unwrap();
        assert!(matches!(
            ctx.decode_value(&strategy, &e.fallback, DecodeOptions::default()),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn trailing_fallback_bytes_show_up_on_reencode() {
        let reg = lookup();
        let ctx = SchemaContext::new(&reg);
        let e = entry(StorageModifier::Default, 0, vec![1, 0, 0, 0, 9]);
        let strategy = ctx.resolve_storage_type(&e).unwrap();
        let inst = ctx
            .decode_value(&strategy, &e.fallback, DecodeOptions::default())
            .unwrap();
        assert_eq!(inst.to_bytes(EncodeMode::Full).len(), 4);
    }

    #[test]
    fn signed_values_sign_extend() {
        let reg = lookup();
        let ctx = SchemaContext::new(&reg);
        let e = entry(StorageModifier::Default, 4, vec![0xfe, 0xff]);
        let strategy = ctx.resolve_storage_type(&e).unwrap();
        let inst = ctx
            .decode_value(&strategy, &e.fallback, DecodeOptions::default())
            .unwrap();
        assert_eq!(inst.value, Some(Value::Int { width: 2, value: -2 }));
        assert_eq!(inst.to_bytes(EncodeMode::Full), vec![0xfe, 0xff]);
    }

    #[test]
    fn missing_type_is_reported() {
        let reg = lookup();
        let ctx = SchemaContext::new(&reg);
        let e = entry(StorageModifier::Default, 42, vec![]);
        assert_eq!(
            ctx.resolve_storage_type(&e),
            Err(CodecError::TypeNotFound(42))
        );
    }

    #[test]
    fn self_referential_type_hits_recursion_limit() {
        let reg = PortableRegistry {
            types: vec![PortableType::anonymous(
                0,
                TypeDef::Composite {
                    fields: vec![Field::unnamed(0)],
                },
            )],
        };
        let ctx = SchemaContext::new(&reg);
        let e = entry(StorageModifier::Default, 0, vec![]);
        let strategy = ctx.resolve_storage_type(&e).unwrap();
        assert_eq!(
            ctx.decode_value(&strategy, &[], DecodeOptions::default()),
            Err(CodecError::RecursionLimit(0))
        );
    }

    #[test]
    fn oversized_array_fails_before_allocating() {
        let reg = PortableRegistry {
            types: vec![
                PortableType::anonymous(0, TypeDef::Primitive(Primitive::U8)),
                PortableType::anonymous(
                    1,
                    TypeDef::Array {
                        len: 4_000_000_000,
                        ty: 0,
                    },
                ),
            ],
        };
        let ctx = SchemaContext::new(&reg);
        let e = entry(StorageModifier::Default, 1, vec![]);
        let strategy = ctx.resolve_storage_type(&e).unwrap();
        assert!(matches!(
            ctx.decode_value(&strategy, &e.fallback, DecodeOptions::default()),
            Err(CodecError::UnexpectedEof { needed: 4_000_000_000, .. })
        ));
    }

    #[test]
    fn short_array_reports_eof() {
        let reg = PortableRegistry {
            types: vec![
                PortableType::anonymous(0, TypeDef::Primitive(Primitive::U8)),
                PortableType::anonymous(1, TypeDef::Array { len: 32, ty: 0 }),
            ],
        };
        let ctx = SchemaContext::new(&reg);
        let e = entry(StorageModifier::Default, 1, vec![0; 31]);
        let strategy = ctx.resolve_storage_type(&e).unwrap();
        assert!(matches!(
            ctx.decode_value(&strategy, &e.fallback, DecodeOptions::default()),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }
}
