//! codec::types
//!
//! Portable type lookup used by v14+ metadata and by the latest projection.
//!
//! Types are referenced by a compact `TypeId`, which is the type's position
//! in the lookup table.

use serde::Serialize;

use super::wire::{Reader, Writer};
use super::CodecError;

/// Index into a [`PortableRegistry`].
pub type TypeId = u32;

/// Maximum nesting when rendering type names for recursive types.
const NAME_DEPTH_LIMIT: usize = 16;

/// Primitive scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Bool,
    Char,
    Str,
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
}

impl Primitive {
    const ALL: [Primitive; 13] = [
        Primitive::Bool,
        Primitive::Char,
        Primitive::Str,
        Primitive::U8,
        Primitive::U16,
        Primitive::U32,
        Primitive::U64,
        Primitive::U128,
        Primitive::I8,
        Primitive::I16,
        Primitive::I32,
        Primitive::I64,
        Primitive::I128,
    ];

    fn tag(self) -> u8 {
        Self::ALL
            .iter()
            .position(|p| *p == self)
            .map(|i| i as u8)
            .unwrap_or_default()
    }

    fn from_tag(tag: u8, offset: usize) -> Result<Self, CodecError> {
        Self::ALL
            .get(usize::from(tag))
            .copied()
            .ok_or(CodecError::InvalidTag {
                what: "primitive",
                tag,
                offset,
            })
    }

    /// Fixed encoded width in bytes for integer primitives.
    pub fn int_width(self) -> Option<usize> {
        match self {
            Primitive::U8 | Primitive::I8 => Some(1),
            Primitive::U16 | Primitive::I16 => Some(2),
            Primitive::U32 | Primitive::I32 => Some(4),
            Primitive::U64 | Primitive::I64 => Some(8),
            Primitive::U128 | Primitive::I128 => Some(16),
            Primitive::Bool | Primitive::Char | Primitive::Str => None,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64 | Primitive::I128
        )
    }

    /// Source-level spelling, as used in type names.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Char => "char",
            Primitive::Str => "str",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::U128 => "u128",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::I128 => "i128",
        }
    }

    /// Parse a primitive from its source-level spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }
}

/// A named or positional field of a composite or variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeId,
    pub type_name: Option<String>,
    pub docs: Vec<String>,
}

impl Field {
    pub fn unnamed(ty: TypeId) -> Self {
        Self {
            name: None,
            ty,
            type_name: None,
            docs: Vec::new(),
        }
    }

    pub fn named(name: impl Into<String>, ty: TypeId, type_name: Option<String>) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            type_name,
            docs: Vec::new(),
        }
    }

    fn encode(&self, w: &mut Writer) {
        w.option(self.name.as_ref(), |w, n| w.str(n));
        w.compact(u128::from(self.ty));
        w.option(self.type_name.as_ref(), |w, n| w.str(n));
        w.strings(&self.docs);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            name: r.option(|r| r.str())?,
            ty: r.compact_u32()?,
            type_name: r.option(|r| r.str())?,
            docs: r.strings()?,
        })
    }
}

/// One arm of an enum type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Variant {
    pub name: String,
    pub fields: Vec<Field>,
    pub index: u8,
    pub docs: Vec<String>,
}

impl Variant {
    fn encode(&self, w: &mut Writer) {
        w.str(&self.name);
        w.seq(&self.fields, |w, f| f.encode(w));
        w.u8(self.index);
        w.strings(&self.docs);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            name: r.str()?,
            fields: r.seq(Field::decode)?,
            index: r.u8()?,
            docs: r.strings()?,
        })
    }
}

/// Shape of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeDef {
    Composite {
        fields: Vec<Field>,
    },
    Variant {
        variants: Vec<Variant>,
    },
    Sequence {
        #[serde(rename = "type")]
        ty: TypeId,
    },
    Array {
        len: u32,
        #[serde(rename = "type")]
        ty: TypeId,
    },
    Tuple(Vec<TypeId>),
    Primitive(Primitive),
    Compact {
        #[serde(rename = "type")]
        ty: TypeId,
    },
}

impl TypeDef {
    fn encode(&self, w: &mut Writer) {
        match self {
            TypeDef::Composite { fields } => {
                w.u8(0);
                w.seq(fields, |w, f| f.encode(w));
            }
            TypeDef::Variant { variants } => {
                w.u8(1);
                w.seq(variants, |w, v| v.encode(w));
            }
            TypeDef::Sequence { ty } => {
                w.u8(2);
                w.compact(u128::from(*ty));
            }
            TypeDef::Array { len, ty } => {
                w.u8(3);
                w.u32(*len);
                w.compact(u128::from(*ty));
            }
            TypeDef::Tuple(items) => {
                w.u8(4);
                w.seq(items, |w, t| w.compact(u128::from(*t)));
            }
            TypeDef::Primitive(p) => {
                w.u8(5);
                w.u8(p.tag());
            }
            TypeDef::Compact { ty } => {
                w.u8(6);
                w.compact(u128::from(*ty));
            }
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let offset = r.position();
        match r.u8()? {
            0 => Ok(TypeDef::Composite {
                fields: r.seq(Field::decode)?,
            }),
            1 => Ok(TypeDef::Variant {
                variants: r.seq(Variant::decode)?,
            }),
            2 => Ok(TypeDef::Sequence {
                ty: r.compact_u32()?,
            }),
            3 => Ok(TypeDef::Array {
                len: r.u32()?,
                ty: r.compact_u32()?,
            }),
            4 => Ok(TypeDef::Tuple(r.seq(|r| r.compact_u32())?)),
            5 => {
                let at = r.position();
                Ok(TypeDef::Primitive(Primitive::from_tag(r.u8()?, at)?))
            }
            6 => Ok(TypeDef::Compact {
                ty: r.compact_u32()?,
            }),
            tag => Err(CodecError::InvalidTag {
                what: "type definition",
                tag,
                offset,
            }),
        }
    }
}

/// Generic parameter of a path-named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Option<TypeId>,
}

/// An entry in the lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortableType {
    pub id: TypeId,
    pub path: Vec<String>,
    pub params: Vec<TypeParam>,
    pub def: TypeDef,
    pub docs: Vec<String>,
}

impl PortableType {
    /// Create an anonymous (path-less) type.
    pub fn anonymous(id: TypeId, def: TypeDef) -> Self {
        Self {
            id,
            path: Vec::new(),
            params: Vec::new(),
            def,
            docs: Vec::new(),
        }
    }

    /// Whether this is the `Option<T>` wrapper.
    ///
    /// Returns the wrapped type id when it is.
    pub fn option_inner(&self) -> Option<TypeId> {
        if self.path.len() != 1 || self.path[0] != "Option" {
            return None;
        }
        match &self.def {
            TypeDef::Variant { variants } => variants
                .iter()
                .find(|v| v.name == "Some")
                .and_then(|v| match v.fields.as_slice() {
                    [only] => Some(only.ty),
                    _ => None,
                }),
            _ => None,
        }
    }

    fn encode(&self, w: &mut Writer) {
        w.compact(u128::from(self.id));
        w.strings(&self.path);
        w.seq(&self.params, |w, p| {
            w.str(&p.name);
            w.option(p.ty.as_ref(), |w, t| w.compact(u128::from(*t)));
        });
        self.def.encode(w);
        w.strings(&self.docs);
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            id: r.compact_u32()?,
            path: r.strings()?,
            params: r.seq(|r| {
                Ok(TypeParam {
                    name: r.str()?,
                    ty: r.option(|r| r.compact_u32())?,
                })
            })?,
            def: TypeDef::decode(r)?,
            docs: r.strings()?,
        })
    }
}

/// The lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortableRegistry {
    pub types: Vec<PortableType>,
}

impl PortableRegistry {
    /// Look up a type by id.
    pub fn get(&self, id: TypeId) -> Result<&PortableType, CodecError> {
        // Ids are positional in well-formed tables; fall back to a scan otherwise.
        match self.types.get(id as usize) {
            Some(ty) if ty.id == id => Ok(ty),
            _ => self
                .types
                .iter()
                .find(|t| t.id == id)
                .ok_or(CodecError::TypeNotFound(id)),
        }
    }

    /// Human-readable name for a type, e.g. `Vec<u8>` or `AccountInfo<u32, u128>`.
    pub fn type_name(&self, id: TypeId) -> String {
        self.name_at_depth(id, 0)
    }

    fn name_at_depth(&self, id: TypeId, depth: usize) -> String {
        if depth > NAME_DEPTH_LIMIT {
            return "..".to_string();
        }
        let Ok(ty) = self.get(id) else {
            return format!("<unknown #{id}>");
        };
        let next = |t: TypeId| self.name_at_depth(t, depth + 1);

        if let Some(last) = ty.path.last() {
            if ty.params.is_empty() {
                return last.clone();
            }
            let params = ty
                .params
                .iter()
                .map(|p| p.ty.map(next).unwrap_or_else(|| p.name.clone()))
                .collect::<Vec<_>>()
                .join(", ");
            return format!("{last}<{params}>");
        }

        match &ty.def {
            TypeDef::Primitive(p) => p.name().to_string(),
            TypeDef::Sequence { ty } => format!("Vec<{}>", next(*ty)),
            TypeDef::Array { len, ty } => format!("[{}; {}]", next(*ty), len),
            TypeDef::Compact { ty } => format!("Compact<{}>", next(*ty)),
            TypeDef::Tuple(items) => {
                let inner = items.iter().map(|t| next(*t)).collect::<Vec<_>>();
                format!("({})", inner.join(", "))
            }
            TypeDef::Composite { .. } => format!("Struct#{id}"),
            TypeDef::Variant { .. } => format!("Enum#{id}"),
        }
    }

    pub(crate) fn encode(&self, w: &mut Writer) {
        w.seq(&self.types, |w, t| t.encode(w));
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            types: r.seq(PortableType::decode)?,
        })
    }
}
