//! codec::convert
//!
//! Conversion of legacy (v9-v13) metadata into the latest portable shape.
//!
//! # Approach
//!
//! Every legacy type name is parsed into a [`TypeExpr`] and interned into a
//! fresh [`PortableRegistry`] under its canonical spelling, so equal names
//! share one lookup id. Well-known runtime aliases (`AccountId`, `Balance`,
//! `BlockNumber`, ...) resolve to their concrete shapes. Names the converter
//! has no definition for become opaque path-named composites with no fields.
//!
//! Calls, events and errors of each module become variant types named
//! `<Module>::Call`, `<Module>::Event` and `<Module>::Error`.

use std::collections::HashMap;

use super::metadata::{
    Extrinsic, LatestMetadata, LegacyMetadata, LegacyModule, LegacyStorageType, Pallet,
    PalletConstant, PalletStorage, SignedExtension, StorageEntry, StorageEntryType,
};
use super::names::{TypeExpr, TYPE_NAME_DEPTH_LIMIT};
use super::types::{
    Field, PortableRegistry, PortableType, Primitive, TypeDef, TypeId, TypeParam, Variant,
};
use super::CodecError;

/// Default extrinsic format version when a legacy blob predates the descriptor.
const DEFAULT_EXTRINSIC_VERSION: u8 = 4;

/// Builds a portable lookup while converting one legacy blob.
#[derive(Debug, Default)]
pub struct LegacyConverter {
    types: Vec<PortableType>,
    interned: HashMap<String, TypeId>,
}

impl LegacyConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a legacy body into the latest shape.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::TypeName` for unparseable type names and
    /// `CodecError::Conversion` for structurally inconsistent modules.
    pub fn convert(mut self, legacy: &LegacyMetadata) -> Result<LatestMetadata, CodecError> {
        let mut pallets = Vec::with_capacity(legacy.modules.len());
        for (position, module) in legacy.modules.iter().enumerate() {
            let index = match module.index {
                Some(index) => index,
                None => u8::try_from(position).map_err(|_| {
                    CodecError::Conversion(format!(
                        "module '{}' at position {position} has no index",
                        module.name
                    ))
                })?,
            };
            pallets.push(self.convert_module(module, index)?);
        }

        let (ext_version, identifiers) = match &legacy.extrinsic {
            Some(ext) => (ext.version, ext.signed_extensions.clone()),
            None => (DEFAULT_EXTRINSIC_VERSION, Vec::new()),
        };
        let unit = self.intern("()")?;
        let extrinsic = Extrinsic {
            ty: self.intern("UncheckedExtrinsic")?,
            version: ext_version,
            signed_extensions: identifiers
                .into_iter()
                .map(|identifier| SignedExtension {
                    identifier,
                    ty: unit,
                    additional_signed: unit,
                })
                .collect(),
        };
        let runtime_ty = self.intern("Runtime")?;

        Ok(LatestMetadata {
            types: PortableRegistry { types: self.types },
            pallets,
            extrinsic,
            runtime_ty,
        })
    }

    fn convert_module(&mut self, module: &LegacyModule, index: u8) -> Result<Pallet, CodecError> {
        let storage = match &module.storage {
            Some(storage) => {
                let mut entries = Vec::with_capacity(storage.items.len());
                for item in &storage.items {
                    entries.push(StorageEntry {
                        name: item.name.clone(),
                        modifier: item.modifier,
                        ty: self.storage_type(&module.name, &item.name, &item.ty)?,
                        fallback: item.fallback.clone(),
                        docs: item.docs.clone(),
                    });
                }
                Some(PalletStorage {
                    prefix: storage.prefix.clone(),
                    entries,
                })
            }
            None => None,
        };

        let calls = match &module.calls {
            Some(calls) => {
                let mut variants = Vec::with_capacity(calls.len());
                for (i, call) in calls.iter().enumerate() {
                    let mut fields = Vec::with_capacity(call.args.len());
                    for arg in &call.args {
                        let ty = self.intern(&arg.ty)?;
                        fields.push(Field::named(&arg.name, ty, Some(arg.ty.clone())));
                    }
                    variants.push(variant(&call.name, i, fields, call.docs.clone())?);
                }
                Some(self.push_enum(&module.name, "Call", variants))
            }
            None => None,
        };

        let event = match &module.events {
            Some(events) => {
                let mut variants = Vec::with_capacity(events.len());
                for (i, event) in events.iter().enumerate() {
                    let mut fields = Vec::with_capacity(event.args.len());
                    for arg in &event.args {
                        fields.push(Field::unnamed(self.intern(arg)?));
                    }
                    variants.push(variant(&event.name, i, fields, event.docs.clone())?);
                }
                Some(self.push_enum(&module.name, "Event", variants))
            }
            None => None,
        };

        let error = if module.errors.is_empty() {
            None
        } else {
            let mut variants = Vec::with_capacity(module.errors.len());
            for (i, err) in module.errors.iter().enumerate() {
                variants.push(variant(&err.name, i, Vec::new(), err.docs.clone())?);
            }
            Some(self.push_enum(&module.name, "Error", variants))
        };

        let mut constants = Vec::with_capacity(module.constants.len());
        for constant in &module.constants {
            constants.push(PalletConstant {
                name: constant.name.clone(),
                ty: self.intern(&constant.ty)?,
                value: constant.value.clone(),
                docs: constant.docs.clone(),
            });
        }

        Ok(Pallet {
            name: module.name.clone(),
            storage,
            calls,
            event,
            constants,
            error,
            index,
            docs: Vec::new(),
        })
    }

    fn storage_type(
        &mut self,
        module: &str,
        item: &str,
        ty: &LegacyStorageType,
    ) -> Result<StorageEntryType, CodecError> {
        Ok(match ty {
            LegacyStorageType::Plain(value) => StorageEntryType::Plain(self.intern(value)?),
            LegacyStorageType::Map {
                hasher, key, value, ..
            } => StorageEntryType::Map {
                hashers: vec![*hasher],
                key: self.intern(key)?,
                value: self.intern(value)?,
            },
            LegacyStorageType::DoubleMap {
                hasher,
                key1,
                key2,
                value,
                key2_hasher,
            } => StorageEntryType::Map {
                hashers: vec![*hasher, *key2_hasher],
                key: self.intern(&format!("({key1}, {key2})"))?,
                value: self.intern(value)?,
            },
            LegacyStorageType::NMap {
                keys,
                hashers,
                value,
            } => {
                if keys.len() != hashers.len() {
                    return Err(CodecError::Conversion(format!(
                        "{module}.{item}: {} keys but {} hashers",
                        keys.len(),
                        hashers.len()
                    )));
                }
                let key = match keys.as_slice() {
                    [single] => self.intern(single)?,
                    _ => self.intern(&format!("({})", keys.join(", ")))?,
                };
                StorageEntryType::Map {
                    hashers: hashers.clone(),
                    key,
                    value: self.intern(value)?,
                }
            }
        })
    }

    /// Intern a legacy type name, returning its lookup id.
    pub fn intern(&mut self, name: &str) -> Result<TypeId, CodecError> {
        let expr = TypeExpr::parse(name)?;
        self.intern_expr(&expr, 0)
    }

    fn intern_expr(&mut self, expr: &TypeExpr, depth: usize) -> Result<TypeId, CodecError> {
        let key = expr.to_string();
        if let Some(id) = self.interned.get(&key) {
            return Ok(*id);
        }
        // Alias expansion can add a level per argument, so allow twice the parse limit.
        if depth > 2 * TYPE_NAME_DEPTH_LIMIT {
            return Err(CodecError::TypeName {
                name: key,
                reason: "nesting too deep".into(),
            });
        }
        let next = depth + 1;

        if let Some(alias) = alias_of(expr) {
            let id = self.intern_expr(&alias, next)?;
            self.interned.insert(key, id);
            return Ok(id);
        }

        let (path, params, def) = match expr {
            TypeExpr::Tuple(items) => {
                let ids = items
                    .iter()
                    .map(|t| self.intern_expr(t, next))
                    .collect::<Result<Vec<_>, _>>()?;
                (Vec::new(), Vec::new(), TypeDef::Tuple(ids))
            }
            TypeExpr::Array(inner, len) => {
                let ty = self.intern_expr(inner, next)?;
                (Vec::new(), Vec::new(), TypeDef::Array { len: *len, ty })
            }
            TypeExpr::Path { segments, args } => self.path_def(&key, segments, args, next)?,
        };

        let id = self.push(path, params, def);
        self.interned.insert(key, id);
        Ok(id)
    }

    fn path_def(
        &mut self,
        key: &str,
        segments: &[String],
        args: &[TypeExpr],
        depth: usize,
    ) -> Result<(Vec<String>, Vec<TypeParam>, TypeDef), CodecError> {
        let ident = segments.last().map(String::as_str).unwrap_or_default();
        let arity = |n: usize| -> Result<(), CodecError> {
            if args.len() == n {
                Ok(())
            } else {
                Err(CodecError::TypeName {
                    name: key.to_string(),
                    reason: format!("{ident} expects {n} generic argument(s), got {}", args.len()),
                })
            }
        };

        if segments.len() == 1 {
            if let Some(p) = Primitive::from_name(ident) {
                arity(0)?;
                return Ok((Vec::new(), Vec::new(), TypeDef::Primitive(p)));
            }
            match ident {
                "Vec" | "BTreeSet" => {
                    arity(1)?;
                    let ty = self.intern_expr(&args[0], depth)?;
                    return Ok((Vec::new(), Vec::new(), TypeDef::Sequence { ty }));
                }
                "BTreeMap" => {
                    arity(2)?;
                    let entry = TypeExpr::Tuple(args.to_vec());
                    let ty = self.intern_expr(&entry, depth)?;
                    return Ok((Vec::new(), Vec::new(), TypeDef::Sequence { ty }));
                }
                "Compact" => {
                    arity(1)?;
                    let ty = self.intern_expr(&args[0], depth)?;
                    return Ok((Vec::new(), Vec::new(), TypeDef::Compact { ty }));
                }
                "Option" => {
                    arity(1)?;
                    let inner = self.intern_expr(&args[0], depth)?;
                    let def = TypeDef::Variant {
                        variants: vec![
                            Variant {
                                name: "None".into(),
                                fields: Vec::new(),
                                index: 0,
                                docs: Vec::new(),
                            },
                            Variant {
                                name: "Some".into(),
                                fields: vec![Field::unnamed(inner)],
                                index: 1,
                                docs: Vec::new(),
                            },
                        ],
                    };
                    let params = vec![TypeParam {
                        name: "T".into(),
                        ty: Some(inner),
                    }];
                    return Ok((vec!["Option".into()], params, def));
                }
                _ => {}
            }
        }

        // No known definition: opaque, path-named, generic over its arguments.
        let mut params = Vec::with_capacity(args.len());
        for arg in args {
            params.push(TypeParam {
                name: arg.to_string(),
                ty: Some(self.intern_expr(arg, depth)?),
            });
        }
        Ok((
            segments.to_vec(),
            params,
            TypeDef::Composite { fields: Vec::new() },
        ))
    }

    fn push(&mut self, path: Vec<String>, params: Vec<TypeParam>, def: TypeDef) -> TypeId {
        let id = self.types.len() as TypeId;
        self.types.push(PortableType {
            id,
            path,
            params,
            def,
            docs: Vec::new(),
        });
        id
    }

    fn push_enum(&mut self, module: &str, kind: &str, variants: Vec<Variant>) -> TypeId {
        self.push(
            vec![module.to_string(), kind.to_string()],
            Vec::new(),
            TypeDef::Variant { variants },
        )
    }
}

fn variant(
    name: &str,
    position: usize,
    fields: Vec<Field>,
    docs: Vec<String>,
) -> Result<Variant, CodecError> {
    let index = u8::try_from(position)
        .map_err(|_| CodecError::Conversion(format!("variant '{name}' index {position} exceeds 255")))?;
    Ok(Variant {
        name: name.to_string(),
        fields,
        index,
        docs,
    })
}

/// Concrete shapes for well-known runtime aliases.
fn alias_of(expr: &TypeExpr) -> Option<TypeExpr> {
    let TypeExpr::Path { segments, args } = expr else {
        return None;
    };
    if segments.len() != 1 {
        return None;
    }
    let path = |name: &str, args: Vec<TypeExpr>| TypeExpr::Path {
        segments: vec![name.to_string()],
        args,
    };
    let bytes32 = || TypeExpr::Array(Box::new(path("u8", Vec::new())), 32);

    match (segments[0].as_str(), args.as_slice()) {
        ("Bytes", []) => Some(path("Vec", vec![path("u8", Vec::new())])),
        ("Text" | "String", []) => Some(path("str", Vec::new())),
        ("AccountId" | "Hash" | "H256", []) => Some(bytes32()),
        ("Balance" | "BalanceOf", _) => Some(path("u128", Vec::new())),
        ("BlockNumber" | "Index", []) => Some(path("u32", Vec::new())),
        ("Moment" | "Weight", []) => Some(path("u64", Vec::new())),
        ("Box", [inner]) => Some(inner.clone()),
        ("PhantomData", _) => Some(TypeExpr::Tuple(Vec::new())),
        _ => None,
    }
}
