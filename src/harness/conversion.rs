//! harness::conversion
//!
//! Version-conversion checker.
//!
//! Materializes the latest projection by binding the decoded metadata as
//! the registry's active schema. For versions without a unified lookup the
//! converter builds one, so it is scanned for identity collisions: two
//! distinct definitions sharing a path and parameter types would be merged
//! by a deduplicating consumer.

use std::collections::{BTreeMap, BTreeSet};

use super::errors::HarnessError;
use super::report::CheckResult;
use crate::codec::metadata::{LatestMetadata, StorageEntryType};
use crate::codec::{MetadataCodec, PortableRegistry, Registry, TypeDef, TypeId, LOOKUP_VERSION};
use crate::core::check::Check;
use crate::ui::output::{self, Verbosity};

pub const CONVERTS: &str = "converts to latest";

/// Two lookup entries claiming one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub identity: String,
    pub first: TypeId,
    pub second: TypeId,
}

impl From<Collision> for HarnessError {
    fn from(c: Collision) -> Self {
        HarnessError::Collision {
            identity: c.identity,
            first: c.first,
            second: c.second,
        }
    }
}

/// Force conversion to latest and, below v14, scan for collisions.
///
/// `strict` makes a collision fail the check; otherwise collisions are
/// logged and attached as warnings.
pub fn check_conversion<C: MetadataCodec>(
    registry: &mut Registry<C>,
    version: u32,
    check: &Check,
    strict: bool,
    verbosity: Verbosity,
) -> CheckResult {
    let metadata = match registry.decode(check.data()) {
        Ok(m) => m,
        Err(e) => return CheckResult::fail(CONVERTS, HarnessError::Decode(e)),
    };
    if let Err(e) = registry.set_active_schema(&metadata) {
        return CheckResult::fail(CONVERTS, HarnessError::Conversion(e));
    }
    let Some(latest) = registry.latest() else {
        return CheckResult::fail(CONVERTS, HarnessError::NoActiveSchema);
    };

    if version >= LOOKUP_VERSION {
        return CheckResult::pass(CONVERTS);
    }

    let collisions = uniqueness_scan(latest);
    output::debug(
        format!("v{version}: {} collision(s) in converted lookup", collisions.len()),
        verbosity,
    );
    match collisions.split_first() {
        None => CheckResult::pass(CONVERTS),
        Some((first, rest)) if strict => {
            let mut result = CheckResult::fail(CONVERTS, HarnessError::from(first.clone()));
            if !rest.is_empty() {
                result = result.with_warning(format!("{} further collision(s)", rest.len()));
            }
            result
        }
        Some(_) => {
            let warnings: Vec<String> = collisions
                .into_iter()
                .map(|c| HarnessError::from(c).to_string())
                .collect();
            for w in &warnings {
                output::warn(w, verbosity);
            }
            CheckResult::pass(CONVERTS).with_warnings(warnings)
        }
    }
}

/// Walk every type reachable from the metadata and report identity collisions.
///
/// The identity of a type is its path joined by `::` plus its resolved
/// parameter types. Path-less types are anonymous and never collide.
/// Entries with equal definitions are duplicates, not collisions.
pub fn uniqueness_scan(latest: &LatestMetadata) -> Vec<Collision> {
    let lookup = &latest.types;
    let reachable = reachable_types(latest);

    let mut seen: BTreeMap<String, TypeId> = BTreeMap::new();
    let mut collisions = Vec::new();
    for id in reachable {
        let Ok(ty) = lookup.get(id) else { continue };
        if ty.path.is_empty() {
            continue;
        }
        let identity = identity(lookup, id);
        match seen.get(&identity) {
            None => {
                seen.insert(identity, id);
            }
            Some(&first) => {
                let Ok(other) = lookup.get(first) else { continue };
                if other.def != ty.def || other.params != ty.params {
                    collisions.push(Collision {
                        identity,
                        first,
                        second: id,
                    });
                }
            }
        }
    }
    collisions
}

fn identity(lookup: &PortableRegistry, id: TypeId) -> String {
    let Ok(ty) = lookup.get(id) else {
        return String::new();
    };
    let mut identity = ty.path.join("::");
    if !ty.params.is_empty() {
        let params: Vec<String> = ty
            .params
            .iter()
            .map(|p| match p.ty {
                Some(t) => lookup.type_name(t),
                None => p.name.clone(),
            })
            .collect();
        identity.push('<');
        identity.push_str(&params.join(", "));
        identity.push('>');
    }
    identity
}

/// Type ids reachable from pallets, the extrinsic and the runtime type, ascending.
fn reachable_types(latest: &LatestMetadata) -> BTreeSet<TypeId> {
    let mut roots = Vec::new();
    for pallet in &latest.pallets {
        if let Some(storage) = &pallet.storage {
            for entry in &storage.entries {
                match &entry.ty {
                    StorageEntryType::Plain(ty) => roots.push(*ty),
                    StorageEntryType::Map { key, value, .. } => {
                        roots.push(*key);
                        roots.push(*value);
                    }
                }
            }
        }
        roots.extend(pallet.calls);
        roots.extend(pallet.event);
        roots.extend(pallet.error);
        roots.extend(pallet.constants.iter().map(|c| c.ty));
    }
    roots.push(latest.extrinsic.ty);
    for ext in &latest.extrinsic.signed_extensions {
        roots.push(ext.ty);
        roots.push(ext.additional_signed);
    }
    roots.push(latest.runtime_ty);

    let mut visited = BTreeSet::new();
    while let Some(id) = roots.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Ok(ty) = latest.types.get(id) else { continue };
        roots.extend(ty.params.iter().filter_map(|p| p.ty));
        match &ty.def {
            TypeDef::Composite { fields } => roots.extend(fields.iter().map(|f| f.ty)),
            TypeDef::Variant { variants } => roots.extend(
                variants
                    .iter()
                    .flat_map(|v| v.fields.iter().map(|f| f.ty)),
            ),
            TypeDef::Sequence { ty } | TypeDef::Array { ty, .. } | TypeDef::Compact { ty } => {
                roots.push(*ty)
            }
            TypeDef::Tuple(items) => roots.extend(items.iter().copied()),
            TypeDef::Primitive(_) => {}
        }
    }
    visited
}
