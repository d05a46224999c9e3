//! Shared metadata builders for integration tests.

#![allow(dead_code)]

use metaconform::codec::metadata::{
    Extrinsic, LatestMetadata, LegacyCall, LegacyArg, LegacyExtrinsic, LegacyMetadata,
    LegacyModule, LegacyStorage, LegacyStorageItem, LegacyStorageType, MetadataBody, Pallet,
    PalletStorage, RuntimeMetadata, StorageEntry, StorageEntryType, StorageHasher,
    StorageModifier,
};
use metaconform::codec::types::{Field, PortableType, Primitive};
use metaconform::codec::{DecodedMetadata, PortableRegistry, TypeDef};

/// A legacy storage item.
pub fn item(name: &str, modifier: StorageModifier, ty: &str, fallback: &[u8]) -> LegacyStorageItem {
    LegacyStorageItem {
        name: name.to_string(),
        modifier,
        ty: LegacyStorageType::Plain(ty.to_string()),
        fallback: fallback.to_vec(),
        docs: vec![],
    }
}

/// A legacy module with storage and no calls.
pub fn module(name: &str, items: Vec<LegacyStorageItem>) -> LegacyModule {
    LegacyModule {
        name: name.to_string(),
        storage: Some(LegacyStorage {
            prefix: name.to_string(),
            items,
        }),
        calls: None,
        events: None,
        constants: vec![],
        errors: vec![],
        index: None,
    }
}

/// Encode legacy modules under `version`.
pub fn legacy_blob(version: u32, modules: Vec<LegacyModule>) -> Vec<u8> {
    let extrinsic = (version >= 11).then(|| LegacyExtrinsic {
        version: 4,
        signed_extensions: vec![],
    });
    RuntimeMetadata::new(
        version,
        MetadataBody::Legacy(LegacyMetadata { modules, extrinsic }),
    )
    .expect("valid legacy version")
    .to_bytes()
}

/// The System and Timestamp modules of a small v9 chain. Every default decodes.
pub fn v9_modules() -> Vec<LegacyModule> {
    let mut timestamp = module(
        "Timestamp",
        vec![
            item("Now", StorageModifier::Default, "Moment", &[0; 8]),
            item("DidUpdate", StorageModifier::Default, "bool", &[0]),
        ],
    );
    timestamp.calls = Some(vec![LegacyCall {
        name: "set".into(),
        args: vec![LegacyArg {
            name: "now".into(),
            ty: "Compact<Moment>".into(),
        }],
        docs: vec![" Set the current time.".into()],
    }]);

    vec![
        module(
            "System",
            vec![
                item("Number", StorageModifier::Default, "BlockNumber", &[0; 4]),
                item("ExtrinsicCount", StorageModifier::Optional, "u32", &[0]),
                item("Events", StorageModifier::Default, "Vec<u8>", &[0]),
                item("ParentHash", StorageModifier::Default, "Hash", &[0; 32]),
            ],
        ),
        timestamp,
    ]
}

pub fn v9_blob() -> Vec<u8> {
    legacy_blob(9, v9_modules())
}

/// A v9 chain whose `System.Number` default is two bytes short of a `u32`.
pub fn v9_bad_default_blob() -> Vec<u8> {
    let mut modules = v9_modules();
    if let Some(storage) = modules[0].storage.as_mut() {
        storage.items[0].fallback = vec![0, 0];
    }
    legacy_blob(9, modules)
}

/// A v10 chain where an opaque storage type claims the path of the
/// module's own call enum.
pub fn v10_colliding_blob() -> Vec<u8> {
    let mut balances = module(
        "Balances",
        vec![item("Pending", StorageModifier::Default, "Balances::Call", &[])],
    );
    balances.calls = Some(vec![LegacyCall {
        name: "transfer".into(),
        args: vec![],
        docs: vec![],
    }]);
    legacy_blob(10, vec![balances])
}

/// Portable lookup for the v14 sample:
///
/// 0: u32, 1: AccountInfo { nonce: u32 }, 2: (), 3: Option<u32>
pub fn v14_types() -> PortableRegistry {
    PortableRegistry {
        types: vec![
            PortableType::anonymous(0, TypeDef::Primitive(Primitive::U32)),
            PortableType {
                id: 1,
                path: vec!["frame_system".into(), "AccountInfo".into()],
                params: vec![],
                def: TypeDef::Composite {
                    fields: vec![Field::named("nonce", 0, Some("Index".into()))],
                },
                docs: vec![],
            },
            PortableType::anonymous(2, TypeDef::Tuple(vec![])),
            PortableType {
                id: 3,
                path: vec!["Option".into()],
                params: vec![metaconform::codec::types::TypeParam {
                    name: "T".into(),
                    ty: Some(0),
                }],
                def: TypeDef::Variant {
                    variants: vec![
                        metaconform::codec::types::Variant {
                            name: "None".into(),
                            fields: vec![],
                            index: 0,
                            docs: vec![],
                        },
                        metaconform::codec::types::Variant {
                            name: "Some".into(),
                            fields: vec![Field::unnamed(0)],
                            index: 1,
                            docs: vec![],
                        },
                    ],
                },
                docs: vec![],
            },
        ],
    }
}

fn entry(name: &str, modifier: StorageModifier, ty: StorageEntryType, fallback: &[u8]) -> StorageEntry {
    StorageEntry {
        name: name.to_string(),
        modifier,
        ty,
        fallback: fallback.to_vec(),
        docs: vec![],
    }
}

pub fn v14_metadata() -> LatestMetadata {
    LatestMetadata {
        types: v14_types(),
        pallets: vec![Pallet {
            name: "System".into(),
            storage: Some(PalletStorage {
                prefix: "System".into(),
                entries: vec![
                    entry("Number", StorageModifier::Default, StorageEntryType::Plain(0), &[0; 4]),
                    entry(
                        "Account",
                        StorageModifier::Default,
                        StorageEntryType::Map {
                            hashers: vec![StorageHasher::Blake2_128Concat],
                            key: 0,
                            value: 1,
                        },
                        &[7, 0, 0, 0],
                    ),
                    entry("LastRuntimeUpgrade", StorageModifier::Optional, StorageEntryType::Plain(3), &[0]),
                ],
            }),
            calls: None,
            event: None,
            constants: vec![],
            error: None,
            index: 0,
            docs: vec![],
        }],
        extrinsic: Extrinsic {
            ty: 2,
            version: 4,
            signed_extensions: vec![],
        },
        runtime_ty: 2,
    }
}

pub fn v14_blob() -> Vec<u8> {
    RuntimeMetadata::new(14, MetadataBody::Portable(v14_metadata()))
        .expect("valid portable version")
        .to_bytes()
}
