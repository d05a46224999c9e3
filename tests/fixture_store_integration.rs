//! Integration tests for golden fixture storage.

mod support;

use metaconform::codec::ReferenceCodec;
use metaconform::core::check::Check;
use metaconform::core::paths::FixturePaths;
use metaconform::core::types::FixtureName;
use metaconform::fixtures::{FixtureKind, FixtureLock, FixtureStore, FsFixtureStore, StoreError};
use metaconform::harness::golden::TREE_MATCHES;
use metaconform::harness::{run_fixture, Fixture, HarnessOptions, StrictMode};
use metaconform::ui::output::Verbosity;
use serde_json::json;
use tempfile::TempDir;

fn name(s: &str) -> FixtureName {
    FixtureName::new(s).unwrap()
}

#[test]
fn write_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let store = FsFixtureStore::new(temp.path());
    store
        .write(12, &name("kusama"), FixtureKind::Json, &json!({"a": [1, 2]}))
        .unwrap();

    let entries: Vec<String> = std::fs::read_dir(temp.path().join("v12"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["kusama-json.json".to_string()]);
}

#[test]
fn fixtures_are_pretty_with_trailing_newline() {
    let temp = TempDir::new().unwrap();
    let store = FsFixtureStore::new(temp.path());
    store
        .write(9, &name("polkadot"), FixtureKind::Json, &json!({"magicNumber": 1635018093}))
        .unwrap();

    let text = std::fs::read_to_string(temp.path().join("v9/polkadot-json.json")).unwrap();
    assert_eq!(text, "{\n  \"magicNumber\": 1635018093\n}\n");
}

#[test]
fn overwrite_replaces_content() {
    let temp = TempDir::new().unwrap();
    let store = FsFixtureStore::new(temp.path());
    let key = name("chain");
    store.write(13, &key, FixtureKind::Json, &json!(1)).unwrap();
    store.write(13, &key, FixtureKind::Json, &json!(2)).unwrap();
    assert_eq!(store.read(13, &key, FixtureKind::Json).unwrap(), Some(json!(2)));
}

#[test]
fn versions_and_kinds_are_separate_keys() {
    let temp = TempDir::new().unwrap();
    let store = FsFixtureStore::new(temp.path());
    let key = name("chain");
    store.write(14, &key, FixtureKind::Json, &json!("tree")).unwrap();
    store.write(14, &key, FixtureKind::Types, &json!("types")).unwrap();
    store.write(15, &key, FixtureKind::Json, &json!("next")).unwrap();

    assert_eq!(store.read(14, &key, FixtureKind::Types).unwrap(), Some(json!("types")));
    assert_eq!(store.read(15, &key, FixtureKind::Json).unwrap(), Some(json!("next")));
    assert!(store.read(15, &key, FixtureKind::Types).unwrap().is_none());
}

#[test]
fn corrupt_fixture_is_a_parse_error() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("v9")).unwrap();
    std::fs::write(temp.path().join("v9/chain-json.json"), "{ not json").unwrap();

    let store = FsFixtureStore::new(temp.path());
    let err = store.read(9, &name("chain"), FixtureKind::Json).unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "{err}");
}

#[test]
fn corrupt_fixture_fails_the_tree_check_in_reconcile_mode() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("v9")).unwrap();
    std::fs::write(temp.path().join("v9/sample-json.json"), "[").unwrap();

    let store = FsFixtureStore::new(temp.path());
    let fixture = Fixture::new(name("sample"), 9, Check::new(support::v9_blob()));
    let options = HarnessOptions::default()
        .with_mode(StrictMode::Reconcile)
        .with_verbosity(Verbosity::Quiet);
    let report = run_fixture(ReferenceCodec, &store, &fixture, &options);

    assert!(!report.check(TREE_MATCHES).unwrap().passed());
}

#[test]
fn lock_is_exclusive_until_dropped() {
    let temp = TempDir::new().unwrap();
    let paths = FixturePaths::new(temp.path());

    let held = FixtureLock::try_acquire(&paths).unwrap();
    assert!(held.is_held());
    assert!(matches!(
        FixtureLock::try_acquire(&paths),
        Err(StoreError::Locked)
    ));

    drop(held);
    assert!(FixtureLock::try_acquire(&paths).is_ok());
}
