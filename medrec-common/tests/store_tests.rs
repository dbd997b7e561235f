//! Integration tests for the patient store backends
//!
//! Tests cover:
//! - Missing file -> NotFound, malformed content -> Corruption
//! - save(load()) preserves content, including full-precision floats
//! - Atomic replace leaves no temp file behind
//! - SQLite backend keeps insertion order and replaces content transactionally

use medrec_common::fs_util::temp_path;
use medrec_common::models::{Gender, PatientFields};
use medrec_common::store::{open_store, JsonFileStore, PatientMap, PatientStore, SqliteStore};
use medrec_common::config::StorageBackend;
use medrec_common::ErrorKind;
use serde_json::Value;
use tempfile::TempDir;

const SEED: &str = r#"{
    "P001": {"name": "Ananya Verma", "city": "Guwahati", "age": 28, "gender": "female", "height": 1.65, "weight": 90.0, "bmi": 33.06, "verdict": "Obese"},
    "P002": {"name": "Ravi Mehta", "city": "Mumbai", "age": 35, "gender": "male", "height": 1.75, "weight": 85.0},
    "P003": {"name": "Sneha Kulkarni", "city": "Pune", "age": 22, "gender": "female", "height": 1.6, "weight": 45.0}
}"#;

fn fields(name: &str, weight: f64) -> PatientFields {
    PatientFields {
        name: name.to_string(),
        city: "Delhi".to_string(),
        age: 50,
        gender: Gender::Others,
        height: 1.7,
        weight,
    }
}

#[tokio::test]
async fn test_json_load_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("absent.json"));

    let err = store.load().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("Patient data file not found"));
}

#[tokio::test]
async fn test_json_load_malformed_is_corruption() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("patients.json");
    let store = JsonFileStore::new(&path);

    for bad in [
        "{ not json",
        "[]",
        r#"{"P1": {"name": "Ann"}}"#,
        r#"{"P1": {"name":"Ann","city":"X","age":30,"gender":"robot","height":1.6,"weight":50}}"#,
    ] {
        std::fs::write(&path, bad).unwrap();
        let err = store.load().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corruption, "content: {}", bad);
    }
}

#[tokio::test]
async fn test_json_save_load_roundtrip_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("patients.json");
    std::fs::write(&path, SEED).unwrap();
    let store = JsonFileStore::new(&path);

    let first = store.load().await.unwrap();
    store.save(&first).await.unwrap();
    let second = store.load().await.unwrap();
    assert_eq!(first, second);

    // Semantic content matches the seed minus derived keys
    let seed: Value = serde_json::from_str(SEED).unwrap();
    let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    for id in ["P001", "P002", "P003"] {
        for key in ["name", "city", "age", "gender", "height", "weight"] {
            assert_eq!(written[id][key], seed[id][key], "{}.{}", id, key);
        }
        assert!(written[id].get("bmi").is_none());
        assert!(written[id].get("verdict").is_none());
    }

    assert!(!temp_path(&path).exists());
}

#[tokio::test]
async fn test_json_full_precision_floats_survive_save_load() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("patients.json"));

    let mut patients = PatientMap::new();
    patients.insert(
        "P001".to_string(),
        PatientFields {
            height: 1.2886026767126735,
            ..fields("Kavya Iyer", 72.30000000000001)
        },
    );
    store.save(&patients).await.unwrap();

    let loaded = store.load().await.unwrap();
    let stored = loaded.get("P001").unwrap();
    assert_eq!(stored.height.to_bits(), 1.2886026767126735f64.to_bits());
    assert_eq!(stored.weight.to_bits(), 72.30000000000001f64.to_bits());

    // A second cycle must not drift either
    store.save(&loaded).await.unwrap();
    assert_eq!(store.load().await.unwrap(), patients);
}

#[tokio::test]
async fn test_json_preserves_file_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("patients.json");
    std::fs::write(&path, SEED).unwrap();
    let store = JsonFileStore::new(&path);

    let loaded = store.load().await.unwrap();
    let ids: Vec<&str> = loaded.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["P001", "P002", "P003"]);
}

#[tokio::test]
async fn test_json_create_if_missing() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("data").join("patients.json"));

    assert!(store.create_if_missing().await.unwrap());
    assert!(!store.create_if_missing().await.unwrap());
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sqlite_roundtrip_keeps_order() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(&dir.path().join("patients.db")).await.unwrap();

    assert!(store.load().await.unwrap().is_empty());

    let mut patients = PatientMap::new();
    patients.insert("Z9", fields("Zed Zimmer", 70.0));
    patients.insert("A1", fields("Abe Adams", 80.0));
    store.save(&patients).await.unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded, patients);
    let ids: Vec<&str> = loaded.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["Z9", "A1"]);

    // Second save replaces, not appends
    patients.remove("Z9");
    store.save(&patients).await.unwrap();
    assert_eq!(store.load().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sqlite_reopen_sees_saved_rows() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("patients.db");

    let mut patients = PatientMap::new();
    patients.insert("P100", fields("Mia Moreau", 62.5));
    {
        let store = SqliteStore::open(&db_path).await.unwrap();
        store.save(&patients).await.unwrap();
        store.pool().close().await;
    }

    let reopened = SqliteStore::open(&db_path).await.unwrap();
    assert_eq!(reopened.load().await.unwrap(), patients);
}

#[tokio::test]
async fn test_open_store_selects_backend() {
    let dir = TempDir::new().unwrap();

    let json = open_store(StorageBackend::Json, &dir.path().join("p.json"))
        .await
        .unwrap();
    assert_eq!(json.backend(), StorageBackend::Json);
    assert!(json.load().await.unwrap().is_empty());

    let sqlite = open_store(StorageBackend::Sqlite, &dir.path().join("p.db"))
        .await
        .unwrap();
    assert_eq!(sqlite.backend(), StorageBackend::Sqlite);
    assert!(sqlite.location().ends_with("p.db"));
}
