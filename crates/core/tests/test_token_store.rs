use pindrop_core::premium::types::EntitlementMeta;
use pindrop_core::premium::{EntitlementRecord, FileTokenStore, MemoryTokenStore, TokenStore};
use pindrop_core::PlanId;

fn record() -> EntitlementRecord {
    EntitlementRecord {
        plan: PlanId::Monthly,
        email: "me@example.com".to_string(),
        issued_at: 1_700_000_000,
        token: "eyJhbGciOi.payload.sig".to_string(),
    }
}

#[test]
fn save_and_load_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(tmp.path());

    store.save(&record()).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded.token, "eyJhbGciOi.payload.sig");
    assert_eq!(loaded.record(), Some(record()));
}

#[test]
fn missing_files_load_as_none() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(tmp.path());
    assert!(store.load().is_none());
}

#[test]
fn blank_token_file_loads_as_none() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("premium.token"), "   \n").unwrap();
    let store = FileTokenStore::new(tmp.path());
    assert!(store.load().is_none());
}

#[test]
fn token_is_trimmed() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("premium.token"), "  abc.def  \n").unwrap();
    let loaded = FileTokenStore::new(tmp.path()).load().unwrap();
    assert_eq!(loaded.token, "abc.def");
    assert!(loaded.meta.is_none());
    assert!(loaded.record().is_none());
}

#[test]
fn corrupt_metadata_keeps_token() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("premium.token"), "abc").unwrap();
    std::fs::write(tmp.path().join("premium.json"), "not json").unwrap();

    let loaded = FileTokenStore::new(tmp.path()).load().unwrap();
    assert_eq!(loaded.token, "abc");
    assert!(loaded.meta.is_none());
}

#[test]
fn metadata_alone_is_ignored() {
    let tmp = tempfile::tempdir().unwrap();
    let meta = EntitlementMeta {
        plan: PlanId::Lifetime,
        email: "forged@example.com".to_string(),
        issued_at: 0,
    };
    std::fs::write(
        tmp.path().join("premium.json"),
        serde_json::to_string(&meta).unwrap(),
    )
    .unwrap();

    assert!(FileTokenStore::new(tmp.path()).load().is_none());
}

#[test]
fn clear_removes_files_and_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(tmp.path());
    store.save(&record()).unwrap();

    store.clear().unwrap();
    assert!(!tmp.path().join("premium.token").exists());
    assert!(!tmp.path().join("premium.json").exists());
    store.clear().unwrap();
}

#[test]
fn save_creates_missing_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let nested = tmp.path().join("a").join("b");
    let store = FileTokenStore::new(&nested);
    store.save(&record()).unwrap();
    assert!(nested.join("premium.token").exists());
}

#[test]
fn metadata_serializes_plan_lowercase() {
    let json = serde_json::to_string(&record().meta()).unwrap();
    assert!(json.contains("\"plan\":\"monthly\""));
    assert!(!json.contains("payload"), "token must not leak into metadata");
}

#[test]
fn memory_store_roundtrip() {
    let store = MemoryTokenStore::new();
    assert!(store.load().is_none());
    store.save(&record()).unwrap();
    assert_eq!(store.load().unwrap().record(), Some(record()));
    store.clear().unwrap();
    assert!(store.snapshot().is_none());
}
