use super::support::result;
use serde_json::{Value, json};
use skinsight::AnalysisError;
use skinsight::error::StoreError;
use skinsight::records::{HistoryMerger, JsonFileRecordStore, RecordStore};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn seed(root: &Path, scope: &str, records: &Value) {
    let dir = root.join(scope);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("anagrafiche.json"),
        serde_json::to_string_pretty(records).unwrap(),
    )
    .unwrap();
}

fn read(root: &Path, scope: &str) -> Value {
    let raw = std::fs::read_to_string(root.join(scope).join("anagrafiche.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn merger(root: &Path) -> HistoryMerger {
    HistoryMerger::new(Arc::new(JsonFileRecordStore::new(root, "anagrafiche.json")))
}

#[tokio::test]
async fn merge_appends_and_keeps_other_fields() {
    let tmp = TempDir::new().unwrap();
    seed(
        tmp.path(),
        "dr.rossi",
        &json!([
            {"id": "1", "nome": "Giulia", "cognome": "Verdi", "fototipo": 3},
            {"id": "2", "nome": "Marco", "analysis_history": [
                {"timestamp": "2024-01-10 08:00:00", "result": {"legacy": true}}
            ]}
        ]),
    );

    let merger = merger(tmp.path());
    merger.merge("dr.rossi", "1", &result(55)).await.unwrap();
    merger.merge("dr.rossi", "2", &result(65)).await.unwrap();

    let stored = read(tmp.path(), "dr.rossi");
    assert_eq!(stored[0]["nome"], "Giulia");
    assert_eq!(stored[0]["fototipo"], 3);
    assert_eq!(stored[0]["analysis_history"].as_array().unwrap().len(), 1);
    assert_eq!(
        stored[0]["analysis_history"][0]["result"]["Idratazione"]["value"],
        55
    );

    let second = stored[1]["analysis_history"].as_array().unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(second[0]["result"], json!({"legacy": true}));
    assert_eq!(second[1]["result"]["Tonalità"]["value"], 65);
}

#[tokio::test]
async fn untouched_siblings_keep_their_keys() {
    let tmp = TempDir::new().unwrap();
    let sibling = json!({"id": "2", "nome": "B", "analysis_history": []});
    let bare = json!({"id": "3", "nome": "C"});
    seed(
        tmp.path(),
        "alice",
        &json!([{"id": "1", "analysis_history": []}, sibling, bare]),
    );

    merger(tmp.path()).merge("alice", "1", &result(40)).await.unwrap();

    let stored = read(tmp.path(), "alice");
    assert_eq!(stored[0]["analysis_history"].as_array().unwrap().len(), 1);
    assert_eq!(stored[1], sibling);
    assert_eq!(stored[2], bare);
}

#[tokio::test]
async fn unknown_entity_leaves_file_bytes_unchanged() {
    let tmp = TempDir::new().unwrap();
    seed(tmp.path(), "alice", &json!([{"id": "1", "nome": "Ada"}]));
    let path = tmp.path().join("alice").join("anagrafiche.json");
    let before = std::fs::read(&path).unwrap();

    let err = merger(tmp.path())
        .merge("alice", "99", &result(10))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::NotFound { ref entity_id, .. } if entity_id == "99"));
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn missing_scope_file_is_not_found_for_any_entity() {
    let tmp = TempDir::new().unwrap();
    let err = merger(tmp.path())
        .merge("nuovo", "1", &result(10))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::NotFound { .. }));
    assert!(!tmp.path().join("nuovo").join("anagrafiche.json").exists());
}

#[tokio::test]
async fn corrupt_file_is_reported_not_overwritten() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("alice");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("anagrafiche.json"), "{ not json").unwrap();

    let err = merger(tmp.path())
        .merge("alice", "1", &result(10))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Store(StoreError::Corrupt { .. })));
    assert_eq!(
        std::fs::read_to_string(dir.join("anagrafiche.json")).unwrap(),
        "{ not json"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_merges_on_one_scope_all_persist() {
    let tmp = TempDir::new().unwrap();
    seed(tmp.path(), "alice", &json!([{"id": "a"}, {"id": "b"}]));
    let merger = Arc::new(merger(tmp.path()));

    let tasks: Vec<_> = (0..12u8)
        .map(|i| {
            let merger = Arc::clone(&merger);
            tokio::spawn(async move {
                let id = if i % 3 == 0 { "b" } else { "a" };
                merger.merge("alice", id, &result(i)).await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let stored = read(tmp.path(), "alice");
    assert_eq!(stored[0]["analysis_history"].as_array().unwrap().len(), 8);
    assert_eq!(stored[1]["analysis_history"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn scopes_are_isolated() {
    let tmp = TempDir::new().unwrap();
    seed(tmp.path(), "alice", &json!([{"id": "1"}]));
    seed(tmp.path(), "bob", &json!([{"id": "1"}]));

    merger(tmp.path()).merge("alice", "1", &result(90)).await.unwrap();

    let store = JsonFileRecordStore::new(tmp.path(), "anagrafiche.json");
    assert_eq!(store.load("alice").await.unwrap()[0].history().len(), 1);
    assert!(store.load("bob").await.unwrap()[0].history().is_empty());
}
