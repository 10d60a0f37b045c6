use super::types::EntityRecord;
use crate::error::StoreError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Mutex;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Whole-collection persistence for one scope's entity records.
///
/// Stores do not serialize concurrent writers; callers that read, modify and
/// write back must hold a per-scope lock (see [`super::HistoryMerger`]).
pub trait RecordStore: Send + Sync {
    fn name(&self) -> &str;

    /// Every record in `scope`. A scope with nothing stored yet is empty.
    fn load<'a>(&'a self, scope: &'a str) -> StoreFuture<'a, Vec<EntityRecord>>;

    /// Replace the stored collection for `scope`.
    fn save<'a>(&'a self, scope: &'a str, records: &'a [EntityRecord]) -> StoreFuture<'a, ()>;
}

/// Scopes become directory names, so only a conservative character set is
/// allowed.
pub fn validate_scope(scope: &str) -> Result<(), StoreError> {
    let valid = !scope.is_empty()
        && scope.len() <= 64
        && !scope.starts_with('.')
        && scope
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidScope(scope.to_string()))
    }
}

// ── JSON file store ─────────────────────────────────────────────────────────

/// One pretty-printed JSON array per scope at `<root>/<scope>/<file_name>`.
pub struct JsonFileRecordStore {
    root: PathBuf,
    file_name: String,
}

impl JsonFileRecordStore {
    pub fn new(root: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            file_name: file_name.into(),
        }
    }

    pub fn path_for(&self, scope: &str) -> Result<PathBuf, StoreError> {
        validate_scope(scope)?;
        Ok(self.root.join(scope).join(&self.file_name))
    }

    async fn load_from_disk(&self, scope: &str) -> Result<Vec<EntityRecord>, StoreError> {
        let path = self.path_for(scope)?;
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    async fn save_to_disk(&self, scope: &str, records: &[EntityRecord]) -> Result<(), StoreError> {
        let path = self.path_for(scope)?;
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        tokio::fs::create_dir_all(parent).await?;

        let json = to_json_indented(records)?;
        // Write-then-rename so readers never see a half-written file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!(
            scope,
            records = records.len(),
            path = %path.display(),
            "Saved entity records"
        );
        Ok(())
    }
}

fn to_json_indented(records: &[EntityRecord]) -> Result<Vec<u8>, StoreError> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut serializer)?;
    Ok(out)
}

impl RecordStore for JsonFileRecordStore {
    fn name(&self) -> &str {
        "json-file"
    }

    fn load<'a>(&'a self, scope: &'a str) -> StoreFuture<'a, Vec<EntityRecord>> {
        Box::pin(self.load_from_disk(scope))
    }

    fn save<'a>(&'a self, scope: &'a str, records: &'a [EntityRecord]) -> StoreFuture<'a, ()> {
        Box::pin(self.save_to_disk(scope, records))
    }
}

// ── In-memory store ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryRecordStore {
    scopes: Mutex<HashMap<String, Vec<EntityRecord>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(scope: impl Into<String>, records: Vec<EntityRecord>) -> Self {
        let store = Self::default();
        store.insert_scope(scope, records);
        store
    }

    pub fn insert_scope(&self, scope: impl Into<String>, records: Vec<EntityRecord>) {
        self.scopes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(scope.into(), records);
    }

    fn snapshot(&self, scope: &str) -> Vec<EntityRecord> {
        self.scopes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(scope)
            .cloned()
            .unwrap_or_default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load<'a>(&'a self, scope: &'a str) -> StoreFuture<'a, Vec<EntityRecord>> {
        Box::pin(async move {
            validate_scope(scope)?;
            Ok(self.snapshot(scope))
        })
    }

    fn save<'a>(&'a self, scope: &'a str, records: &'a [EntityRecord]) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            validate_scope(scope)?;
            self.insert_scope(scope, records.to_vec());
            Ok(())
        })
    }
}
