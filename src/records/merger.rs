use super::store::RecordStore;
use super::types::{EntityRecord, HistoryEntry};
use crate::analysis::AnalysisResult;
use crate::error::{AnalysisError, Result, StoreError};
use chrono::Local;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Appends analysis results to an entity's history.
///
/// Each merge is a load-modify-save of the whole scope, serialized per scope
/// so concurrent merges into the same scope never lose an append. A scope's
/// lock lives only while some merge holds or waits on it.
pub struct HistoryMerger {
    store: Arc<dyn RecordStore>,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl HistoryMerger {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    fn scope_lock(&self, scope: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut guard = self
            .locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard
            .entry(scope.to_owned())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drop the scope's lock once no merge references it.
    fn release_scope_lock(&self, scope: &str) {
        let mut guard = self
            .locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if guard.get(scope).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            guard.remove(scope);
        }
    }

    #[cfg(test)]
    fn tracked_scopes(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Append `result` with the current local time to `entity_id`'s history.
    ///
    /// An unknown entity leaves the store untouched and yields
    /// [`AnalysisError::NotFound`].
    pub async fn merge(
        &self,
        scope: &str,
        entity_id: &str,
        result: &AnalysisResult,
    ) -> Result<HistoryEntry> {
        let scope_lock = self.scope_lock(scope);
        let merged = {
            let _guard = scope_lock.lock().await;
            self.merge_locked(scope, entity_id, result).await
        };
        drop(scope_lock);
        self.release_scope_lock(scope);
        merged
    }

    async fn merge_locked(
        &self,
        scope: &str,
        entity_id: &str,
        result: &AnalysisResult,
    ) -> Result<HistoryEntry> {
        let mut records = self.store.load(scope).await?;
        let Some(record) = records.iter_mut().find(|r| r.has_id(entity_id)) else {
            tracing::warn!(scope, entity_id, "Entity not found, history unchanged");
            return Err(AnalysisError::NotFound {
                scope: scope.to_string(),
                entity_id: entity_id.to_string(),
            });
        };

        let entry = HistoryEntry::new(result, Local::now()).map_err(StoreError::from)?;
        record.push_history(entry.clone());
        let history_len = record.history().len();

        self.store.save(scope, &records).await?;

        tracing::info!(
            scope,
            entity_id,
            entries = history_len,
            store = self.store.name(),
            "Appended analysis to history"
        );
        Ok(entry)
    }

    /// Stored history for `entity_id`, oldest first.
    pub async fn history(&self, scope: &str, entity_id: &str) -> Result<Vec<HistoryEntry>> {
        let records = self.store.load(scope).await?;
        records
            .into_iter()
            .find(|r| r.has_id(entity_id))
            .map(EntityRecord::into_history)
            .ok_or_else(|| AnalysisError::NotFound {
                scope: scope.to_string(),
                entity_id: entity_id.to_string(),
            })
    }
}
