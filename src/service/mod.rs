//! End-to-end request flow: authenticate, analyze, record.


use crate::analysis::{AnalysisOutcome, AnalysisRequest, Analyzer};
use crate::auth::{CredentialStore, FileCredentialStore};
use crate::config::Config;
use crate::error::{AnalysisError, Result};
use crate::records::{HistoryEntry, HistoryMerger, JsonFileRecordStore, RecordStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One authenticated analysis request for an entity in the caller's scope.
#[derive(Debug, Clone)]
pub struct ServiceRequest {
    pub username: String,
    pub password: String,
    pub entity_id: String,
    pub images: Vec<String>,
    pub body_zone: Option<String>,
    /// Falls back to the analyzer's configured ceiling (`[analysis] max_attempts`).
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ServiceResponse {
    pub outcome: AnalysisOutcome,
    pub entry: HistoryEntry,
}

pub struct AnalysisService {
    credentials: Arc<dyn CredentialStore>,
    analyzer: Analyzer,
    merger: HistoryMerger,
}

impl AnalysisService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        analyzer: Analyzer,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            credentials,
            analyzer,
            merger: HistoryMerger::new(records),
        }
    }

    /// File-backed credentials and records rooted at the configured directories.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = Arc::new(FileCredentialStore::new(config.storage.users_path()));
        let records = Arc::new(JsonFileRecordStore::new(
            config.storage.data_path(),
            config.storage.records_file.clone(),
        ));
        Ok(Self::new(credentials, Analyzer::from_config(config)?, records))
    }

    pub fn merger(&self) -> &HistoryMerger {
        &self.merger
    }

    pub async fn handle(&self, request: &ServiceRequest) -> Result<ServiceResponse> {
        self.handle_until_cancelled(request, &CancellationToken::new())
            .await
    }

    /// Verify credentials, analyze, then append to the entity's history in
    /// the caller's scope. Nothing is written once `cancel` has fired.
    pub async fn handle_until_cancelled(
        &self,
        request: &ServiceRequest,
        cancel: &CancellationToken,
    ) -> Result<ServiceResponse> {
        let username = request.username.as_str();
        if !self.credentials.verify(username, &request.password).await {
            tracing::warn!(username, "Rejected analysis request");
            return Err(AnalysisError::Unauthorized {
                username: username.to_string(),
            });
        }

        let analysis = AnalysisRequest {
            images: request.images.clone(),
            body_zone: request.body_zone.clone(),
            max_attempts: request.max_attempts,
        };
        let outcome = self.analyzer.run(&analysis, cancel).await?;

        if cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }
        let entry = self
            .merger
            .merge(username, &request.entity_id, &outcome.result)
            .await?;

        tracing::info!(
            correlation_id = outcome.correlation_id.as_str(),
            scope = username,
            entity_id = request.entity_id.as_str(),
            attempts = outcome.attempts,
            "Analysis recorded"
        );
        Ok(ServiceResponse { outcome, entry })
    }
}
