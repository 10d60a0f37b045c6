use super::conversation::Conversation;
use super::invoker::InferenceInvoker;
use super::parser::parse_analysis;
use super::prompt::PromptSet;
use super::result::AnalysisResult;
use super::retry::RetryController;
use crate::config::Config;
use crate::error::{AnalysisError, Result};
use crate::llm::{CompletionParams, OpenAiProvider, Provider};
use crate::media::{AuditImageStore, ImageMaterializer};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One analysis request as received from a caller.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Base64 image payloads, optionally `data:` URI prefixed.
    pub images: Vec<String>,
    /// Body zone label interpolated into the live instruction.
    pub body_zone: Option<String>,
    /// Overrides the analyzer's configured attempt budget.
    pub max_attempts: Option<u32>,
}

impl AnalysisRequest {
    pub fn new(images: Vec<String>) -> Self {
        Self {
            images,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_body_zone(mut self, body_zone: impl Into<String>) -> Self {
        self.body_zone = Some(body_zone.into());
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub correlation_id: String,
    pub attempts: u32,
    pub result: AnalysisResult,
}

/// Decode images, build the scripted conversation and run invoke-and-parse
/// cycles until a valid result appears or the attempt budget runs out.
pub struct Analyzer {
    materializer: ImageMaterializer,
    invoker: InferenceInvoker,
    prompts: PromptSet,
    retry: RetryController,
    default_body_zone: Option<String>,
    audit: Option<AuditImageStore>,
}

impl Analyzer {
    pub fn new(invoker: InferenceInvoker, retry: RetryController) -> Self {
        Self {
            materializer: ImageMaterializer::default(),
            invoker,
            prompts: PromptSet::default(),
            retry,
            default_body_zone: None,
            audit: None,
        }
    }

    /// Wire an analyzer against the configured OpenAI-compatible endpoint.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider: Arc<dyn Provider> = Arc::new(OpenAiProvider::new(
            &config.provider.base_url,
            config.provider.api_key.as_deref(),
            config.provider.request_timeout_secs,
        ));
        let params = CompletionParams {
            model: config.provider.model.clone(),
            temperature: config.provider.temperature,
            max_tokens: config.provider.max_tokens,
        };
        let invoker = InferenceInvoker::new(
            provider,
            params,
            Duration::from_secs(config.provider.request_timeout_secs),
        );
        let retry = RetryController::new(config.analysis.max_attempts)?;

        let mut analyzer =
            Self::new(invoker, retry).with_default_body_zone(&config.analysis.default_body_zone);
        if config.analysis.save_images {
            analyzer = analyzer.with_audit_store(AuditImageStore::new(config.analysis.images_path()));
        }
        Ok(analyzer)
    }

    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    #[must_use]
    pub fn with_materializer(mut self, materializer: ImageMaterializer) -> Self {
        self.materializer = materializer;
        self
    }

    #[must_use]
    pub fn with_audit_store(mut self, store: AuditImageStore) -> Self {
        self.audit = Some(store);
        self
    }

    /// Label used when a request carries none. Blank means the built-in default.
    #[must_use]
    pub fn with_default_body_zone(mut self, body_zone: &str) -> Self {
        let body_zone = body_zone.trim();
        self.default_body_zone = (!body_zone.is_empty()).then(|| body_zone.to_string());
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.retry.max_attempts()
    }

    /// Analyze `images` with the configured attempt budget.
    pub async fn analyze(
        &self,
        images: &[String],
        body_zone: Option<&str>,
    ) -> Result<AnalysisResult> {
        let request = AnalysisRequest {
            images: images.to_vec(),
            body_zone: body_zone.map(str::to_string),
            max_attempts: None,
        };
        self.run(&request, &CancellationToken::new())
            .await
            .map(|outcome| outcome.result)
    }

    pub async fn run(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisOutcome> {
        let retry = match request.max_attempts {
            Some(max_attempts) => RetryController::new(max_attempts)?,
            None => self.retry,
        };

        let batch = self.materializer.materialize(&request.images)?;
        let correlation_id = batch.correlation_id.clone();

        if let Some(audit) = &self.audit
            && let Err(e) = audit.persist(&batch).await
        {
            tracing::warn!(
                correlation_id = correlation_id.as_str(),
                "Failed to save audit images: {e:#}"
            );
        }

        let body_zone = request
            .body_zone
            .as_deref()
            .or(self.default_body_zone.as_deref());
        let messages = Conversation::build(&self.prompts, &batch, body_zone).to_provider_messages();

        tracing::info!(
            correlation_id = correlation_id.as_str(),
            provider = self.invoker.provider_name(),
            model = self.invoker.params().model.as_str(),
            images = batch.len(),
            max_attempts = retry.max_attempts(),
            "Starting analysis"
        );

        let attempted = retry
            .run_until_cancelled(cancel, |attempt| {
                let messages = &messages;
                let correlation_id = correlation_id.as_str();
                async move {
                    tracing::debug!(correlation_id, attempt, "Invoking model");
                    let raw = self.invoker.invoke(messages).await?;
                    parse_analysis(&raw)
                }
            })
            .await
            .inspect_err(|e| {
                if !matches!(e, AnalysisError::Cancelled) {
                    tracing::error!(
                        correlation_id = correlation_id.as_str(),
                        "Analysis failed: {e}"
                    );
                }
            })?;

        tracing::info!(
            correlation_id = correlation_id.as_str(),
            attempts = attempted.attempts,
            "Analysis complete"
        );

        Ok(AnalysisOutcome {
            correlation_id,
            attempts: attempted.attempts,
            result: attempted.value,
        })
    }
}
