use crate::error::LlmError;
use crate::llm::{CompletionParams, Provider, ProviderMessage};
use std::sync::Arc;
use std::time::Duration;

/// Sends a conversation to the provider once, bounded by a wall-clock timeout.
#[derive(Clone)]
pub struct InferenceInvoker {
    provider: Arc<dyn Provider>,
    params: CompletionParams,
    timeout: Duration,
}

impl InferenceInvoker {
    pub fn new(provider: Arc<dyn Provider>, params: CompletionParams, timeout: Duration) -> Self {
        Self {
            provider,
            params,
            timeout,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn params(&self) -> &CompletionParams {
        &self.params
    }

    pub async fn invoke(&self, messages: &[ProviderMessage]) -> Result<String, LlmError> {
        match tokio::time::timeout(self.timeout, self.provider.complete(messages, &self.params))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout {
                provider: self.provider.name().to_string(),
                secs: self.timeout.as_secs(),
            }),
        }
    }
}
