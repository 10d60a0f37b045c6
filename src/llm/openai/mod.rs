mod compat;
mod types;

use super::http_client::build_provider_client_with_timeout;
use super::traits::{CompletionParams, Provider};
use super::types::ProviderMessage;
use crate::error::LlmError;
use compat::{ChatCompletionsEndpoint, build_request, extract_text, send_chat_completions_json};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

const PROVIDER_NAME: &str = "openai";

/// OpenAI-compatible `/chat/completions` client with vision input.
pub struct OpenAiProvider {
    /// Pre-computed `"Bearer <key>"` header value.
    cached_auth_header: Option<String>,
    completions_url: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout_secs: u64) -> Self {
        Self {
            cached_auth_header: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(|k| format!("Bearer {k}")),
            completions_url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            client: build_provider_client_with_timeout(timeout_secs),
        }
    }

    async fn call_api(
        &self,
        messages: &[ProviderMessage],
        params: &CompletionParams,
    ) -> Result<String, LlmError> {
        let request = build_request(messages, params);
        let chat_response = send_chat_completions_json(
            &self.client,
            self.cached_auth_header.as_ref(),
            &request,
            ChatCompletionsEndpoint {
                provider_name: PROVIDER_NAME,
                url: &self.completions_url,
            },
        )
        .await?;

        if let Some(usage) = &chat_response.usage {
            tracing::debug!(
                provider = PROVIDER_NAME,
                model = chat_response.model.as_deref().unwrap_or(params.model.as_str()),
                input_tokens = usage.prompt_tokens,
                output_tokens = usage.completion_tokens,
                "Completion finished"
            );
        }
        if chat_response
            .choices
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            == Some("length")
        {
            tracing::warn!(
                provider = PROVIDER_NAME,
                max_tokens = params.max_tokens,
                "Completion hit the output token limit"
            );
        }

        extract_text(&chat_response, PROVIDER_NAME)
    }
}

impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn complete<'a>(
        &'a self,
        messages: &'a [ProviderMessage],
        params: &'a CompletionParams,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(self.call_api(messages, params))
    }
}
