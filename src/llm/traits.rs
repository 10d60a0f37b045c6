use super::types::ProviderMessage;
use crate::error::LlmError;
use std::future::Future;
use std::pin::Pin;

/// Decoding parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "openai").
    fn name(&self) -> &str;

    /// Send one conversation and return the text of the model's reply.
    ///
    /// Implementations must not retry; callers own the retry policy.
    fn complete<'a>(
        &'a self,
        messages: &'a [ProviderMessage],
        params: &'a CompletionParams,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;
}
