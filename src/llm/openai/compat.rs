use super::types::{
    ChatRequest, ChatResponse, ContentPart, ImageUrlContent, Message, MessageContent,
};
use crate::error::LlmError;
use crate::llm::scrub::api_error;
use crate::llm::traits::CompletionParams;
use crate::llm::types::{ContentBlock, MessageRole, ProviderMessage};

fn role_name(role: MessageRole) -> &'static str {
    match role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

pub(in crate::llm) fn map_provider_message(provider_message: &ProviderMessage) -> Message {
    let role = role_name(provider_message.role);
    let has_images = provider_message
        .content
        .iter()
        .any(|block| matches!(block, ContentBlock::Image { .. }));

    // Only user turns may carry image parts.
    if has_images && provider_message.role == MessageRole::User {
        let parts = provider_message
            .content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => ContentPart::Text { text: text.clone() },
                ContentBlock::Image { source } => ContentPart::ImageUrl {
                    image_url: ImageUrlContent {
                        url: source.to_data_uri(),
                        detail: "auto",
                    },
                },
            })
            .collect();
        return Message {
            role,
            content: MessageContent::Parts(parts),
        };
    }

    let text = provider_message
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Image { .. } => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    Message {
        role,
        content: MessageContent::Text(text),
    }
}

pub(in crate::llm) fn build_request(
    messages: &[ProviderMessage],
    params: &CompletionParams,
) -> ChatRequest {
    ChatRequest {
        model: params.model.clone(),
        messages: messages.iter().map(map_provider_message).collect(),
        temperature: params.temperature,
        max_tokens: params.max_tokens,
    }
}

pub(in crate::llm) fn extract_text(
    chat_response: &ChatResponse,
    provider_name: &str,
) -> Result<String, LlmError> {
    chat_response
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| LlmError::EmptyResponse {
            provider: provider_name.to_string(),
        })
}

pub(in crate::llm) struct ChatCompletionsEndpoint<'a> {
    pub(in crate::llm) provider_name: &'a str,
    pub(in crate::llm) url: &'a str,
}

pub(in crate::llm) async fn send_chat_completions_json(
    client: &reqwest::Client,
    cached_auth_header: Option<&String>,
    request: &ChatRequest,
    endpoint: ChatCompletionsEndpoint<'_>,
) -> Result<ChatResponse, LlmError> {
    let provider_name = endpoint.provider_name;
    let auth_header = cached_auth_header.ok_or_else(|| LlmError::MissingApiKey {
        provider: provider_name.to_string(),
    })?;

    let response = client
        .post(endpoint.url)
        .header("Authorization", auth_header)
        .json(request)
        .send()
        .await
        .map_err(|error| LlmError::Request {
            provider: provider_name.to_string(),
            message: error.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(api_error(provider_name, response).await);
    }

    response.json().await.map_err(|error| LlmError::Request {
        provider: provider_name.to_string(),
        message: format!("response JSON decode failed: {error}"),
    })
}
