use super::prompt::{DEFAULT_BODY_ZONE, PromptSet};
use crate::llm::{ImageSource, ProviderMessage};
use crate::media::ImageBatch;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationTurn {
    SystemInstruction(String),
    UserRequest {
        text: String,
        images: Vec<ImageSource>,
    },
    ModelExchangeExample(String),
}

impl ConversationTurn {
    pub fn to_provider_message(&self) -> ProviderMessage {
        match self {
            Self::SystemInstruction(text) => ProviderMessage::system(text.clone()),
            Self::UserRequest { text, images } => {
                ProviderMessage::user_with_images(text.clone(), images.iter().cloned())
            }
            Self::ModelExchangeExample(text) => ProviderMessage::assistant(text.clone()),
        }
    }
}

/// The four-turn scripted dialogue sent for one analysis:
/// system instruction, worked-example request, worked-example answer and the
/// live request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    turns: [ConversationTurn; 4],
}

impl Conversation {
    /// Build the dialogue for `batch`. A missing or blank `body_zone` falls
    /// back to [`DEFAULT_BODY_ZONE`].
    pub fn build(prompts: &PromptSet, batch: &ImageBatch, body_zone: Option<&str>) -> Self {
        let body_zone = body_zone
            .map(str::trim)
            .filter(|zone| !zone.is_empty())
            .unwrap_or(DEFAULT_BODY_ZONE);

        let live_images: Vec<ImageSource> = batch
            .images
            .iter()
            .map(|blob| ImageSource::base64(blob.mime_type.clone(), STANDARD.encode(&blob.bytes)))
            .collect();
        let example_images = if prompts.example_images.is_empty() {
            live_images.clone()
        } else {
            prompts.example_images.clone()
        };

        Self {
            turns: [
                ConversationTurn::SystemInstruction(prompts.system_instruction()),
                ConversationTurn::UserRequest {
                    text: prompts.framing.clone(),
                    images: example_images,
                },
                ConversationTurn::ModelExchangeExample(prompts.example_answer.clone()),
                ConversationTurn::UserRequest {
                    text: prompts.live_instruction(body_zone),
                    images: live_images,
                },
            ],
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn to_provider_messages(&self) -> Vec<ProviderMessage> {
        self.turns
            .iter()
            .map(ConversationTurn::to_provider_message)
            .collect()
    }
}
