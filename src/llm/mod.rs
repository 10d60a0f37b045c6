// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod http_client;
pub mod scrub;
pub mod traits;
pub mod types;

// ── Provider implementations ────────────────────────────────────────────────
pub mod openai;

// ── Re-exports ──────────────────────────────────────────────────────────────
pub use http_client::build_provider_client_with_timeout;
pub use scrub::{api_error, sanitize_api_error, scrub_secret_patterns};
pub use traits::{CompletionParams, Provider};
pub use types::{ContentBlock, ImageSource, MessageRole, ProviderMessage};

pub use openai::OpenAiProvider;
