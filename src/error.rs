use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for the analysis pipeline.
///
/// Variants map one-to-one onto the failure classes of the pipeline so that
/// callers (CLI, an HTTP boundary) can decide between client and server
/// errors. The binary layer wraps these in `anyhow` for context chains.
#[derive(Debug, Error)]
pub enum AnalysisError {
    // ── Image payloads ──────────────────────────────────────────────────
    #[error("decode: {0}")]
    Decode(String),

    // ── Inference service ───────────────────────────────────────────────
    #[error("inference: {0}")]
    Inference(#[from] LlmError),

    // ── Model output contract ───────────────────────────────────────────
    #[error("format: {0}")]
    Format(String),

    #[error("schema: {0}")]
    Schema(String),

    #[error("no valid result after {attempts} attempt(s); last error: {last_error}")]
    ExhaustedRetries { attempts: u32, last_error: String },

    // ── Access ──────────────────────────────────────────────────────────
    #[error("invalid credentials for user {username}")]
    Unauthorized { username: String },

    // ── Records ─────────────────────────────────────────────────────────
    #[error("entity {entity_id} not found in scope {scope}")]
    NotFound { scope: String, entity_id: String },

    #[error("store: {0}")]
    Store(#[from] StoreError),

    // ── Config ──────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    /// Failures that another invoke-and-parse cycle may recover from.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Inference(_) | Self::Format(_) | Self::Schema(_)
        )
    }

    /// Failures caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Decode(_) | Self::Unauthorized { .. } | Self::NotFound { .. }
        )
    }
}

// ─── LLM / Provider errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} returned {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("provider {provider} timed out after {secs}s")]
    Timeout { provider: String, secs: u64 },

    #[error("provider {provider} API key not set")]
    MissingApiKey { provider: String },

    #[error("provider {provider} returned no text")]
    EmptyResponse { provider: String },
}

// ─── Store errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid scope '{0}'")]
    InvalidScope(String),

    #[error("corrupt record file {path}: {message}")]
    Corrupt { path: String, message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;
