pub mod analyzer;
pub mod conversation;
pub mod invoker;
pub mod parser;
pub mod prompt;
pub mod result;
pub mod retry;

pub use analyzer::{AnalysisOutcome, AnalysisRequest, Analyzer};
pub use conversation::{Conversation, ConversationTurn};
pub use invoker::InferenceInvoker;
pub use parser::{END_MARKER, START_MARKER, extract_payload, parse_analysis};
pub use prompt::{DEFAULT_BODY_ZONE, PromptSet};
pub use result::{AnalysisResult, AttributeAssessment, MAX_SCORE, PARAMETER_NAMES};
pub use retry::{Attempted, RetryController};
