#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod analysis;
pub mod auth;
pub mod config;
pub mod error;
pub mod llm;
pub mod media;
pub mod records;
pub mod service;

pub use analysis::{AnalysisResult, Analyzer, AttributeAssessment};
pub use config::Config;
pub use error::{AnalysisError, Result};
