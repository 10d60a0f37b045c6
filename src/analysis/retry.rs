use crate::config::MAX_ATTEMPT_CEILING;
use crate::error::{AnalysisError, ConfigError, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// A value produced by a successful attempt, with the attempt number that
/// produced it (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

/// Re-runs a fallible operation up to a bounded number of times.
///
/// Attempts run strictly one after another with no delay. Only
/// [`AnalysisError::is_retryable`] failures trigger another attempt; any other
/// error ends the run immediately.
#[derive(Debug, Clone, Copy)]
pub struct RetryController {
    max_attempts: u32,
}

impl RetryController {
    pub fn new(max_attempts: u32) -> std::result::Result<Self, ConfigError> {
        if !(1..=MAX_ATTEMPT_CEILING).contains(&max_attempts) {
            return Err(ConfigError::Validation(format!(
                "max_attempts must be between 1 and {MAX_ATTEMPT_CEILING}, got {max_attempts}"
            )));
        }
        Ok(Self { max_attempts })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub async fn run<T, F, Fut>(&self, operation: F) -> Result<Attempted<T>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.run_until_cancelled(&CancellationToken::new(), operation)
            .await
    }

    /// Like [`run`](Self::run), but stops with [`AnalysisError::Cancelled`]
    /// as soon as `cancel` fires, including mid-attempt.
    pub async fn run_until_cancelled<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> Result<Attempted<T>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            if cancel.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(AnalysisError::Cancelled),
                outcome = operation(attempt) => outcome,
            };

            match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "Analysis succeeded after retries");
                    }
                    return Ok(Attempted {
                        value,
                        attempts: attempt,
                    });
                }
                Err(error) if error.is_retryable() => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %error,
                        "Analysis attempt failed"
                    );
                    last_error = error.to_string();
                }
                Err(error) => return Err(error),
            }
        }

        tracing::error!(
            max_attempts = self.max_attempts,
            "Analysis failed on every attempt"
        );
        Err(AnalysisError::ExhaustedRetries {
            attempts: self.max_attempts,
            last_error,
        })
    }
}

impl Default for RetryController {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}
