use reqwest::Client;
use std::time::Duration;

/// Shared client settings for inference endpoints; `timeout_secs` bounds the
/// whole request including the model's generation time.
pub fn build_provider_client_with_timeout(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|error| {
            tracing::warn!("Falling back to default HTTP client: {error}");
            Client::new()
        })
}
