//! AI provider abstractions and implementations.
//!
//! Handlers only see [`TextProvider`]; the Gemini REST client and the
//! recording mock used by tests both implement it.

pub mod gemini;
pub mod mock;

use crate::services::metrics;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Provider returned no text")]
    EmptyResponse,

    #[error("Provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Request cancelled")]
    Cancelled,
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::NetworkError(_) => "network_error",
            ProviderError::EmptyResponse => "empty_response",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::Cancelled => "cancelled",
        }
    }
}

/// Binary image sent alongside a prompt.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    Other,
}

/// Result of a provider response.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Model output, returned to callers untouched.
    pub text: String,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    pub finish_reason: FinishReason,
}

/// Trait for text generation providers with optional image input.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Provider name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Generate a text reply for `prompt`, optionally looking at `image`.
    async fn generate(
        &self,
        prompt: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Run one generation bounded by `deadline` and abandoned when `cancel` fires.
///
/// Latency and failures are recorded under `operation`.
pub async fn generate_with_deadline(
    provider: &dyn TextProvider,
    operation: &str,
    prompt: &str,
    image: Option<&ImageAttachment>,
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<ProviderResponse, ProviderError> {
    let started = Instant::now();

    let result = tokio::select! {
        _ = cancel.cancelled() => Err(ProviderError::Cancelled),
        outcome = tokio::time::timeout(deadline, provider.generate(prompt, image)) => {
            outcome.unwrap_or(Err(ProviderError::Timeout(deadline)))
        }
    };

    metrics::record_provider_latency(provider.name(), operation, started.elapsed().as_secs_f64());

    match &result {
        Ok(response) => {
            tracing::info!(
                provider = provider.name(),
                operation,
                input_tokens = response.input_tokens,
                output_tokens = response.output_tokens,
                finish_reason = ?response.finish_reason,
                "Provider call completed"
            );
        }
        Err(e) => {
            metrics::record_provider_error(provider.name(), e.kind());
            tracing::warn!(
                provider = provider.name(),
                operation,
                error = %e,
                "Provider call failed"
            );
        }
    }

    result
}
