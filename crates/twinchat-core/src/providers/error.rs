//! Provider error types

use thiserror::Error;

/// Errors that can occur during provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Missing API key
    #[error("API key is required for {provider}")]
    MissingApiKey { provider: String },

    /// API request failed
    #[error("{provider} API error ({status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request was cancelled
    #[error("Request cancelled")]
    Cancelled,

    /// Stream ended unexpectedly
    #[error("Stream ended unexpectedly")]
    StreamEnded,

    /// The model finished without producing any output
    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: String },

    /// Invalid response from provider
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// Rate limited
    #[error("{provider} rate limited: {message}")]
    RateLimited { provider: String, message: String },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Create an API error
    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a missing API key error
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a rate limited error
    pub fn rate_limited(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an empty response error
    pub fn empty_response(provider: impl Into<String>) -> Self {
        Self::EmptyResponse {
            provider: provider.into(),
        }
    }

    /// Whether retrying the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::ApiError { status, .. } => *status >= 500 || *status == 408,
            ProviderError::RateLimited { .. }
            | ProviderError::EmptyResponse { .. }
            | ProviderError::StreamEnded
            | ProviderError::Other(_) => true,
            ProviderError::MissingApiKey { .. }
            | ProviderError::Json(_)
            | ProviderError::Cancelled
            | ProviderError::InvalidResponse { .. } => false,
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(ProviderError::api_error("openai", 503, "overloaded").is_retryable());
        assert!(ProviderError::rate_limited("groq", "slow down").is_retryable());
        assert!(!ProviderError::api_error("openai", 401, "bad key").is_retryable());
        assert!(!ProviderError::missing_api_key("anthropic").is_retryable());
        assert!(ProviderError::empty_response("mock").is_retryable());
        assert!(!ProviderError::Cancelled.is_retryable());
    }

    #[test]
    fn test_display() {
        let err = ProviderError::api_error("openai", 500, "boom");
        assert_eq!(err.to_string(), "openai API error (500): boom");
    }
}
