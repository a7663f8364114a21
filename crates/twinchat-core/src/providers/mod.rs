//! LLM Provider implementations
//!
//! This module contains provider abstractions and implementations for various LLM APIs.
//!
//! ## Architecture
//!
//! Hosted providers use the `genai` crate, which handles:
//! - Streaming SSE parsing
//! - Provider-specific protocols (OpenAI, Anthropic, Gemini, etc.)
//! - Tool calling
//! - Error handling
//!
//! Providers not natively in genai (Azure, OpenRouter, Mistral) are handled via
//! genai's `ServiceTargetResolver` using OpenAI-compatible protocols.
//!
//! The `MockProvider` is the stub model for tests and the offline `mock`
//! provider of the CLI.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;

// Core traits and types
pub use traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
pub use error::{ProviderError, ProviderResult};

// The main provider - handles all hosted LLM providers via genai
pub use genai_provider::GenaiProvider;
pub use genai_adapter::{is_genai_native, is_genai_supported, provider_api_key_env, ProviderConfig};

// Mock provider for testing and offline use
pub use mock::{MockProvider, MockConfig, MockMode, MockRoute};

use crate::logging::Logger;
use std::sync::Arc;

/// Create a provider for the given provider ID
///
/// `mock` yields the keyword-routing [`MockProvider`]; every other ID goes to
/// [`GenaiProvider`]. Unknown IDs fall back to genai's OpenAI adapter so
/// custom OpenAI-compatible endpoints work.
pub fn create_provider(provider_id: &str, logger: Arc<dyn Logger>) -> Arc<dyn Provider> {
    match provider_id.to_lowercase().as_str() {
        "mock" => Arc::new(MockProvider::portfolio(logger)),
        _ => {
            if !GenaiProvider::supports(provider_id) {
                logger.warn(&format!(
                    "[Providers] Unknown provider '{}', assuming an OpenAI-compatible endpoint",
                    provider_id
                ));
            }
            Arc::new(GenaiProvider::new(provider_id, logger))
        }
    }
}

/// List all supported provider IDs
pub fn supported_providers() -> Vec<&'static str> {
    vec![
        // Native genai providers
        "openai",
        "anthropic",
        "gemini",
        "ollama",
        "groq",
        "xai",
        "deepseek",
        "cohere",
        "fireworks",
        "together",
        "nebius",
        "mimo",
        "zai",
        "bigmodel",
        // OpenAI-compatible providers via resolver
        "azure",
        "openrouter",
        "mistral",
        // Offline keyword router
        "mock",
    ]
}
