//! GenaiProvider - Unified provider using the genai crate
//!
//! This provider handles all genai-supported providers (OpenAI, Anthropic, Gemini, etc.)
//! as well as OpenAI-compatible providers (Azure, OpenRouter, Mistral) via the
//! ServiceTargetResolver.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::sync::Arc;

use genai::chat::{ChatRequest, ChatStreamEvent};

use crate::logging::Logger;
use crate::types::{
    CancellationToken, ChatMessage, DefaultModel, ModelCapabilities, ProviderMetadata, ToolChoice,
};

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_event, is_genai_supported, to_genai_messages, to_genai_options,
    to_genai_tools, ProviderConfig,
};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};

/// Unified provider using genai for all supported LLM APIs
pub struct GenaiProvider {
    /// Provider identifier
    provider_id: String,
    /// Logger for debug output
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    /// Create a new GenaiProvider
    pub fn new(provider_id: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            provider_id: provider_id.into(),
            logger,
        }
    }

    /// Check if this provider can handle the given provider ID
    pub fn supports(provider_id: &str) -> bool {
        is_genai_supported(provider_id)
    }

    /// Model used when settings name none for this provider
    pub fn default_model(&self) -> &'static str {
        match self.provider_id.as_str() {
            "openai" | "azure" => "gpt-4o-mini",
            "anthropic" => "claude-3-5-haiku-latest",
            "gemini" => "gemini-2.0-flash",
            "ollama" => "llama3.2",
            "groq" => "llama-3.3-70b-versatile",
            "xai" => "grok-2",
            "deepseek" => "deepseek-chat",
            "cohere" => "command-r",
            "mistral" => "mistral-small-latest",
            "openrouter" => "openai/gpt-4o-mini",
            "fireworks" => "accounts/fireworks/models/llama-v3p1-8b-instruct",
            "together" => "meta-llama/Llama-3.3-70B-Instruct-Turbo",
            _ => "gpt-4o-mini",
        }
    }

    /// Extract model name from a model string (e.g., "openai/gpt-4" -> "gpt-4")
    pub fn extract_model_name(model: &str) -> &str {
        model.split_once('/').map_or(model, |(_, name)| name)
    }
}

#[async_trait]
impl Provider for GenaiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    fn default_api_base(&self) -> &str {
        match self.provider_id.as_str() {
            "openai" => "https://api.openai.com/v1/",
            "anthropic" => "https://api.anthropic.com/",
            "gemini" => "https://generativelanguage.googleapis.com/",
            "ollama" => "http://localhost:11434/",
            "groq" => "https://api.groq.com/openai/v1/",
            "xai" => "https://api.x.ai/v1/",
            "deepseek" => "https://api.deepseek.com/",
            "cohere" => "https://api.cohere.ai/",
            "fireworks" => "https://api.fireworks.ai/inference/v1/",
            "together" => "https://api.together.xyz/v1/",
            "openrouter" => "https://openrouter.ai/api/v1/",
            "mistral" => "https://api.mistral.ai/v1/",
            "azure" => "https://your-resource.openai.azure.com/",
            _ => "https://api.openai.com/v1/",
        }
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            id: self.provider_id.clone(),
            display_name: self.provider_id.clone(),
            default_api_base: self.default_api_base().to_string(),
            requires_api_key: !matches!(self.provider_id.as_str(), "ollama"),
            default_models: vec![DefaultModel {
                id: self.default_model().to_string(),
                name: self.default_model().to_string(),
                context_length: 128000,
                capabilities: ModelCapabilities::full(),
            }],
        }
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model_config: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        self.logger.info(&format!(
            "[GenaiProvider] stream_chat called: provider={}, model={}",
            self.provider_id, model_config.model
        ));

        let client = create_client(&ProviderConfig::for_request(&self.provider_id, &model_config));

        let mut chat_req = ChatRequest::new(to_genai_messages(messages));

        // Tool choice `none` is expressed by not offering tools
        match (&options.tools, options.tool_choice) {
            (Some(_), Some(ToolChoice::None)) => {
                self.logger.debug("[GenaiProvider] Tool choice is none, tools withheld");
            }
            (Some(tools), choice) => {
                if choice == Some(ToolChoice::Required) {
                    self.logger.debug("[GenaiProvider] Tool choice 'required' is treated as auto");
                }
                chat_req = chat_req.with_tools(to_genai_tools(tools.clone()));
            }
            (None, _) => {}
        }

        let genai_options = to_genai_options(&options);
        let model_name = Self::extract_model_name(&model_config.model);

        self.logger.info(&format!(
            "[GenaiProvider] Starting stream for model: {}",
            model_name
        ));

        let chat_stream = client
            .exec_chat_stream(model_name, chat_req, Some(&genai_options))
            .await
            .map_err(|e| ProviderError::api_error(&self.provider_id, 500, e.to_string()))?;

        self.logger.info("[GenaiProvider] Stream started successfully");

        let cancel = cancel_token.clone();
        let logger = Arc::clone(&self.logger);
        let provider_id = self.provider_id.clone();

        let converted = chat_stream.stream.map(move |result| {
            if cancel.is_cancelled() {
                logger.info("[GenaiProvider] Stream cancelled");
                return vec![Err(ProviderError::Cancelled)];
            }

            match result {
                Ok(event) => {
                    match &event {
                        ChatStreamEvent::Start => {
                            logger.debug("[GenaiProvider] Stream event: Start");
                        }
                        ChatStreamEvent::Chunk(c) => {
                            logger.debug(&format!(
                                "[GenaiProvider] Stream event: Chunk ({} chars)",
                                c.content.len()
                            ));
                        }
                        ChatStreamEvent::ToolCallChunk(_) => {
                            logger.debug("[GenaiProvider] Stream event: ToolCallChunk");
                        }
                        ChatStreamEvent::End(_) => {
                            logger.info("[GenaiProvider] Stream event: End");
                        }
                        _ => {}
                    }

                    from_genai_event(event)
                }
                Err(e) => {
                    logger.error(&format!("[GenaiProvider] Stream error: {}", e));
                    vec![Err(ProviderError::api_error(&provider_id, 500, e.to_string()))]
                }
            }
        });

        Ok(Box::pin(converted.flat_map(stream::iter)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    #[test]
    fn test_extract_model_name() {
        assert_eq!(GenaiProvider::extract_model_name("openai/gpt-4"), "gpt-4");
        assert_eq!(
            GenaiProvider::extract_model_name("anthropic/claude-3-opus"),
            "claude-3-opus"
        );
        assert_eq!(GenaiProvider::extract_model_name("gpt-4"), "gpt-4");
    }

    #[test]
    fn test_supports() {
        assert!(GenaiProvider::supports("openai"));
        assert!(GenaiProvider::supports("anthropic"));
        assert!(GenaiProvider::supports("azure"));
        assert!(GenaiProvider::supports("openrouter"));
        assert!(!GenaiProvider::supports("unknown_provider"));
    }

    #[test]
    fn test_metadata() {
        let provider = GenaiProvider::new("openai", Arc::new(NoOpLogger));
        let meta = provider.metadata();
        assert_eq!(meta.id, "openai");
        assert!(meta.requires_api_key);
        assert!(meta.supports_tools());

        let ollama = GenaiProvider::new("ollama", Arc::new(NoOpLogger));
        assert!(!ollama.metadata().requires_api_key);
    }

    #[test]
    fn test_default_model_is_a_real_model() {
        let anthropic = GenaiProvider::new("anthropic", Arc::new(NoOpLogger));
        assert_eq!(
            anthropic.metadata().default_models[0].id,
            "claude-3-5-haiku-latest"
        );

        let custom = GenaiProvider::new("my-endpoint", Arc::new(NoOpLogger));
        assert_eq!(custom.default_model(), "gpt-4o-mini");
    }
}
