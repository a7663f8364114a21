//! Adapter between twinchat types and genai types
//!
//! Conversion functions between our types and genai's, so the hosted
//! providers can use genai's streaming and protocol implementations.
//!
//! Auth: an explicit key from [`ProviderModelConfig`] wins; otherwise the key is
//! read from the provider's conventional environment variable.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatRole as GenaiRole,
    ChatStreamEvent, MessageContent as GenaiContent, Tool as GenaiTool,
    ToolCall as GenaiToolCall,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};

use crate::types::{ChatMessage, MessageRole, StreamChunk, Tool, ToolCall};

use super::error::ProviderError;
use super::traits::{ProviderModelConfig, StreamChatOptions};

// ============================================================================
// Message Conversion: twinchat -> genai
// ============================================================================

/// Convert a MessageRole to genai ChatRole
///
/// Tool results are replayed as assistant turns; see [`to_genai_message`].
pub fn to_genai_role(role: MessageRole) -> GenaiRole {
    match role {
        MessageRole::System => GenaiRole::System,
        MessageRole::User => GenaiRole::User,
        MessageRole::Assistant | MessageRole::Tool => GenaiRole::Assistant,
    }
}

/// Convert a ChatMessage to genai ChatMessage
///
/// History only ever carries a tool invocation followed by its result, and
/// the model never gets a second round within a turn, so both are replayed as
/// plain assistant text rather than provider-specific tool messages.
pub fn to_genai_message(msg: ChatMessage) -> GenaiMessage {
    let text = match msg.role {
        MessageRole::Tool => format!(
            "[Tool result for {}]: {}",
            msg.tool_call_id.as_deref().unwrap_or("unknown"),
            msg.flatten_text()
        ),
        _ => msg.flatten_text(),
    };
    let content = GenaiContent::from(text);

    match to_genai_role(msg.role) {
        GenaiRole::System => GenaiMessage::system(content),
        GenaiRole::User => GenaiMessage::user(content),
        _ => GenaiMessage::assistant(content),
    }
}

/// Convert a vector of messages to genai messages
pub fn to_genai_messages(messages: Vec<ChatMessage>) -> Vec<GenaiMessage> {
    messages.into_iter().map(to_genai_message).collect()
}

// ============================================================================
// Tool Conversion: twinchat -> genai
// ============================================================================

/// Convert a Tool to genai Tool
pub fn to_genai_tool(tool: Tool) -> GenaiTool {
    let mut genai_tool = GenaiTool::new(&tool.name).with_description(&tool.description);

    if let Some(schema) = tool.input_schema {
        genai_tool = genai_tool.with_schema(schema);
    }

    genai_tool
}

/// Convert tools to genai tools
pub fn to_genai_tools(tools: Vec<Tool>) -> Vec<GenaiTool> {
    tools.into_iter().map(to_genai_tool).collect()
}

// ============================================================================
// Options Conversion: twinchat -> genai
// ============================================================================

/// Convert StreamChatOptions to genai ChatOptions
pub fn to_genai_options(options: &StreamChatOptions) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = options.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }

    if let Some(max_tokens) = options.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    // Capture tool calls in stream so we can return them
    genai_opts = genai_opts.with_capture_tool_calls(true);

    genai_opts
}

// ============================================================================
// Response Conversion: genai -> twinchat
// ============================================================================

/// Convert genai ToolCall to our ToolCall
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    ToolCall::new(tc.call_id.clone(), tc.fn_name.clone(), tc.fn_arguments.clone())
}

/// Convert a genai stream event to zero or more StreamChunks
///
/// Every captured tool call is forwarded; choosing among several is the
/// orchestrator's job.
pub fn from_genai_event(event: ChatStreamEvent) -> Vec<Result<StreamChunk, ProviderError>> {
    match event {
        ChatStreamEvent::Chunk(chunk) if chunk.content.is_empty() => vec![],
        ChatStreamEvent::Chunk(chunk) => vec![Ok(StreamChunk::text(chunk.content))],
        ChatStreamEvent::ToolCallChunk(chunk) => vec![Ok(StreamChunk::tool_call_delta(
            chunk.tool_call.call_id,
            Some(chunk.tool_call.fn_name),
            Some(chunk.tool_call.fn_arguments.to_string()),
        ))],
        ChatStreamEvent::End(end) => end
            .captured_tool_calls()
            .map(|calls| {
                calls
                    .iter()
                    .map(|tc| Ok(StreamChunk::tool_call(from_genai_tool_call(tc))))
                    .collect()
            })
            .unwrap_or_default(),
        ChatStreamEvent::Start
        | ChatStreamEvent::ReasoningChunk(_)
        | ChatStreamEvent::ThoughtSignatureChunk(_) => vec![],
    }
}

// ============================================================================
// Provider Resolution
// ============================================================================

/// Provider configuration for routing
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier (e.g., "openai", "azure", "openrouter")
    pub provider: String,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

impl ProviderConfig {
    /// Routing config for `provider` with the request's key and endpoint
    pub fn for_request(provider: impl Into<String>, model: &ProviderModelConfig) -> Self {
        Self {
            provider: provider.into(),
            api_key: model.api_key.clone(),
            api_base: model.api_base.clone(),
        }
    }
}

// ============================================================================
// Provider to API Key Variable Mapping
// ============================================================================

/// Environment variable conventionally holding a provider's API key
pub fn provider_api_key_env(provider: &str) -> String {
    match provider.to_lowercase().as_str() {
        "openai" => "OPENAI_API_KEY".to_string(),
        "anthropic" => "ANTHROPIC_API_KEY".to_string(),
        "gemini" | "google" => "GEMINI_API_KEY".to_string(),
        "groq" => "GROQ_API_KEY".to_string(),
        "xai" => "XAI_API_KEY".to_string(),
        "deepseek" => "DEEPSEEK_API_KEY".to_string(),
        "cohere" => "COHERE_API_KEY".to_string(),
        "fireworks" => "FIREWORKS_API_KEY".to_string(),
        "together" => "TOGETHER_API_KEY".to_string(),
        "azure" => "AZURE_OPENAI_API_KEY".to_string(),
        "openrouter" => "OPENROUTER_API_KEY".to_string(),
        "mistral" => "MISTRAL_API_KEY".to_string(),
        other => format!("{}_API_KEY", other.to_uppercase().replace('-', "_")),
    }
}

/// Environment variable for a genai AdapterKind
pub fn adapter_kind_api_key_env(adapter: AdapterKind) -> String {
    match adapter {
        AdapterKind::OpenAI => "OPENAI_API_KEY".to_string(),
        AdapterKind::Anthropic => "ANTHROPIC_API_KEY".to_string(),
        AdapterKind::Gemini => "GEMINI_API_KEY".to_string(),
        AdapterKind::Ollama => "OLLAMA_API_KEY".to_string(),
        AdapterKind::Groq => "GROQ_API_KEY".to_string(),
        AdapterKind::Xai => "XAI_API_KEY".to_string(),
        AdapterKind::DeepSeek => "DEEPSEEK_API_KEY".to_string(),
        AdapterKind::Cohere => "COHERE_API_KEY".to_string(),
        AdapterKind::Fireworks => "FIREWORKS_API_KEY".to_string(),
        AdapterKind::Together => "TOGETHER_API_KEY".to_string(),
        _ => format!("{:?}_API_KEY", adapter).to_uppercase(),
    }
}

// ============================================================================
// Client Creation with Custom Auth
// ============================================================================

/// Create a genai Client with custom auth and endpoint resolution
pub fn create_client(config: &ProviderConfig) -> Client {
    let auth_provider = config.provider.clone();
    let auth_explicit_key = config.api_key.clone();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let provider = auth_provider.clone();
            let explicit_key = auth_explicit_key.clone();
            let adapter_kind = model_iden.adapter_kind;

            Box::pin(async move {
                if let Some(key) = explicit_key {
                    return Ok(Some(AuthData::from_single(key)));
                }

                let var = if provider.is_empty() {
                    adapter_kind_api_key_env(adapter_kind)
                } else {
                    provider_api_key_env(&provider)
                };

                // None lets genai handle keyless providers such as Ollama
                Ok(std::env::var(var)
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .map(AuthData::from_single))
            })
        },
    );

    let target_provider = config.provider.to_lowercase();
    let target_api_base = config.api_base.clone();

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let ServiceTarget { ref model, .. } = target;
            let custom = target_api_base.as_ref().map(|u| Endpoint::from_owned(u.clone()));

            // OpenAI-compatible providers get a fixed endpoint; anything else
            // keeps genai's routing unless a custom api_base was configured
            let (endpoint, adapter_kind) = match target_provider.as_str() {
                "azure" => (
                    custom.unwrap_or_else(|| Endpoint::from_static("https://your-resource.openai.azure.com/")),
                    AdapterKind::OpenAI,
                ),
                "openrouter" => (
                    custom.unwrap_or_else(|| Endpoint::from_static("https://openrouter.ai/api/v1/")),
                    AdapterKind::OpenAI,
                ),
                "mistral" => (
                    custom.unwrap_or_else(|| Endpoint::from_static("https://api.mistral.ai/v1/")),
                    AdapterKind::OpenAI,
                ),
                _ => match custom {
                    Some(ep) => (ep, model.adapter_kind),
                    None => return Ok(target),
                },
            };

            let resolved_model = ModelIden::new(adapter_kind, model.model_name.clone());

            Ok(ServiceTarget {
                endpoint,
                auth: target.auth, // Auth is handled by AuthResolver
                model: resolved_model,
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}

/// Check if a provider is natively supported by genai
pub fn is_genai_native(provider: &str) -> bool {
    matches!(
        provider.to_lowercase().as_str(),
        "openai"
            | "anthropic"
            | "gemini"
            | "ollama"
            | "groq"
            | "xai"
            | "deepseek"
            | "cohere"
            | "fireworks"
            | "together"
            | "nebius"
            | "mimo"
            | "zai"
            | "bigmodel"
    )
}

/// Check if a provider can be handled by genai (native or via OpenAI-compat)
pub fn is_genai_supported(provider: &str) -> bool {
    is_genai_native(provider)
        || matches!(
            provider.to_lowercase().as_str(),
            "azure" | "openrouter" | "mistral"
        )
}
