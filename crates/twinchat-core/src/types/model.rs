//! Provider and model metadata types

use serde::{Deserialize, Serialize};

/// Model capabilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelCapabilities {
    /// Whether the model supports tool/function calling
    #[serde(default)]
    pub tool_calling: bool,
    /// Whether the model supports streaming
    #[serde(default)]
    pub streaming: bool,
}

impl ModelCapabilities {
    /// Create capabilities with all features enabled
    pub fn full() -> Self {
        Self {
            tool_calling: true,
            streaming: true,
        }
    }

    /// Create capabilities with just streaming
    pub fn streaming_only() -> Self {
        Self {
            streaming: true,
            ..Default::default()
        }
    }
}

/// Provider metadata (static information about a provider)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Provider identifier
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Default API base URL
    pub default_api_base: String,
    /// Whether API key is required
    pub requires_api_key: bool,
    /// Supported models with their context lengths
    pub default_models: Vec<DefaultModel>,
}

impl ProviderMetadata {
    /// Whether any advertised model can call tools
    pub fn supports_tools(&self) -> bool {
        self.default_models.iter().any(|m| m.capabilities.tool_calling)
    }
}

/// Default model information for a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultModel {
    /// Model identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Context length in tokens
    pub context_length: u32,
    /// Model capabilities
    pub capabilities: ModelCapabilities,
}
