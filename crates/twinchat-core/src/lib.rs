//! TwinChat Core
//!
//! Persona agent for a portfolio chatbot. A visitor's message goes to an LLM
//! primed with the owner's persona; the model either answers in the owner's
//! voice or picks one portfolio tool, whose output is streamed back for the
//! host to render.
//!
//! ```rust,ignore
//! use twinchat_core::{Agent, Profile, Session, portfolio_registry, persona_prompt};
//!
//! let profile = Arc::new(Profile::builtin()?.clone());
//! let registry = Arc::new(portfolio_registry(profile.clone(), logger.clone())?);
//! let provider = create_provider("mock", logger.clone());
//! let agent = Agent::builder(registry, persona_prompt(&profile), provider).build();
//!
//! let mut session = Session::new();
//! for chunk in session.send(&agent, "Show me your projects").await {
//!     println!("{}", serde_json::to_string(&chunk)?);
//! }
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod profile;
pub mod tools;
pub mod persona;
pub mod providers;
pub mod agent;

// Re-export commonly used types
pub use types::{
    ChatMessage, ContentPart, MessageRole, MessageContent,
    ModelCapabilities, ProviderMetadata,
    Tool, ToolCall, ToolResult, ToolChoice,
    StreamChunk,
    CancellationToken,
};

pub use logging::{Logger, NoOpLogger, TracingLogger, CaptureLogger};

pub use config::{ConfigProvider, ConfigError, FileConfigProvider, MemoryConfigProvider, Settings};

pub use profile::Profile;

pub use tools::{
    ToolDefinition, ToolError, ToolRegistry, ParamKind, ParamSpec, ParameterSchema,
    portfolio_registry, INTENT_ROUTES,
};

pub use persona::{persona_prompt, PersonaPromptBuilder};

pub use providers::{create_provider, Provider, ProviderError, ProviderModelConfig, MockProvider};

pub use agent::{
    Agent, AgentBuilder, CancelHandle, ErrorKind, Session, TurnChunk, TurnError, TurnStream,
};
