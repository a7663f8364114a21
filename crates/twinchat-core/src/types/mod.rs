//! Core types for agent interactions
//!
//! This module contains the shared types used across providers, tools and the
//! turn orchestrator.

mod message;
mod model;
mod tool;
mod stream;
mod cancellation;

pub use message::{ChatMessage, ContentPart, MessageRole, MessageContent};
pub use model::{ModelCapabilities, ProviderMetadata, DefaultModel};
pub use tool::{Tool, ToolCall, ToolResult, ToolChoice};
pub use stream::StreamChunk;
pub use cancellation::CancellationToken;
