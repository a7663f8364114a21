//! Tool error types

use thiserror::Error;

/// Errors raised while registering, resolving, validating or executing tools
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// A tool with this name is already registered (startup configuration error)
    #[error("Tool already registered: {0}")]
    Duplicate(String),

    /// The model asked for a tool that is not in the registry
    #[error("Unknown tool: {0}")]
    Unknown(String),

    /// The model supplied arguments that do not match the tool's schema
    #[error("Invalid arguments for {tool}: {reason}")]
    SchemaMismatch { tool: String, reason: String },

    /// The tool's own logic failed
    #[error("Tool {tool} failed: {message}")]
    Executor { tool: String, message: String },
}

impl ToolError {
    /// Create a schema mismatch error
    pub fn schema_mismatch(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Create an executor error
    pub fn executor(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Executor {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
