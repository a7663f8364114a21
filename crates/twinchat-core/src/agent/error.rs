//! Turn error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::ProviderError;
use crate::tools::ToolError;

/// Problems with the conversation history handed to a turn
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// A tool message without a `toolCallId`
    #[error("tool message at position {index} has no toolCallId")]
    MissingToolCallId { index: usize },

    /// A tool message answering an invocation that never happened
    #[error("tool message at position {index} answers unknown invocation {call_id}")]
    DanglingToolResult { index: usize, call_id: String },

    /// A second tool message for the same invocation
    #[error("tool message at position {index} answers {call_id} a second time")]
    DuplicateToolResult { index: usize, call_id: String },
}

/// Why a turn failed
///
/// Every variant is scoped to one turn: the orchestrator turns it into a
/// terminal error chunk and the session stays usable.
#[derive(Error, Debug)]
pub enum TurnError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(#[from] ProviderError),

    #[error("Invalid history: {0}")]
    InvalidHistory(#[from] HistoryError),
}

/// Stable, serializable error category reported to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    DuplicateToolError,
    UnknownToolError,
    SchemaMismatchError,
    ModelUnavailableError,
    ExecutorError,
    InvalidHistoryError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DuplicateToolError => "DuplicateToolError",
            ErrorKind::UnknownToolError => "UnknownToolError",
            ErrorKind::SchemaMismatchError => "SchemaMismatchError",
            ErrorKind::ModelUnavailableError => "ModelUnavailableError",
            ErrorKind::ExecutorError => "ExecutorError",
            ErrorKind::InvalidHistoryError => "InvalidHistoryError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TurnError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TurnError::Tool(ToolError::Duplicate(_)) => ErrorKind::DuplicateToolError,
            TurnError::Tool(ToolError::Unknown(_)) => ErrorKind::UnknownToolError,
            TurnError::Tool(ToolError::SchemaMismatch { .. }) => ErrorKind::SchemaMismatchError,
            TurnError::Tool(ToolError::Executor { .. }) => ErrorKind::ExecutorError,
            TurnError::ModelUnavailable(_) => ErrorKind::ModelUnavailableError,
            TurnError::InvalidHistory(_) => ErrorKind::InvalidHistoryError,
        }
    }

    /// Whether asking again may succeed. Only model/transport failures qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            TurnError::ModelUnavailable(e) => e.is_retryable(),
            TurnError::Tool(_) | TurnError::InvalidHistory(_) => false,
        }
    }

    /// Short apology shown to the visitor in place of an answer
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::UnknownToolError
            | ErrorKind::SchemaMismatchError
            | ErrorKind::ExecutorError => {
                "Sorry, I couldn't pull that up right now. Could you ask another way?"
            }
            ErrorKind::ModelUnavailableError => {
                "Sorry, I'm having trouble thinking right now. Please try again in a moment."
            }
            ErrorKind::InvalidHistoryError => {
                "Sorry, our conversation got mixed up. Please start a new chat."
            }
            ErrorKind::DuplicateToolError => "Sorry, I'm not set up correctly right now.",
        }
    }
}
