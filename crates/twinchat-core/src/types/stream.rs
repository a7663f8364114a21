//! Model stream events

use super::tool::ToolCall;

/// One event from a provider's response stream, in generation order
///
/// The orchestrator decides a turn's mode from the first non-empty event:
/// `Text` starts a text reply, either tool variant starts tool selection.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    /// Reply text delta
    Text { text: String },
    /// Fully formed tool proposal
    ToolCall { tool_call: ToolCall },
    /// Fragment of a tool proposal; fragments sharing `id` concatenate
    /// their `input_delta` into JSON arguments
    ToolCallDelta {
        id: String,
        name: Option<String>,
        input_delta: Option<String>,
    },
}

impl StreamChunk {
    pub fn text(text: impl Into<String>) -> Self {
        StreamChunk::Text { text: text.into() }
    }

    pub fn tool_call(tool_call: ToolCall) -> Self {
        StreamChunk::ToolCall { tool_call }
    }

    pub fn tool_call_delta(
        id: impl Into<String>,
        name: Option<String>,
        input_delta: Option<String>,
    ) -> Self {
        StreamChunk::ToolCallDelta {
            id: id.into(),
            name,
            input_delta,
        }
    }
}
