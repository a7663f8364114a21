//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Model-facing tool definition for function calling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (function name)
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl Tool {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
        }
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// Tool invocation request proposed by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Raw input arguments for the tool
    #[serde(default)]
    pub input: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Create a tool call with no arguments
    pub fn no_args(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, Value::Null)
    }
}

/// Output of a tool executor, passed to the consumer verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "value", rename_all = "lowercase")]
pub enum ToolResult {
    /// Rendered text (markdown)
    Text(String),
    /// Structured object for widget rendering
    Structured(Value),
}

impl ToolResult {
    /// Create a text result
    pub fn text(text: impl Into<String>) -> Self {
        ToolResult::Text(text.into())
    }

    /// Create a structured result
    pub fn structured(value: Value) -> Self {
        ToolResult::Structured(value)
    }

    /// Whether the payload carries no content
    pub fn is_empty(&self) -> bool {
        match self {
            ToolResult::Text(text) => text.trim().is_empty(),
            ToolResult::Structured(Value::Null) => true,
            ToolResult::Structured(Value::Object(map)) => map.is_empty(),
            ToolResult::Structured(Value::Array(items)) => items.is_empty(),
            ToolResult::Structured(_) => false,
        }
    }

    /// Get the text if this is a text result
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolResult::Text(text) => Some(text),
            ToolResult::Structured(_) => None,
        }
    }

    /// Get the value if this is a structured result
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            ToolResult::Structured(value) => Some(value),
            ToolResult::Text(_) => None,
        }
    }
}

/// Tool choice option for requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Let the model decide whether to use tools
    #[default]
    Auto,
    /// Don't use tools
    None,
    /// Force tool use
    Required,
}
