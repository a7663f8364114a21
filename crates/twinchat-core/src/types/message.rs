//! Chat message types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tool::ToolResult;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Tool => write!(f, "tool"),
        }
    }
}

/// A message in the conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender
    pub role: MessageRole,
    /// The content of the message
    pub content: MessageContent,
    /// Links a tool result to the invocation it answers
    #[serde(rename = "toolCallId", default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn new(role: MessageRole, content: MessageContent) -> Self {
        Self {
            role,
            content,
            tool_call_id: None,
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, MessageContent::Text(content.into()))
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, MessageContent::Text(content.into()))
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, MessageContent::Text(content.into()))
    }

    /// Create an assistant message recording a tool invocation
    pub fn assistant_tool_use(
        id: impl Into<String>,
        name: impl Into<String>,
        input: Value,
    ) -> Self {
        Self::with_parts(
            MessageRole::Assistant,
            vec![ContentPart::tool_use(id, name, input)],
        )
    }

    /// Create a tool message carrying the result of a tool invocation
    pub fn tool(tool_call_id: impl Into<String>, result: &ToolResult) -> Self {
        let content = match result {
            ToolResult::Text(text) => MessageContent::Text(text.clone()),
            ToolResult::Structured(value) => MessageContent::Structured(value.clone()),
        };
        Self {
            role: MessageRole::Tool,
            content,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    /// Create a message with structured content parts
    pub fn with_parts(role: MessageRole, parts: Vec<ContentPart>) -> Self {
        Self::new(role, MessageContent::Parts(parts))
    }

    /// Get the text content if this is a simple text message
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Iterate over the tool invocations recorded in this message
    pub fn tool_uses(&self) -> impl Iterator<Item = (&str, &str)> {
        let parts: &[ContentPart] = match &self.content {
            MessageContent::Parts(parts) => parts,
            _ => &[],
        };
        parts.iter().filter_map(|p| match p {
            ContentPart::ToolUse { id, name, .. } => Some((id.as_str(), name.as_str())),
            _ => None,
        })
    }

    /// Flatten the content into plain text for providers that only take strings
    pub fn flatten_text(&self) -> String {
        match &self.content {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Structured(v) => v.to_string(),
            MessageContent::Parts(parts) => parts
                .iter()
                .map(|p| match p {
                    ContentPart::Text { text } => text.clone(),
                    ContentPart::ToolUse { name, input, .. } => {
                        format!("[called {} with {}]", name, input)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Message content - simple text, a structured payload, or parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Structured content with multiple parts
    Parts(Vec<ContentPart>),
    /// Structured payload, e.g. a tool result object
    Structured(Value),
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Text(s.to_string())
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        MessageContent::Parts(parts)
    }
}

/// Content part for assistant messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content
    Text {
        text: String,
    },
    /// Tool use (assistant calling a tool)
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
}

impl ContentPart {
    /// Create a text content part
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Create a tool use content part
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        ContentPart::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_message_creation() {
        let sys = ChatMessage::system("You are Mousa");
        assert_eq!(sys.role, MessageRole::System);
        assert_eq!(sys.text(), Some("You are Mousa"));

        let user = ChatMessage::user("Hello");
        assert_eq!(user.role, MessageRole::User);
        assert!(user.tool_call_id.is_none());

        let asst = ChatMessage::assistant("Hi there!");
        assert_eq!(asst.role, MessageRole::Assistant);
    }

    #[test]
    fn test_tool_message_links_call_id() {
        let msg = ChatMessage::tool("call_1", &ToolResult::text("done"));
        assert_eq!(msg.role, MessageRole::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.text(), Some("done"));

        let structured = ChatMessage::tool("call_2", &ToolResult::structured(json!({"a": 1})));
        assert_eq!(structured.content, MessageContent::Structured(json!({"a": 1})));
    }

    #[test]
    fn test_tool_uses() {
        let msg = ChatMessage::assistant_tool_use("call_1", "getSkills", json!({}));
        let uses: Vec<_> = msg.tool_uses().collect();
        assert_eq!(uses, vec![("call_1", "getSkills")]);
        assert_eq!(ChatMessage::user("hi").tool_uses().count(), 0);
    }

    #[test]
    fn test_message_serialization() {
        let msg = ChatMessage::user("Hello");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"content\":\"Hello\""));
        assert!(!json.contains("toolCallId"));

        let tool = ChatMessage::tool("call_9", &ToolResult::text("x"));
        let json = serde_json::to_string(&tool).unwrap();
        assert!(json.contains("\"toolCallId\":\"call_9\""));
    }

    #[test]
    fn test_message_deserialization_keeps_parts() {
        let msg = ChatMessage::assistant_tool_use("c1", "getResume", json!({}));
        let json = serde_json::to_string(&msg).unwrap();
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_flatten_text() {
        let msg = ChatMessage::assistant_tool_use("c1", "getResume", json!({}));
        assert!(msg.flatten_text().contains("getResume"));
    }
}
