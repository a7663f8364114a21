//! Per-visitor conversation state
//!
//! History lives in memory for the lifetime of one session and grows only
//! by completed turns. A failed or cancelled turn leaves it untouched, so a
//! broken turn can never leave a dangling tool invocation behind.

use std::collections::HashSet;

use futures::StreamExt;
use serde_json::Value;

use crate::types::{ChatMessage, MessageRole, ToolResult};

use super::error::HistoryError;
use super::orchestrator::Agent;
use super::stream::{TurnChunk, TurnStream};

/// Check that every tool message answers exactly one earlier, still open
/// tool invocation
pub fn validate_history(history: &[ChatMessage]) -> Result<(), HistoryError> {
    let mut pending: HashSet<&str> = HashSet::new();
    let mut answered: HashSet<&str> = HashSet::new();

    for (index, msg) in history.iter().enumerate() {
        match msg.role {
            MessageRole::Assistant => {
                pending.extend(msg.tool_uses().map(|(id, _)| id));
            }
            MessageRole::Tool => {
                let call_id = msg
                    .tool_call_id
                    .as_deref()
                    .ok_or(HistoryError::MissingToolCallId { index })?;

                if pending.remove(call_id) {
                    answered.insert(call_id);
                } else if answered.contains(call_id) {
                    return Err(HistoryError::DuplicateToolResult {
                        index,
                        call_id: call_id.to_string(),
                    });
                } else {
                    return Err(HistoryError::DanglingToolResult {
                        index,
                        call_id: call_id.to_string(),
                    });
                }
            }
            MessageRole::System | MessageRole::User => {}
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct RecordedTool {
    call_id: String,
    name: String,
    input: Value,
    result: ToolResult,
}

/// Follows a turn's chunks and yields the messages to append once the turn
/// has completed
#[derive(Debug, Clone, Default)]
pub struct TurnRecorder {
    user_message: String,
    text: String,
    tool: Option<RecordedTool>,
    failed: bool,
    finished: bool,
}

impl TurnRecorder {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ..Default::default()
        }
    }

    /// Account for one chunk
    pub fn observe(&mut self, chunk: &TurnChunk) {
        match chunk {
            TurnChunk::Text { content } => self.text.push_str(content),
            TurnChunk::ToolResult {
                tool_name,
                call_id,
                input,
                result,
            } => {
                self.tool = Some(RecordedTool {
                    call_id: call_id.clone(),
                    name: tool_name.clone(),
                    input: input.clone(),
                    result: result.clone(),
                });
                // Terminal: a cancel arriving after delivery cannot undo it
                self.finished = true;
            }
            TurnChunk::Error { .. } => self.failed = true,
        }
    }

    /// Mark that the turn ran to its natural end. A delivered `toolResult`
    /// finishes the turn on its own.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Whether the turn finished, did not fail, and produced an answer
    pub fn is_complete(&self) -> bool {
        self.finished && !self.failed && (self.tool.is_some() || !self.text.is_empty())
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Reply text streamed so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Messages this turn adds to the history, if it completed
    ///
    /// Text turn: `user`, `assistant`. Tool turn: `user`, `assistant` with the
    /// `tool_use` part, `tool` carrying the result.
    pub fn messages(&self) -> Option<Vec<ChatMessage>> {
        if !self.is_complete() {
            return None;
        }

        let user = ChatMessage::user(self.user_message.clone());
        Some(match &self.tool {
            Some(tool) => vec![
                user,
                ChatMessage::assistant_tool_use(&tool.call_id, &tool.name, tool.input.clone()),
                ChatMessage::tool(&tool.call_id, &tool.result),
            ],
            None => vec![user, ChatMessage::assistant(self.text.clone())],
        })
    }
}

/// One visitor's conversation
#[derive(Debug, Clone, Default)]
pub struct Session {
    history: Vec<ChatMessage>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from an existing history, which must be well linked
    pub fn with_history(history: Vec<ChatMessage>) -> Result<Self, HistoryError> {
        validate_history(&history)?;
        Ok(Self { history })
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Number of messages in the history
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Start a turn against the current history
    pub fn ask(&self, agent: &Agent, text: impl Into<String>) -> TurnStream {
        agent.run_turn(self.history.clone(), text)
    }

    /// Append a finished turn. Returns whether anything was appended.
    pub fn record(&mut self, recorder: &TurnRecorder) -> bool {
        match recorder.messages() {
            Some(messages) => {
                self.history.extend(messages);
                true
            }
            None => false,
        }
    }

    /// Run a turn to the end, record it, and return its chunks
    pub async fn send(&mut self, agent: &Agent, text: impl Into<String>) -> Vec<TurnChunk> {
        let mut stream = self.ask(agent, text);
        let mut chunks = Vec::new();
        while let Some(chunk) = stream.next().await {
            chunks.push(chunk);
        }
        self.record(stream.recorder());
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::error::ErrorKind;
    use serde_json::json;

    fn tool_turn(id: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::user("skills?"),
            ChatMessage::assistant_tool_use(id, "getSkills", Value::Null),
            ChatMessage::tool(id, &ToolResult::text("Rust")),
        ]
    }

    #[test]
    fn test_valid_history() {
        let mut history = tool_turn("c1");
        history.push(ChatMessage::user("hello"));
        history.push(ChatMessage::assistant("hey!"));
        history.extend(tool_turn("c2"));
        assert_eq!(validate_history(&history), Ok(()));
        assert_eq!(validate_history(&[]), Ok(()));
    }

    #[test]
    fn test_dangling_tool_result() {
        let history = vec![
            ChatMessage::user("hi"),
            ChatMessage::tool("nope", &ToolResult::text("x")),
        ];
        assert_eq!(
            validate_history(&history),
            Err(HistoryError::DanglingToolResult {
                index: 1,
                call_id: "nope".into()
            })
        );
    }

    #[test]
    fn test_duplicate_tool_result() {
        let mut history = tool_turn("c1");
        history.push(ChatMessage::tool("c1", &ToolResult::text("again")));
        assert_eq!(
            validate_history(&history),
            Err(HistoryError::DuplicateToolResult {
                index: 3,
                call_id: "c1".into()
            })
        );
    }

    #[test]
    fn test_tool_message_without_id() {
        let mut msg = ChatMessage::tool("c1", &ToolResult::text("x"));
        msg.tool_call_id = None;
        assert_eq!(
            validate_history(&[msg]),
            Err(HistoryError::MissingToolCallId { index: 0 })
        );
    }

    #[test]
    fn test_recorder_text_turn() {
        let mut rec = TurnRecorder::new("hello");
        rec.observe(&TurnChunk::text("Hey "));
        rec.observe(&TurnChunk::text("there!"));
        assert!(rec.messages().is_none(), "not finished yet");

        rec.finish();
        let messages = rec.messages().unwrap();
        assert_eq!(messages, vec![ChatMessage::user("hello"), ChatMessage::assistant("Hey there!")]);
    }

    #[test]
    fn test_recorder_tool_turn() {
        let mut rec = TurnRecorder::new("skills?");
        rec.observe(&TurnChunk::ToolResult {
            tool_name: "getSkills".into(),
            call_id: "c9".into(),
            input: json!({}),
            result: ToolResult::structured(json!({"skills": ["Rust"]})),
        });
        rec.finish();

        let messages = rec.messages().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].tool_uses().collect::<Vec<_>>(), vec![("c9", "getSkills")]);
        assert_eq!(messages[2].tool_call_id.as_deref(), Some("c9"));
        assert_eq!(validate_history(&messages), Ok(()));
    }

    #[test]
    fn test_tool_result_completes_without_stream_end() {
        let mut rec = TurnRecorder::new("skills?");
        rec.observe(&TurnChunk::ToolResult {
            tool_name: "getSkills".into(),
            call_id: "c1".into(),
            input: Value::Null,
            result: ToolResult::text("Rust"),
        });
        assert!(rec.is_complete());

        let mut session = Session::new();
        assert!(session.record(&rec));
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn test_recorder_failed_turn_appends_nothing() {
        let mut rec = TurnRecorder::new("x");
        rec.observe(&TurnChunk::Error {
            error_kind: ErrorKind::UnknownToolError,
            message: "Sorry".into(),
            detail: "Unknown tool: getNonExistentTool".into(),
            retryable: false,
        });
        rec.finish();
        assert!(rec.is_failed());
        assert!(rec.messages().is_none());

        let mut session = Session::new();
        assert!(!session.record(&rec));
        assert!(session.is_empty());
    }

    #[test]
    fn test_session_with_history_validates() {
        assert!(Session::with_history(tool_turn("c1")).is_ok());
        let bad = vec![ChatMessage::tool("c1", &ToolResult::text("x"))];
        assert!(Session::with_history(bad).is_err());
    }
}
