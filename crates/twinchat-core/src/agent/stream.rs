//! Response streamer
//!
//! A turn's output is a lazy, single-pass sequence of [`TurnChunk`]s. Nothing
//! happens until the consumer polls; dropping the stream or cancelling it
//! stops the turn, including the upstream model request.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::FusedStream;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{CancellationToken, ToolResult};

use super::error::{ErrorKind, TurnError};
use super::session::TurnRecorder;

/// One unit of turn output, in generation order
///
/// A turn yields either text chunks only, or exactly one `toolResult`, or
/// ends with one `error`. `toolResult` and `error` are always last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TurnChunk {
    /// Incremental reply text
    Text { content: String },

    /// Output of the tool the model selected
    #[serde(rename_all = "camelCase")]
    ToolResult {
        tool_name: String,
        call_id: String,
        /// Arguments as the model proposed them
        #[serde(default)]
        input: Value,
        result: ToolResult,
    },

    /// The turn failed
    #[serde(rename_all = "camelCase")]
    Error {
        error_kind: ErrorKind,
        /// Apology for the visitor
        message: String,
        /// Technical description for logs and developers
        detail: String,
        retryable: bool,
    },
}

impl TurnChunk {
    /// Create a text chunk
    pub fn text(content: impl Into<String>) -> Self {
        TurnChunk::Text {
            content: content.into(),
        }
    }

    /// Create the terminal chunk for a failed turn
    pub fn from_error(error: &TurnError) -> Self {
        TurnChunk::Error {
            error_kind: error.kind(),
            message: error.user_message().to_string(),
            detail: error.to_string(),
            retryable: error.is_retryable(),
        }
    }

    /// Whether no chunk may follow this one
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TurnChunk::Text { .. })
    }

    /// Get the text if this is a text chunk
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TurnChunk::Text { content } => Some(content),
            _ => None,
        }
    }

    /// Get the error kind if this is an error chunk
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            TurnChunk::Error { error_kind, .. } => Some(*error_kind),
            _ => None,
        }
    }
}

/// Cancels a running turn from outside the consuming task
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Stop the turn. Chunks already delivered stay delivered.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// The chunk stream of one turn
///
/// Single-pass and fused: once it returns `None` it keeps returning `None`.
/// Dropping it cancels the turn.
pub struct TurnStream {
    inner: Pin<Box<dyn Stream<Item = TurnChunk> + Send>>,
    cancel: CancellationToken,
    recorder: TurnRecorder,
    done: bool,
}

impl TurnStream {
    pub(crate) fn new(
        inner: Pin<Box<dyn Stream<Item = TurnChunk> + Send>>,
        cancel: CancellationToken,
        recorder: TurnRecorder,
    ) -> Self {
        Self {
            inner,
            cancel,
            recorder,
            done: false,
        }
    }

    /// Cancel the turn
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Handle for cancelling from another task, e.g. a Ctrl-C listener
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            token: self.cancel.clone(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// What this turn has produced so far
    ///
    /// The recorder only reports the turn as complete once the stream ended
    /// on its own, without cancellation or failure.
    pub fn recorder(&self) -> &TurnRecorder {
        &self.recorder
    }

    /// Drain the remaining chunks
    pub async fn collect_all(&mut self) -> Vec<TurnChunk> {
        let mut chunks = Vec::new();
        while let Some(chunk) = self.next().await {
            chunks.push(chunk);
        }
        chunks
    }
}

impl Stream for TurnStream {
    type Item = TurnChunk;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        match self.inner.poll_next_unpin(cx) {
            Poll::Ready(Some(chunk)) => {
                self.recorder.observe(&chunk);
                Poll::Ready(Some(chunk))
            }
            Poll::Ready(None) => {
                self.done = true;
                if !self.cancel.is_cancelled() {
                    self.recorder.finish();
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl FusedStream for TurnStream {
    fn is_terminated(&self) -> bool {
        self.done
    }
}

impl Drop for TurnStream {
    fn drop(&mut self) {
        if !self.done {
            self.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for TurnStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnStream")
            .field("done", &self.done)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolError;
    use futures::stream;
    use serde_json::json;

    fn turn_stream(chunks: Vec<TurnChunk>) -> (TurnStream, CancellationToken) {
        let token = CancellationToken::new();
        let s = TurnStream::new(
            Box::pin(stream::iter(chunks)),
            token.clone(),
            TurnRecorder::new("hello"),
        );
        (s, token)
    }

    #[test]
    fn test_chunk_serde_shape() {
        let chunk = TurnChunk::ToolResult {
            tool_name: "getSkills".into(),
            call_id: "c1".into(),
            input: Value::Null,
            result: ToolResult::structured(json!({"skills": []})),
        };
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["kind"], "toolResult");
        assert_eq!(value["toolName"], "getSkills");
        assert_eq!(value["callId"], "c1");
        assert_eq!(value["result"]["format"], "structured");

        let text = serde_json::to_value(TurnChunk::text("hi")).unwrap();
        assert_eq!(text, json!({"kind": "text", "content": "hi"}));
    }

    #[test]
    fn test_error_chunk() {
        let chunk = TurnChunk::from_error(&TurnError::from(ToolError::Unknown("getNonExistentTool".into())));
        assert_eq!(chunk.error_kind(), Some(ErrorKind::UnknownToolError));
        assert!(chunk.is_terminal());

        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["kind"], "error");
        assert_eq!(value["errorKind"], "UnknownToolError");
        assert_eq!(value["retryable"], false);
        assert!(value["detail"].as_str().unwrap().contains("getNonExistentTool"));
    }

    #[tokio::test]
    async fn test_stream_is_fused() {
        let (mut s, _) = turn_stream(vec![TurnChunk::text("a"), TurnChunk::text("b")]);
        assert_eq!(s.collect_all().await.len(), 2);
        assert!(s.is_terminated());
        assert!(s.next().await.is_none());
        assert!(s.next().await.is_none());
    }

    #[tokio::test]
    async fn test_natural_end_completes_recorder() {
        let (mut s, _) = turn_stream(vec![TurnChunk::text("Hey!")]);
        s.collect_all().await;
        assert!(s.recorder().is_complete());
    }

    #[tokio::test]
    async fn test_cancel_handle() {
        let (mut s, token) = turn_stream(vec![TurnChunk::text("a")]);
        let handle = s.cancel_handle();
        handle.cancel();
        assert!(token.is_cancelled());
        assert!(s.is_cancelled());

        // Ending after a cancel does not count as a completed turn
        s.collect_all().await;
        assert!(!s.recorder().is_complete());
    }

    #[test]
    fn test_drop_cancels() {
        let (s, token) = turn_stream(vec![TurnChunk::text("a")]);
        drop(s);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_drop_after_end_does_not_cancel() {
        let (mut s, token) = turn_stream(vec![TurnChunk::text("a")]);
        s.collect_all().await;
        drop(s);
        assert!(!token.is_cancelled());
    }
}
