//! Turn orchestrator
//!
//! Drives one turn through its states:
//!
//! ```text
//! AwaitingModel ──text──▶ GeneratingText ─────────────────────────▶ Complete
//!       │
//!       └──tool call──▶ SelectingTool ──▶ ExecutingTool ──────────▶ Complete
//!
//! any state ──error──▶ Failed (terminal error chunk)
//! any state ──cancel──▶ stream ends, nothing more is emitted
//! ```
//!
//! The first non-empty model emission decides the turn's mode. Text and tool
//! calls are mutually exclusive, and at most one tool runs per turn: the
//! first proposed call wins and the rest are discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::{stream, StreamExt};
use serde_json::Value;

use crate::logging::{Logger, NoOpLogger};
use crate::providers::{Provider, ProviderError, ProviderModelConfig, StreamChatOptions, StreamResponse};
use crate::tools::ToolRegistry;
use crate::types::{CancellationToken, ChatMessage, StreamChunk, ToolCall, ToolChoice};

use super::error::TurnError;
use super::session::{validate_history, TurnRecorder};
use super::stream::{TurnChunk, TurnStream};

/// The persona agent
///
/// Holds only shared, immutable state, so one agent serves any number of
/// concurrent turns and sessions.
pub struct Agent {
    registry: Arc<ToolRegistry>,
    persona: Arc<ChatMessage>,
    provider: Arc<dyn Provider>,
    model: ProviderModelConfig,
    options: StreamChatOptions,
    logger: Arc<dyn Logger>,
    turn_counter: AtomicU64,
}

/// Builder for [`Agent`]
pub struct AgentBuilder {
    registry: Arc<ToolRegistry>,
    persona: Arc<ChatMessage>,
    provider: Arc<dyn Provider>,
    model: ProviderModelConfig,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    logger: Arc<dyn Logger>,
}

impl AgentBuilder {
    /// Model to request from the provider
    pub fn model(mut self, model: ProviderModelConfig) -> Self {
        self.model = model;
        self
    }

    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn build(self) -> Agent {
        let mut options = StreamChatOptions::new();
        options.temperature = self.temperature;
        options.max_tokens = self.max_tokens;
        if !self.registry.is_empty() {
            options = options
                .with_tools(self.registry.llm_tools())
                .with_tool_choice(ToolChoice::Auto);
        }

        self.logger.info(&format!(
            "[Agent] Ready: provider={}, model={}, tools=[{}]",
            self.provider.name(),
            self.model.model,
            self.registry.list_tool_names().join(", ")
        ));

        Agent {
            registry: self.registry,
            persona: self.persona,
            provider: self.provider,
            model: self.model,
            options,
            logger: self.logger,
            turn_counter: AtomicU64::new(0),
        }
    }
}

impl Agent {
    /// Start building an agent from its three collaborators
    pub fn builder(
        registry: Arc<ToolRegistry>,
        persona: ChatMessage,
        provider: Arc<dyn Provider>,
    ) -> AgentBuilder {
        let model = ProviderModelConfig::new(
            provider
                .metadata()
                .default_models
                .first()
                .map(|m| m.id.clone())
                .unwrap_or_else(|| "default".to_string()),
        );
        AgentBuilder {
            registry,
            persona: Arc::new(persona),
            provider,
            model,
            temperature: None,
            max_tokens: None,
            logger: Arc::new(NoOpLogger::new()),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn persona(&self) -> &ChatMessage {
        &self.persona
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run one turn
    ///
    /// Nothing is sent to the model until the returned stream is first
    /// polled. The caller's history is not modified; use
    /// [`Session`](super::Session) to keep it.
    pub fn run_turn(&self, history: Vec<ChatMessage>, user_message: impl Into<String>) -> TurnStream {
        let user_message = user_message.into();
        let cancel = CancellationToken::new();
        let turn = self.turn_counter.fetch_add(1, Ordering::Relaxed) + 1;

        let ctx = TurnContext {
            turn,
            registry: Arc::clone(&self.registry),
            persona: Arc::clone(&self.persona),
            provider: Arc::clone(&self.provider),
            model: self.model.clone(),
            options: self.options.clone(),
            logger: Arc::clone(&self.logger),
            cancel: cancel.clone(),
            history,
            user_message: user_message.clone(),
        };

        let inner = stream::unfold(TurnState::AwaitingModel(Box::new(ctx)), |state| step(state));

        TurnStream::new(Box::pin(inner), cancel, TurnRecorder::new(user_message))
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("provider", &self.provider.name())
            .field("model", &self.model.model)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Everything a turn needs, owned by the turn
struct TurnContext {
    turn: u64,
    registry: Arc<ToolRegistry>,
    persona: Arc<ChatMessage>,
    provider: Arc<dyn Provider>,
    model: ProviderModelConfig,
    options: StreamChatOptions,
    logger: Arc<dyn Logger>,
    cancel: CancellationToken,
    history: Vec<ChatMessage>,
    user_message: String,
}

impl TurnContext {
    fn debug(&self, msg: &str) {
        self.logger.debug(&format!("[Agent] turn {}: {}", self.turn, msg));
    }

    fn info(&self, msg: &str) {
        self.logger.info(&format!("[Agent] turn {}: {}", self.turn, msg));
    }

    fn warn(&self, msg: &str) {
        self.logger.warn(&format!("[Agent] turn {}: {}", self.turn, msg));
    }

    fn error(&self, msg: &str) {
        self.logger.error(&format!("[Agent] turn {}: {}", self.turn, msg));
    }

    /// Persona, then history, then the new user message
    fn request_messages(&mut self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push((*self.persona).clone());
        messages.append(&mut self.history);
        messages.push(ChatMessage::user(self.user_message.clone()));
        messages
    }

    /// Next model event, racing the turn's cancellation
    async fn next_chunk(&self, model: &mut StreamResponse) -> Next {
        match self.cancel.run_until_cancelled(model.next()).await {
            None | Some(Some(Err(ProviderError::Cancelled))) => Next::Cancelled,
            Some(None) => Next::End,
            Some(Some(Ok(chunk))) => Next::Chunk(chunk),
            Some(Some(Err(e))) => Next::Failed(e),
        }
    }
}

enum Next {
    Chunk(StreamChunk),
    End,
    Cancelled,
    Failed(ProviderError),
}

/// A tool call still being streamed as deltas
struct PartialCall {
    id: String,
    name: Option<String>,
    arguments: String,
}

/// Tool proposals collected while the model stream drains
#[derive(Default)]
struct ToolSelection {
    complete: Vec<ToolCall>,
    partial: Vec<PartialCall>,
    dropped_text: usize,
}

impl ToolSelection {
    fn push(&mut self, chunk: StreamChunk) {
        match chunk {
            StreamChunk::ToolCall { tool_call } => self.complete.push(tool_call),
            StreamChunk::ToolCallDelta {
                id,
                name,
                input_delta,
            } => {
                let pos = match self.partial.iter().position(|p| p.id == id) {
                    Some(pos) => pos,
                    None => {
                        self.partial.push(PartialCall {
                            id,
                            name: None,
                            arguments: String::new(),
                        });
                        self.partial.len() - 1
                    }
                };
                let entry = &mut self.partial[pos];
                if entry.name.is_none() {
                    entry.name = name.filter(|n| !n.is_empty());
                }
                if let Some(delta) = input_delta {
                    entry.arguments.push_str(&delta);
                }
            }
            StreamChunk::Text { .. } => self.dropped_text += 1,
        }
    }

    /// The call to execute and how many proposals were discarded
    ///
    /// Complete calls take precedence over ones assembled from deltas, since
    /// providers that stream deltas also report the finished calls.
    fn finish(self) -> Option<(ToolCall, usize)> {
        if !self.complete.is_empty() {
            let discarded = self.complete.len() - 1;
            return self.complete.into_iter().next().map(|c| (c, discarded));
        }

        let named: Vec<PartialCall> = self.partial.into_iter().filter(|p| p.name.is_some()).collect();
        let discarded = named.len().saturating_sub(1);
        named.into_iter().next().and_then(|p| {
            let input = if p.arguments.trim().is_empty() {
                Value::Null
            } else {
                // Malformed JSON is passed on as a string for the validator to reject
                serde_json::from_str(&p.arguments).unwrap_or(Value::String(p.arguments))
            };
            p.name.map(|name| (ToolCall::new(p.id, name, input), discarded))
        })
    }
}

enum TurnState {
    /// Request not yet sent
    AwaitingModel(Box<TurnContext>),
    /// Request sent, waiting for the first non-empty emission
    Deciding {
        ctx: Box<TurnContext>,
        model: StreamResponse,
    },
    GeneratingText {
        ctx: Box<TurnContext>,
        model: StreamResponse,
        discarded_tools: usize,
    },
    SelectingTool {
        ctx: Box<TurnContext>,
        model: StreamResponse,
        selection: ToolSelection,
    },
    ExecutingTool {
        ctx: Box<TurnContext>,
        call: ToolCall,
    },
    Failed {
        ctx: Box<TurnContext>,
        error: TurnError,
    },
    Complete,
}

/// Advance the turn until it emits a chunk or ends
async fn step(mut state: TurnState) -> Option<(TurnChunk, TurnState)> {
    loop {
        state = match state {
            TurnState::AwaitingModel(mut ctx) => {
                if let Err(e) = validate_history(&ctx.history) {
                    TurnState::Failed {
                        ctx,
                        error: e.into(),
                    }
                } else {
                    ctx.info(&format!("started, {} history messages", ctx.history.len()));
                    let messages = ctx.request_messages();
                    let request = ctx.provider.stream_chat(
                        messages,
                        ctx.model.clone(),
                        ctx.options.clone(),
                        ctx.cancel.clone(),
                    );

                    let result = ctx.cancel.run_until_cancelled(request).await;

                    match result {
                        None | Some(Err(ProviderError::Cancelled)) => {
                            ctx.info("cancelled before the model responded");
                            return None;
                        }
                        Some(Err(e)) => TurnState::Failed {
                            ctx,
                            error: e.into(),
                        },
                        Some(Ok(model)) => TurnState::Deciding { ctx, model },
                    }
                }
            }

            TurnState::Deciding { ctx, mut model } => match ctx.next_chunk(&mut model).await {
                Next::Chunk(StreamChunk::Text { text }) if text.is_empty() => {
                    TurnState::Deciding { ctx, model }
                }
                Next::Chunk(StreamChunk::Text { text }) => {
                    ctx.debug("model answered with text");
                    return Some((
                        TurnChunk::text(text),
                        TurnState::GeneratingText {
                            ctx,
                            model,
                            discarded_tools: 0,
                        },
                    ));
                }
                Next::Chunk(chunk) => {
                    ctx.debug("model is selecting a tool");
                    let mut selection = ToolSelection::default();
                    selection.push(chunk);
                    TurnState::SelectingTool {
                        ctx,
                        model,
                        selection,
                    }
                }
                Next::End => {
                    let error = ProviderError::empty_response(ctx.provider.name()).into();
                    TurnState::Failed { ctx, error }
                }
                Next::Cancelled => {
                    ctx.info("cancelled");
                    return None;
                }
                Next::Failed(e) => TurnState::Failed {
                    ctx,
                    error: e.into(),
                },
            },

            TurnState::GeneratingText {
                ctx,
                mut model,
                discarded_tools,
            } => match ctx.next_chunk(&mut model).await {
                Next::Chunk(StreamChunk::Text { text }) if text.is_empty() => TurnState::GeneratingText {
                    ctx,
                    model,
                    discarded_tools,
                },
                Next::Chunk(StreamChunk::Text { text }) => {
                    return Some((
                        TurnChunk::text(text),
                        TurnState::GeneratingText {
                            ctx,
                            model,
                            discarded_tools,
                        },
                    ));
                }
                Next::Chunk(StreamChunk::ToolCall { .. }) => TurnState::GeneratingText {
                    ctx,
                    model,
                    discarded_tools: discarded_tools + 1,
                },
                // Deltas only announce a call; count the complete one
                Next::Chunk(StreamChunk::ToolCallDelta { .. }) => TurnState::GeneratingText {
                    ctx,
                    model,
                    discarded_tools,
                },
                Next::End => {
                    if discarded_tools > 0 {
                        ctx.warn(&format!(
                            "discarded {} tool call(s) proposed after text",
                            discarded_tools
                        ));
                    }
                    ctx.info("completed with text");
                    TurnState::Complete
                }
                Next::Cancelled => {
                    ctx.info("cancelled while generating text");
                    return None;
                }
                Next::Failed(e) => TurnState::Failed {
                    ctx,
                    error: e.into(),
                },
            },

            TurnState::SelectingTool {
                ctx,
                mut model,
                mut selection,
            } => match ctx.next_chunk(&mut model).await {
                Next::Chunk(chunk) => {
                    selection.push(chunk);
                    TurnState::SelectingTool {
                        ctx,
                        model,
                        selection,
                    }
                }
                Next::End => {
                    drop(model);
                    if selection.dropped_text > 0 {
                        ctx.debug(&format!(
                            "dropped {} text chunk(s) after tool selection",
                            selection.dropped_text
                        ));
                    }
                    match selection.finish() {
                        Some((call, discarded)) => {
                            if discarded > 0 {
                                ctx.warn(&format!(
                                    "model proposed {} tool calls; executing {} and discarding {}",
                                    discarded + 1,
                                    call.name,
                                    discarded
                                ));
                            }
                            TurnState::ExecutingTool { ctx, call }
                        }
                        None => {
                            let error = ProviderError::invalid_response(
                                ctx.provider.name(),
                                "tool call without a tool name",
                            )
                            .into();
                            TurnState::Failed { ctx, error }
                        }
                    }
                }
                Next::Cancelled => {
                    ctx.info("cancelled while selecting a tool");
                    return None;
                }
                Next::Failed(e) => TurnState::Failed {
                    ctx,
                    error: e.into(),
                },
            },

            TurnState::ExecutingTool { ctx, call } => {
                if ctx.cancel.is_cancelled() {
                    ctx.info("cancelled before tool execution");
                    return None;
                }
                ctx.info(&format!("executing {} ({})", call.name, call.id));

                let outcome = ctx
                    .cancel
                    .run_until_cancelled(ctx.registry.execute_tool_call(&call))
                    .await;

                match outcome {
                    None => {
                        ctx.info("cancelled during tool execution");
                        return None;
                    }
                    Some(Ok(result)) => {
                        ctx.info(&format!("completed with {}", call.name));
                        return Some((
                            TurnChunk::ToolResult {
                                tool_name: call.name,
                                call_id: call.id,
                                input: call.input,
                                result,
                            },
                            TurnState::Complete,
                        ));
                    }
                    Some(Err(e)) => TurnState::Failed {
                        ctx,
                        error: e.into(),
                    },
                }
            }

            TurnState::Failed { ctx, error } => {
                ctx.error(&format!("failed ({}): {}", error.kind(), error));
                return Some((TurnChunk::from_error(&error), TurnState::Complete));
            }

            TurnState::Complete => return None,
        };
    }
}
