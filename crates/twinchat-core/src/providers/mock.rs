//! Mock provider for testing
//!
//! Provides deterministic, configurable responses without network dependencies.
//! Used as the stub model in tests and as the offline `mock` provider of the
//! CLI, where it routes visitor messages to tools by keyword.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::error::{ProviderError, ProviderResult};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
use crate::logging::Logger;
use crate::tools::IntentRoute;
use crate::types::{
    CancellationToken, ChatMessage, DefaultModel, MessageRole, ModelCapabilities,
    ProviderMetadata, StreamChunk, ToolCall,
};

/// Keyword route used by [`MockMode::Intent`]
#[derive(Debug, Clone)]
pub struct MockRoute {
    /// Lowercase substrings that select this route
    pub keywords: Vec<String>,
    /// Tool to call when a keyword matches
    pub tool: String,
}

impl MockRoute {
    /// Whether any keyword appears as whole words in `words`. The last word
    /// of a keyword also matches its plural (`skill` matches `skills`).
    fn matches(&self, words: &[String]) -> bool {
        self.keywords.iter().any(|keyword| {
            let parts: Vec<&str> = keyword.split_whitespace().collect();
            !parts.is_empty()
                && words.windows(parts.len()).any(|window| {
                    window.iter().zip(&parts).enumerate().all(|(i, (word, part))| {
                        word == part || (i + 1 == parts.len() && is_plural_of(word, part))
                    })
                })
        })
    }
}

fn is_plural_of(word: &str, singular: &str) -> bool {
    word.strip_prefix(singular)
        .is_some_and(|suffix| suffix == "s" || suffix == "es")
}

/// Lowercase words of `text`, split on anything that is not a letter or digit
fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

impl From<&IntentRoute> for MockRoute {
    fn from(route: &IntentRoute) -> Self {
        Self {
            keywords: route.keywords.iter().map(|k| k.to_string()).collect(),
            tool: route.tool.to_string(),
        }
    }
}

/// Mock response mode
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Echo back the last user message
    #[default]
    Echo,
    /// Return a fixed response
    Fixed(String),
    /// Return response as specific chunks with delays
    Chunks(Vec<String>),
    /// Simulate an error after optional delay
    Error { message: String, delay_chunks: usize },
    /// Return nothing (empty response)
    Empty,
    /// Propose these tool calls, in order
    ToolCalls(Vec<ToolCall>),
    /// Emit exactly these chunks
    Script(Vec<StreamChunk>),
    /// Call the tool whose keywords appear in the last user message,
    /// otherwise reply with `fallback`
    Intent {
        routes: Vec<MockRoute>,
        fallback: String,
    },
}

/// Configuration for the mock provider
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Response mode
    pub mode: MockMode,
    /// Delay between chunks in milliseconds (0 = no delay)
    pub chunk_delay_ms: u64,
    /// Size of each chunk when splitting fixed/echo responses
    pub chunk_size: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            mode: MockMode::Echo,
            chunk_delay_ms: 0,
            chunk_size: 10,
        }
    }
}

/// What the mock stream yields at each step
enum Step {
    Chunk(StreamChunk),
    Fail(String),
}

/// Mock LLM provider for testing
pub struct MockProvider {
    config: MockConfig,
    logger: Arc<dyn Logger>,
    /// Source of tool call ids in intent mode
    call_counter: AtomicU64,
}

impl MockProvider {
    /// Create a new mock provider with default config
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_config(MockConfig::default(), logger)
    }

    /// Create with specific config
    pub fn with_config(config: MockConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            config,
            logger,
            call_counter: AtomicU64::new(0),
        }
    }

    fn with_mode(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        Self::with_config(
            MockConfig {
                mode,
                ..Default::default()
            },
            logger,
        )
    }

    /// Create an echo provider (echoes back user message)
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Echo, logger)
    }

    /// Create a fixed response provider
    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Fixed(response.into()), logger)
    }

    /// Create a chunked response provider
    pub fn chunked(chunks: Vec<String>, delay_ms: u64, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Chunks(chunks), logger).with_delay(delay_ms)
    }

    /// Create an error-producing provider
    pub fn error(message: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(
            MockMode::Error {
                message: message.into(),
                delay_chunks: 0,
            },
            logger,
        )
    }

    /// Create a provider that proposes the given tool calls
    pub fn tool_calls(calls: Vec<ToolCall>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::ToolCalls(calls), logger)
    }

    /// Create a provider that emits a fixed chunk script
    pub fn script(chunks: Vec<StreamChunk>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Script(chunks), logger)
    }

    /// Create a keyword-routing provider
    pub fn intent(routes: Vec<MockRoute>, fallback: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(
            MockMode::Intent {
                routes,
                fallback: fallback.into(),
            },
            logger,
        )
    }

    /// Keyword-routing provider over the portfolio routing table
    pub fn portfolio(logger: Arc<dyn Logger>) -> Self {
        let routes = crate::tools::INTENT_ROUTES.iter().map(MockRoute::from).collect();
        Self::intent(
            routes,
            "Hey there! 👋 Ask me about my projects, skills, résumé, or what I do for fun. What would you like to know?",
            logger,
        )
    }

    /// Set chunk delay
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.config.chunk_delay_ms = delay_ms;
        self
    }

    /// Set chunk size for splitting responses
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Extract last user message content
    fn get_last_user_message(&self, messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::User)
            .map(ChatMessage::flatten_text)
            .find(|text| !text.is_empty())
            .unwrap_or_else(|| "Hello from MockProvider!".to_string())
    }

    /// Split text into chunks
    fn split_into_chunks(&self, text: &str) -> Vec<String> {
        if self.config.chunk_size == 0 || text.is_empty() {
            return vec![text.to_string()];
        }

        text.chars()
            .collect::<Vec<_>>()
            .chunks(self.config.chunk_size)
            .map(|c| c.iter().collect())
            .collect()
    }

    fn text_steps(&self, text: &str) -> Vec<Step> {
        self.split_into_chunks(text)
            .into_iter()
            .map(|t| Step::Chunk(StreamChunk::text(t)))
            .collect()
    }

    /// Pick the route for the last user message, if the request offers its tool
    fn route<'r>(
        &self,
        routes: &'r [MockRoute],
        messages: &[ChatMessage],
        options: &StreamChatOptions,
    ) -> Option<&'r MockRoute> {
        let words = words(&self.get_last_user_message(messages));
        let offered = |tool: &str| {
            options
                .tools
                .as_ref()
                .is_some_and(|tools| tools.iter().any(|t| t.name == tool))
        };

        routes
            .iter()
            .find(|r| r.matches(&words))
            .filter(|r| offered(&r.tool))
    }

    fn steps(&self, messages: &[ChatMessage], options: &StreamChatOptions) -> Vec<Step> {
        match &self.config.mode {
            MockMode::Echo => {
                let user_msg = self.get_last_user_message(messages);
                self.logger.debug(&format!("[MockProvider] Echo mode, echoing: {}", user_msg));
                self.text_steps(&format!("Echo: {}", user_msg))
            }
            MockMode::Fixed(response) => {
                self.logger.debug(&format!("[MockProvider] Fixed mode, response len: {}", response.len()));
                self.text_steps(response)
            }
            MockMode::Chunks(chunks) => {
                self.logger.debug(&format!("[MockProvider] Chunks mode, {} chunks", chunks.len()));
                chunks.iter().map(|c| Step::Chunk(StreamChunk::text(c.clone()))).collect()
            }
            MockMode::Empty => {
                self.logger.debug("[MockProvider] Empty mode");
                vec![]
            }
            MockMode::Error { message, delay_chunks } => {
                self.logger.debug(&format!("[MockProvider] Error mode after {} chunks", delay_chunks));
                let mut steps: Vec<Step> = (0..*delay_chunks)
                    .map(|i| Step::Chunk(StreamChunk::text(format!("Chunk {} before error. ", i))))
                    .collect();
                steps.push(Step::Fail(message.clone()));
                steps
            }
            MockMode::ToolCalls(calls) => {
                self.logger.debug(&format!("[MockProvider] Tool call mode, {} calls", calls.len()));
                calls.iter().map(|c| Step::Chunk(StreamChunk::tool_call(c.clone()))).collect()
            }
            MockMode::Script(chunks) => chunks.iter().cloned().map(Step::Chunk).collect(),
            MockMode::Intent { routes, fallback } => match self.route(routes, messages, options) {
                Some(route) => {
                    let n = self.call_counter.fetch_add(1, Ordering::Relaxed) + 1;
                    self.logger.debug(&format!("[MockProvider] Intent routed to {}", route.tool));
                    vec![Step::Chunk(StreamChunk::tool_call(ToolCall::no_args(
                        format!("mock-call-{}", n),
                        route.tool.clone(),
                    )))]
                }
                None => self.text_steps(fallback),
            },
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_api_base(&self) -> &str {
        "http://localhost:0/mock"
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            id: "mock".to_string(),
            display_name: "Mock Provider".to_string(),
            default_api_base: self.default_api_base().to_string(),
            requires_api_key: false,
            default_models: vec![
                DefaultModel {
                    id: "portfolio-intent".to_string(),
                    name: "Keyword Intent Router".to_string(),
                    context_length: 128000,
                    capabilities: ModelCapabilities::full(),
                },
                DefaultModel {
                    id: "mock-echo".to_string(),
                    name: "Mock Echo".to_string(),
                    context_length: 128000,
                    capabilities: ModelCapabilities::streaming_only(),
                },
            ],
        }
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        _model: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        self.logger.debug("[MockProvider] stream_chat called");

        let steps = self.steps(&messages, &options);
        let delay_ms = self.config.chunk_delay_ms;
        let logger = self.logger.clone();

        let stream = stream::iter(steps.into_iter().enumerate()).then(move |(i, step)| {
            let logger = logger.clone();
            let cancel = cancel_token.clone();
            async move {
                // Apply delay (except for first chunk), waking early on cancel
                if i > 0 && delay_ms > 0 {
                    tokio::select! {
                        _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
                        _ = cancel.cancelled() => {}
                    }
                }

                if cancel.is_cancelled() {
                    return Err(ProviderError::Cancelled);
                }

                match step {
                    Step::Chunk(chunk) => {
                        logger.debug(&format!("[MockProvider] Yielding chunk {}", i));
                        Ok(chunk)
                    }
                    Step::Fail(message) => Err(ProviderError::Other(format!("Mock error: {}", message))),
                }
            }
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::types::Tool;
    use futures::StreamExt;

    fn test_logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    fn test_messages(content: &str) -> Vec<ChatMessage> {
        vec![ChatMessage::user(content)]
    }

    fn test_config() -> ProviderModelConfig {
        ProviderModelConfig::new("mock-echo")
    }

    fn test_options() -> StreamChatOptions {
        StreamChatOptions::default()
    }

    fn with_tools(names: &[&str]) -> StreamChatOptions {
        StreamChatOptions::new().with_tools(names.iter().map(|n| Tool::new(*n, "")).collect())
    }

    async fn collect(provider: &MockProvider, messages: Vec<ChatMessage>, options: StreamChatOptions) -> Vec<StreamChunk> {
        let mut stream = provider
            .stream_chat(messages, test_config(), options, CancellationToken::new())
            .await
            .expect("stream should start");

        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.push(chunk.expect("chunk should succeed"));
        }
        out
    }

    fn text_of(chunk: &StreamChunk) -> Option<&str> {
        match chunk {
            StreamChunk::Text { text } => Some(text),
            _ => None,
        }
    }

    fn call_of(chunk: &StreamChunk) -> Option<&ToolCall> {
        match chunk {
            StreamChunk::ToolCall { tool_call } => Some(tool_call),
            _ => None,
        }
    }

    fn all_text(chunks: &[StreamChunk]) -> bool {
        chunks.iter().all(|c| text_of(c).is_some())
    }

    fn joined_text(chunks: &[StreamChunk]) -> String {
        chunks.iter().filter_map(text_of).collect()
    }

    #[tokio::test]
    async fn test_echo_mode() {
        let provider = MockProvider::echo(test_logger());
        let chunks = collect(&provider, test_messages("Hello, world!"), test_options()).await;
        assert!(joined_text(&chunks).contains("Hello, world!"), "Should echo the message");
    }

    #[tokio::test]
    async fn test_fixed_mode() {
        let provider = MockProvider::fixed("This is a test response.", test_logger());
        let chunks = collect(&provider, test_messages("Anything"), test_options()).await;
        assert_eq!(joined_text(&chunks), "This is a test response.");
    }

    #[tokio::test]
    async fn test_chunked_mode() {
        let expected = vec!["First ".to_string(), "second ".to_string(), "third.".to_string()];
        let provider = MockProvider::chunked(expected.clone(), 0, test_logger());
        let chunks = collect(&provider, test_messages("Anything"), test_options()).await;
        let received: Vec<String> = chunks.iter().filter_map(|c| text_of(c).map(String::from)).collect();
        assert_eq!(received, expected);
    }

    #[tokio::test]
    async fn test_error_mode() {
        let provider = MockProvider::error("Test error message", test_logger());
        let mut stream = provider
            .stream_chat(test_messages("Anything"), test_config(), test_options(), CancellationToken::new())
            .await
            .expect("stream should start");

        let result = stream.next().await;
        assert!(matches!(result, Some(Err(ProviderError::Other(_)))));
    }

    #[tokio::test]
    async fn test_tool_calls_mode() {
        let calls = vec![
            ToolCall::no_args("a", "getSkills"),
            ToolCall::no_args("b", "getResume"),
        ];
        let provider = MockProvider::tool_calls(calls.clone(), test_logger());
        let chunks = collect(&provider, test_messages("Anything"), test_options()).await;
        let received: Vec<ToolCall> = chunks.iter().filter_map(|c| call_of(c).cloned()).collect();
        assert_eq!(received, calls);
    }

    #[tokio::test]
    async fn test_intent_routes_to_offered_tool() {
        let provider = MockProvider::portfolio(test_logger());
        let chunks = collect(
            &provider,
            test_messages("What are your skills?"),
            with_tools(&["getSkills", "getProjects"]),
        )
        .await;

        assert_eq!(chunks.len(), 1);
        let call = call_of(&chunks[0]).unwrap();
        assert_eq!(call.name, "getSkills");
        assert_eq!(call.id, "mock-call-1");
    }

    #[tokio::test]
    async fn test_intent_falls_back_to_text() {
        let provider = MockProvider::portfolio(test_logger());

        // No keyword
        let chunks = collect(&provider, test_messages("hello"), with_tools(&["getSkills"])).await;
        assert!(all_text(&chunks));
        assert!(joined_text(&chunks).starts_with("Hey there!"));

        // Keyword, but the tool is not offered
        let chunks = collect(&provider, test_messages("your skills?"), test_options()).await;
        assert!(all_text(&chunks));
    }

    #[tokio::test]
    async fn test_intent_matches_whole_words() {
        let provider = MockProvider::portfolio(test_logger());
        let all_tools = with_tools(&[
            "getProjects", "getResume", "getContact", "getPresentation",
            "getSkills", "getInternship", "getCrazy",
        ]);

        for question in ["What functions do you like writing?", "Any international experience?"] {
            let chunks = collect(&provider, test_messages(question), all_tools.clone()).await;
            assert!(all_text(&chunks), "{} should not route to a tool", question);
        }

        let routed = [
            ("Any interns on your team?", "getInternship"),
            ("What do you do for fun?", "getCrazy"),
            ("What are you good at?", "getSkills"),
            ("Show me the robots", "getProjects"),
        ];
        for (question, tool) in routed {
            let chunks = collect(&provider, test_messages(question), all_tools.clone()).await;
            assert_eq!(call_of(&chunks[0]).map(|c| c.name.as_str()), Some(tool), "{}", question);
        }
    }

    #[test]
    fn test_words_split_on_punctuation() {
        assert_eq!(words("Your résumé, please!"), vec!["your", "résumé", "please"]);
    }

    #[tokio::test]
    async fn test_intent_ids_are_unique() {
        let provider = MockProvider::portfolio(test_logger());
        let first = collect(&provider, test_messages("resume please"), with_tools(&["getResume"])).await;
        let second = collect(&provider, test_messages("resume please"), with_tools(&["getResume"])).await;
        assert_ne!(
            call_of(&first[0]).unwrap().id,
            call_of(&second[0]).unwrap().id
        );
    }

    #[tokio::test]
    async fn test_cancellation() {
        let provider = MockProvider::fixed("Long response that should be cancelled", test_logger())
            .with_delay(100);
        let cancel = CancellationToken::new();

        let mut stream = provider
            .stream_chat(test_messages("Anything"), test_config(), test_options(), cancel.clone())
            .await
            .expect("stream should start");

        // Get first chunk
        assert!(matches!(stream.next().await, Some(Ok(_))));

        cancel.cancel();

        // Next chunk reports cancellation instead of text
        assert!(matches!(stream.next().await, Some(Err(ProviderError::Cancelled))));
    }

    #[test]
    fn test_provider_metadata() {
        let provider = MockProvider::new(test_logger());

        assert_eq!(provider.name(), "mock");
        assert!(!provider.metadata().requires_api_key);
        assert!(provider.metadata().supports_tools());
    }

    #[test]
    fn test_chunk_splitting() {
        let provider = MockProvider::new(test_logger()).with_chunk_size(5);
        let chunks = provider.split_into_chunks("Hello, world!");

        assert_eq!(chunks, vec!["Hello", ", wor", "ld!"]);
    }
}
