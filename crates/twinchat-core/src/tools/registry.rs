//! Tool registry for the closed catalog of information tools
//!
//! The ToolRegistry is the central component for:
//! - Holding tool definitions in registration order
//! - Rejecting duplicate names at startup
//! - Converting tools to the model-facing catalog
//! - Resolving, validating and executing a model's tool call

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::logging::Logger;
use crate::types::{Tool, ToolCall, ToolResult};

use super::error::ToolError;
use super::schema::ParameterSchema;
use super::validator::{self, ToolArguments};

/// Executes a tool against validated arguments
///
/// Executors are pure mappings from arguments to output: they never see the
/// conversation and never call back into the model.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Produce the tool's output
    async fn execute(&self, args: &ToolArguments) -> Result<ToolResult, String>;
}

/// Executor backed by a plain function or closure
pub struct FnExecutor<F>(pub F);

#[async_trait]
impl<F> ToolExecutor for FnExecutor<F>
where
    F: Fn(&ToolArguments) -> Result<ToolResult, String> + Send + Sync,
{
    async fn execute(&self, args: &ToolArguments) -> Result<ToolResult, String> {
        (self.0)(args)
    }
}

/// A registered tool
#[derive(Clone)]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,
    /// Description shown to the model for selection
    pub description: String,
    /// Accepted parameters (empty for argument-less tools)
    pub schema: ParameterSchema,
    /// The tool's implementation
    pub executor: Arc<dyn ToolExecutor>,
}

impl ToolDefinition {
    /// Create a tool definition that takes no arguments
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        executor: Arc<dyn ToolExecutor>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema: ParameterSchema::empty(),
            executor,
        }
    }

    /// Create a tool definition from a function
    pub fn from_fn<F>(name: impl Into<String>, description: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ToolArguments) -> Result<ToolResult, String> + Send + Sync + 'static,
    {
        Self::new(name, description, Arc::new(FnExecutor(f)))
    }

    /// Set the parameter schema
    pub fn with_schema(mut self, schema: ParameterSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Model-facing form of this tool
    pub fn to_llm_tool(&self) -> Tool {
        Tool::new(&self.name, &self.description).with_schema(self.schema.to_json_schema())
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("schema", &self.schema)
            .finish()
    }
}

/// Registry of available tools
///
/// Populated at startup and shared read-only afterwards, so concurrent turns
/// can read it without locking.
pub struct ToolRegistry {
    /// Definitions in insertion order
    tools: Vec<ToolDefinition>,
    /// Name -> position in `tools`
    index: HashMap<String, usize>,
    /// Logger
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    /// Create an empty tool registry
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
            logger,
        }
    }

    /// Register a tool. Fails if the name is already taken.
    pub fn register(&mut self, def: ToolDefinition) -> Result<(), ToolError> {
        if self.index.contains_key(&def.name) {
            self.logger.error(&format!(
                "[ToolRegistry] Duplicate tool registration: {}",
                def.name
            ));
            return Err(ToolError::Duplicate(def.name));
        }

        self.logger.debug(&format!("[ToolRegistry] Registered tool: {}", def.name));
        self.index.insert(def.name.clone(), self.tools.len());
        self.tools.push(def);
        Ok(())
    }

    /// Look up a tool by name
    pub fn resolve(&self, name: &str) -> Result<&ToolDefinition, ToolError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::Unknown(name.to_string()))
    }

    /// All tools in registration order
    pub fn list(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Tool names in registration order
    pub fn list_tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    /// Get tools for sending to the model, in registration order
    pub fn llm_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolDefinition::to_llm_tool).collect()
    }

    /// Check whether a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get count of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolve, validate and execute a tool call from the model
    pub async fn execute_tool_call(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let def = self.resolve(&call.name).inspect_err(|_| {
            self.logger.warn(&format!(
                "[ToolRegistry] Model requested unknown tool: {}",
                call.name
            ));
        })?;

        let args = validator::validate(def, &call.input).inspect_err(|e| {
            self.logger.warn(&format!("[ToolRegistry] {}", e));
        })?;

        self.logger.info(&format!("[ToolRegistry] Calling tool: {}", def.name));

        def.executor.execute(&args).await.map_err(|message| {
            self.logger.error(&format!(
                "[ToolRegistry] Tool {} failed: {}",
                def.name, message
            ));
            ToolError::executor(&def.name, message)
        })
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_tool_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::tools::schema::{ParamKind, ParamSpec};
    use serde_json::json;

    fn registry() -> ToolRegistry {
        ToolRegistry::new(Arc::new(NoOpLogger::new()))
    }

    fn static_tool(name: &str, text: &'static str) -> ToolDefinition {
        ToolDefinition::from_fn(name, format!("Returns {}", name), move |_| Ok(ToolResult::text(text)))
    }

    #[test]
    fn test_register_and_resolve() {
        let mut reg = registry();
        reg.register(static_tool("getSkills", "skills")).unwrap();

        let def = reg.resolve("getSkills").unwrap();
        assert_eq!(def.name, "getSkills");
        assert_eq!(reg.len(), 1);
        assert!(reg.contains("getSkills"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        for name in ["getSkills", "getProjects", "x"] {
            let mut reg = registry();
            reg.register(static_tool(name, "first")).unwrap();
            let err = reg.register(static_tool(name, "second")).unwrap_err();
            assert_eq!(err, ToolError::Duplicate(name.to_string()));
            assert_eq!(reg.len(), 1);
        }
    }

    #[test]
    fn test_resolve_unknown() {
        let reg = registry();
        assert_eq!(
            reg.resolve("getNonExistentTool").unwrap_err(),
            ToolError::Unknown("getNonExistentTool".to_string())
        );
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut reg = registry();
        for name in ["getProjects", "getResume", "getContact", "getSkills"] {
            reg.register(static_tool(name, "x")).unwrap();
        }

        let expected = vec!["getProjects", "getResume", "getContact", "getSkills"];
        assert_eq!(reg.list_tool_names(), expected);
        // Stable across calls
        assert_eq!(reg.list_tool_names(), expected);
        let llm: Vec<_> = reg.llm_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(llm, expected);
    }

    #[test]
    fn test_llm_tool_carries_schema() {
        let mut reg = registry();
        reg.register(static_tool("getResume", "resume").with_schema(
            ParameterSchema::empty().with(ParamSpec::new("format", "", ParamKind::one_of(["pdf"]))),
        ))
        .unwrap();

        let tool = &reg.llm_tools()[0];
        let schema = tool.input_schema.as_ref().unwrap();
        assert_eq!(schema["properties"]["format"]["enum"], json!(["pdf"]));
    }

    #[tokio::test]
    async fn test_execute_tool_call() {
        let mut reg = registry();
        reg.register(static_tool("getSkills", "Rust, Python")).unwrap();

        let result = reg
            .execute_tool_call(&ToolCall::no_args("c1", "getSkills"))
            .await
            .unwrap();
        assert_eq!(result, ToolResult::text("Rust, Python"));
    }

    #[tokio::test]
    async fn test_execute_rejects_bad_arguments_before_running() {
        let mut reg = registry();
        reg.register(ToolDefinition::from_fn("getSkills", "", |_| {
            panic!("executor must not run on invalid arguments")
        }))
        .unwrap();

        let err = reg
            .execute_tool_call(&ToolCall::new("c1", "getSkills", json!({"verbose": true})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::SchemaMismatch { .. }));
    }

    #[tokio::test]
    async fn test_executor_failure_is_wrapped() {
        let mut reg = registry();
        reg.register(ToolDefinition::from_fn("getResume", "", |_| {
            Err("resume file missing".to_string())
        }))
        .unwrap();

        let err = reg
            .execute_tool_call(&ToolCall::no_args("c1", "getResume"))
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::executor("getResume", "resume file missing"));
    }
}
