//! Tool catalog, argument validation and execution
//!
//! A tool is a named, schema-typed, statically implemented function. The
//! registry is filled once at startup and then shared read-only by every
//! turn:
//!
//! ```rust,ignore
//! use twinchat_core::tools::{portfolio_registry, ToolRegistry};
//!
//! let registry = portfolio_registry(profile, logger)?;
//!
//! // Tools for the model
//! let tools = registry.llm_tools();
//!
//! // Resolve, validate and run the model's choice
//! let result = registry.execute_tool_call(&tool_call).await?;
//! ```

mod error;
mod registry;
mod schema;
mod validator;
pub mod portfolio;

pub use error::ToolError;
pub use registry::{FnExecutor, ToolDefinition, ToolExecutor, ToolRegistry};
pub use schema::{ParamKind, ParamSpec, ParameterSchema};
pub use validator::{validate, validate_schema, ToolArguments};
pub use portfolio::{portfolio_registry, register_portfolio_tools, IntentRoute, INTENT_ROUTES};
