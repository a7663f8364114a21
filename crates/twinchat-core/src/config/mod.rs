//! Configuration provider abstractions
//!
//! Supports multiple configuration sources:
//! - `MemoryConfigProvider`: In-memory for testing
//! - `FileConfigProvider`: YAML file-based (user/workspace level)

mod traits;
mod settings;
mod memory;
mod file;

pub use traits::{ConfigProvider, ConfigError, ConfigResult};
pub use settings::{Settings, ModelSettings, LoggingSettings, DEFAULT_PROVIDER, DEFAULT_MODEL};
pub use memory::MemoryConfigProvider;
pub use file::{FileConfigProvider, ConfigLevel};
