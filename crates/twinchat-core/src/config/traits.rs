//! Configuration provider trait

use async_trait::async_trait;

use super::settings::Settings;

/// Configuration provider abstraction
///
/// Implementations:
/// - `MemoryConfigProvider`: In-memory for testing
/// - `FileConfigProvider`: Reads from YAML file (~/.config/twinchat/config.yaml)
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Load the current settings. A missing source yields defaults.
    async fn load(&self) -> ConfigResult<Settings>;

    /// Persist settings
    async fn save(&self, settings: &Settings) -> ConfigResult<()>;
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
