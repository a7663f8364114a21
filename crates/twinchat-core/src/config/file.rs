//! File-based configuration provider (YAML)
//!
//! Supports user-level (~/.config/twinchat/config.yaml) and workspace-level (.config/twinchat/config.yaml) config.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;

use super::settings::Settings;
use super::traits::{ConfigProvider, ConfigResult};

/// Config level (user or workspace)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// User-level config (~/.config/twinchat/config.yaml)
    User,
    /// Workspace-level config (.config/twinchat/config.yaml in workspace root)
    Workspace,
    /// An explicit path given on the command line
    Explicit,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
            ConfigLevel::Explicit => "explicit",
        }
    }
}

/// File-based configuration provider
///
/// Reads and writes settings from a YAML file. A missing file is not an
/// error: it loads as default settings.
///
/// # Example
///
/// ```no_run
/// use twinchat_core::config::FileConfigProvider;
///
/// // User-level config
/// let user_config = FileConfigProvider::user();
///
/// // Workspace-level config
/// let workspace_config = FileConfigProvider::workspace("/path/to/workspace");
/// ```
pub struct FileConfigProvider {
    path: PathBuf,
    level: ConfigLevel,
    cache: RwLock<Option<Settings>>,
}

impl FileConfigProvider {
    /// Create a new file config provider for a specific path
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
            cache: RwLock::new(None),
        }
    }

    /// Create a user-level config provider (~/.config/twinchat/config.yaml)
    pub fn user() -> Self {
        // XDG config directory (~/.config on Linux, ~/Library/Application Support on macOS)
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        let path = config_dir.join("twinchat").join("config.yaml");
        Self::new(path, ConfigLevel::User)
    }

    /// Create a workspace-level config provider (.config/twinchat/config.yaml)
    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root.as_ref().join(".config").join("twinchat").join("config.yaml");
        Self::new(path, ConfigLevel::Workspace)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the config level
    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    /// Check if the config file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read settings from disk, bypassing the cache
    fn read_file(&self) -> ConfigResult<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)?;
        Settings::from_yaml_str(&content)
    }

    /// Write settings to disk and refresh the cache
    fn write_file(&self, settings: &Settings) -> ConfigResult<()> {
        settings.validate()?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, settings.to_yaml_string()?)?;

        self.store_cache(settings.clone());
        Ok(())
    }

    fn store_cache(&self, settings: Settings) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        *cache = Some(settings);
    }

    /// Get cached or load settings
    fn get_settings(&self) -> ConfigResult<Settings> {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(settings) = cache.as_ref() {
                return Ok(settings.clone());
            }
        }

        let settings = self.read_file()?;
        self.store_cache(settings.clone());
        Ok(settings)
    }

    /// Create a backup of the current config file
    pub fn backup(&self) -> ConfigResult<Option<PathBuf>> {
        if !self.exists() {
            return Ok(None);
        }

        let backup_path = self.path.with_extension("yaml.backup");
        fs::copy(&self.path, &backup_path)?;
        Ok(Some(backup_path))
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn load(&self) -> ConfigResult<Settings> {
        self.get_settings()
    }

    async fn save(&self, settings: &Settings) -> ConfigResult<()> {
        self.write_file(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let provider = FileConfigProvider::new(dir.path().join("config.yaml"), ConfigLevel::User);

        assert!(!provider.exists());
        assert_eq!(provider.load().await.unwrap(), Settings::default());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let provider = FileConfigProvider::new(&path, ConfigLevel::User);

        let mut settings = Settings::default();
        settings.model.provider = "openai".into();
        settings.model.model = "gpt-4o-mini".into();
        provider.save(&settings).await.unwrap();

        // File should exist now
        assert!(provider.exists());

        // A fresh provider reads the same values back
        let fresh = FileConfigProvider::new(&path, ConfigLevel::User);
        assert_eq!(fresh.load().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_yaml_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let provider = FileConfigProvider::new(&path, ConfigLevel::User);

        let mut settings = Settings::default();
        settings.model.provider = "anthropic".into();
        settings.logging.level = "twinchat=debug".into();
        provider.save(&settings).await.unwrap();

        // Check YAML content is readable
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("provider: anthropic"));
        assert!(content.contains("twinchat=debug"));
        assert!(!content.contains("api_base"));
    }

    #[tokio::test]
    async fn test_invalid_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "model:\n  temperature: 9\n").unwrap();

        let provider = FileConfigProvider::new(&path, ConfigLevel::Explicit);
        assert!(matches!(provider.load().await, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_paths() {
        let provider = FileConfigProvider::workspace("/tmp/ws");
        assert_eq!(provider.path(), Path::new("/tmp/ws/.config/twinchat/config.yaml"));
        assert_eq!(provider.level().as_str(), "workspace");
        assert!(FileConfigProvider::user().path().ends_with("twinchat/config.yaml"));
    }

    #[tokio::test]
    async fn test_backup_keeps_previous_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let provider = FileConfigProvider::new(&path, ConfigLevel::User);

        // No backup if file doesn't exist
        assert!(provider.backup().unwrap().is_none());

        fs::write(&path, "model:\n  provider: gemini\n  model: gemini-2.0-flash\n").unwrap();

        let backup_path = provider.backup().unwrap().unwrap();
        assert!(backup_path.to_string_lossy().ends_with("config.yaml.backup"));

        let mut settings = Settings::default();
        settings.model.provider = "ollama".into();
        provider.save(&settings).await.unwrap();

        let previous = FileConfigProvider::new(&backup_path, ConfigLevel::Explicit);
        assert_eq!(previous.load().await.unwrap().model.provider, "gemini");
        assert_eq!(provider.load().await.unwrap().model.provider, "ollama");
    }
}
