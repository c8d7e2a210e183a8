//! Configuration port interface

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Port for persisted configuration (volume, output tree, thresholds, flags)
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load configuration from storage.
    ///
    /// # Returns
    /// The loaded config (all fields None if nothing was saved yet)
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Persist configuration, replacing what was stored.
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Location of the stored configuration.
    fn path(&self) -> PathBuf;

    /// Whether anything has been stored yet.
    fn exists(&self) -> bool;

    /// Store the default configuration.
    /// Fails if a configuration already exists.
    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(
                self.path().to_string_lossy().to_string(),
            ));
        }
        self.save(&AppConfig::defaults()).await
    }

    /// Load, modify and save in one step.
    async fn update<F>(&self, apply: F) -> Result<AppConfig, ConfigError>
    where
        F: FnOnce(&mut AppConfig) -> Result<(), ConfigError> + Send,
    {
        let mut config = self.load().await?;
        apply(&mut config)?;
        self.save(&config).await?;
        Ok(config)
    }
}
