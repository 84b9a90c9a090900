// File: manager/src/config/manager.rs
use super::{Config, SecretsLoader};
use anyhow::{anyhow, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

pub const CLOUD_TOKEN_ENV: &str = "CLOUD_API_TOKEN";
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let config = Self::load_configuration(&config_dir).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/main.toml", config_dir);
        let main_config_content = fs::read_to_string(&main_config_path)
            .await
            .map_err(|e| anyhow!("Failed to read main config {}: {}", main_config_path, e))?;

        let mut config: Config = toml::from_str(&main_config_content)
            .map_err(|e| anyhow!("Failed to parse main config: {}", e))?;

        let secrets_path = format!("{}/secrets.toml", config_dir);
        debug!("Loading secrets from {}", secrets_path);
        let secrets = SecretsLoader::load(Path::new(&secrets_path))?;

        config.cloud.api_token = resolve_token(CLOUD_TOKEN_ENV, secrets.cloud_api_token());
        config.telegram.bot_token = resolve_token(TELEGRAM_TOKEN_ENV, secrets.telegram_bot_token());

        if config.cloud.api_token.is_empty() {
            warn!(
                "No cloud API token configured - set {} or [tokens].cloud_api in secrets.toml",
                CLOUD_TOKEN_ENV
            );
        }
        if config.telegram.bot_token.is_empty() {
            warn!(
                "No Telegram bot token configured - set {} or [tokens].telegram_bot in secrets.toml",
                TELEGRAM_TOKEN_ENV
            );
        }

        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration in {}: {}", main_config_path, e))?;

        info!(
            "Configuration loaded: server {}, chat {}, timezone {}, trigger mode {:?}",
            config.cloud.server_id,
            config.telegram.allowed_chat_id,
            config.timezone,
            config.trigger.mode
        );

        Ok(config)
    }
}

/// Environment wins over the secrets file
fn resolve_token(env_name: &str, from_file: Option<&str>) -> String {
    match std::env::var(env_name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => from_file.unwrap_or_default().to_string(),
    }
}
