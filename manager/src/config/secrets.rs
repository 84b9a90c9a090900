// File: manager/src/config/secrets.rs
//! Secrets loader for API tokens.
//!
//! Tokens are stored in a separate TOML file (config/secrets.toml) that should
//! be excluded from version control. Environment variables take precedence
//! over this file (see `ConfigManager`).
//!
//! Example secrets.toml:
//! ```toml
//! [tokens]
//! cloud_api = "cloud-api-bearer-token"
//! telegram_bot = "123456:bot-token"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Structure matching the secrets.toml file format
#[derive(Debug, Deserialize, Default)]
pub struct SecretsFile {
    #[serde(default)]
    pub tokens: Tokens,
}

#[derive(Debug, Deserialize, Default)]
pub struct Tokens {
    pub cloud_api: Option<String>,
    pub telegram_bot: Option<String>,
}

/// Loader for secrets from the secrets.toml file
pub struct SecretsLoader {
    secrets: SecretsFile,
}

impl SecretsLoader {
    /// Load secrets from the specified file path.
    /// Returns an empty loader if the file doesn't exist.
    pub fn load(secrets_path: &Path) -> Result<Self> {
        if !secrets_path.exists() {
            warn!(
                "Secrets file not found at {:?}, tokens must come from the environment",
                secrets_path
            );
            return Ok(Self {
                secrets: SecretsFile::default(),
            });
        }

        let content = std::fs::read_to_string(secrets_path)
            .with_context(|| format!("Failed to read secrets file: {:?}", secrets_path))?;

        let secrets: SecretsFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse secrets file: {:?}", secrets_path))?;

        info!("Loaded secrets from {:?}", secrets_path);

        Ok(Self { secrets })
    }

    pub fn cloud_api_token(&self) -> Option<&str> {
        self.secrets.tokens.cloud_api.as_deref()
    }

    pub fn telegram_bot_token(&self) -> Option<&str> {
        self.secrets.tokens.telegram_bot.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_secrets() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[tokens]
cloud_api = "cloud-secret"
telegram_bot = "123:abc"
"#
        )
        .unwrap();

        let loader = SecretsLoader::load(file.path()).unwrap();

        assert_eq!(loader.cloud_api_token(), Some("cloud-secret"));
        assert_eq!(loader.telegram_bot_token(), Some("123:abc"));
    }

    #[test]
    fn test_missing_file() {
        let loader = SecretsLoader::load(Path::new("/nonexistent/path/secrets.toml")).unwrap();
        assert_eq!(loader.cloud_api_token(), None);
        assert_eq!(loader.telegram_bot_token(), None);
    }
}
