//! Secret service implementation.
//!
//! Reads the Gemini API key from `secret.json`; an environment variable
//! takes precedence over the file when set.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use agrovision_core::AgroError;
use agrovision_core::config::{GeminiConfig, SecretConfig};
use agrovision_core::error::Result;
use agrovision_core::secret::SecretService;

use crate::paths::AgroPaths;

/// Environment variables checked for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Service for managing secret configuration.
///
/// The parsed configuration is cached after the first successful load.
#[derive(Clone)]
pub struct SecretServiceImpl {
    path: PathBuf,
    read_env: bool,
    secrets: Arc<RwLock<Option<SecretConfig>>>,
}

impl SecretServiceImpl {
    /// Uses the default `secret.json` location and honours the environment.
    pub fn new(paths: &AgroPaths) -> Result<Self> {
        let path = paths
            .secret_file()
            .map_err(|e| AgroError::config(e.to_string()))?;
        Ok(Self {
            path,
            read_env: true,
            secrets: Arc::new(RwLock::new(None)),
        })
    }

    /// Reads only the given file (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            read_env: false,
            secrets: Arc::new(RwLock::new(None)),
        }
    }

    async fn read_file(&self) -> Result<SecretConfig> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(SecretConfig::default());
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| AgroError::config(format!("Failed to read secret file: {}", e.kind())))?;

        if content.trim().is_empty() {
            return Ok(SecretConfig::default());
        }

        // serde_json errors can quote input; keep only the position
        serde_json::from_str(&content).map_err(|e| {
            AgroError::config(format!(
                "Failed to parse secret file at line {}, column {}",
                e.line(),
                e.column()
            ))
        })
    }

    fn env_api_key() -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        if let Some(cached) = self.secrets.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let mut config = self.read_file().await?;

        if self.read_env
            && let Some(api_key) = Self::env_api_key()
        {
            tracing::debug!("Using Gemini API key from environment");
            let model_name = config.gemini.and_then(|g| g.model_name);
            config.gemini = Some(GeminiConfig {
                api_key,
                model_name,
            });
        }

        *self.secrets.write().await = Some(config.clone());
        Ok(config)
    }

    async fn secret_file_exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_yields_empty_config() {
        let temp_dir = TempDir::new().unwrap();
        let service = SecretServiceImpl::with_path(temp_dir.path().join("secret.json"));

        assert!(!service.secret_file_exists().await);
        let secrets = service.load_secrets().await.unwrap();
        assert!(secrets.gemini.is_none());
    }

    #[tokio::test]
    async fn test_reads_gemini_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(
            &path,
            r#"{ "gemini": { "api_key": "test-key", "model_name": "gemini-2.5-flash" } }"#,
        )
        .unwrap();
        let service = SecretServiceImpl::with_path(path);

        let gemini = service.load_secrets().await.unwrap().gemini.unwrap();
        assert_eq!(gemini.api_key, "test-key");
        assert_eq!(gemini.model_name.as_deref(), Some("gemini-2.5-flash"));
    }

    #[tokio::test]
    async fn test_parse_error_does_not_echo_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, r#"{ "gemini": { "api_key": "sk-leak"#).unwrap();
        let service = SecretServiceImpl::with_path(path);

        let err = service.load_secrets().await.unwrap_err();
        assert!(matches!(err, AgroError::Config(_)));
        assert!(!err.to_string().contains("sk-leak"));
    }

    #[tokio::test]
    async fn test_result_is_cached() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, r#"{ "gemini": { "api_key": "first" } }"#).unwrap();
        let service = SecretServiceImpl::with_path(path.clone());

        service.load_secrets().await.unwrap();
        std::fs::write(&path, r#"{ "gemini": { "api_key": "second" } }"#).unwrap();

        let gemini = service.load_secrets().await.unwrap().gemini.unwrap();
        assert_eq!(gemini.api_key, "first");
    }
}
