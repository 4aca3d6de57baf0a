//! Settings service implementation.
//!
//! Loads `config.toml` and caches it. A missing file is created with the
//! default settings so users have something to edit.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use agrovision_core::AgroError;
use agrovision_core::config::AppSettings;
use agrovision_core::error::Result;

use crate::paths::AgroPaths;

#[derive(Debug, Clone)]
pub struct SettingsService {
    path: PathBuf,
    settings: Arc<RwLock<Option<AppSettings>>>,
}

impl SettingsService {
    pub fn new(paths: &AgroPaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| AgroError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            settings: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the settings, loading from file if not cached.
    pub fn get_settings(&self) -> Result<AppSettings> {
        if let Some(cached) = self
            .settings
            .read()
            .map_err(|e| AgroError::internal(e.to_string()))?
            .as_ref()
        {
            return Ok(cached.clone());
        }

        let loaded = self.load_settings()?;

        *self
            .settings
            .write()
            .map_err(|e| AgroError::internal(e.to_string()))? = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut guard) = self.settings.write() {
            *guard = None;
        }
    }

    fn load_settings(&self) -> Result<AppSettings> {
        if !self.path.exists() {
            let defaults = AppSettings::default();
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&self.path, toml::to_string_pretty(&defaults)?)?;
            tracing::info!(path = %self.path.display(), "Created default settings file");
            return Ok(defaults);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let settings: AppSettings = toml::from_str(&content)?;
        Ok(settings)
    }
}
