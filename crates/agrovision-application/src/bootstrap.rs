//! Composition root: resolves paths, reads configuration and secrets, and
//! wires the concrete services into an [`AgroVisionApp`].

use std::path::Path;
use std::sync::Arc;

use agrovision_core::AgroError;
use agrovision_core::capture::CameraDevice;
use agrovision_core::config::AppSettings;
use agrovision_core::secret::SecretService;
use agrovision_infrastructure::{
    AgroPaths, FileHistoryRepository, SecretServiceImpl, SettingsService,
};
use agrovision_interaction::GeminiDiagnosisClient;
use anyhow::{Context, Result};

use crate::app::AgroVisionApp;
use crate::history_store::HistoryStore;

pub struct AppBootstrap {
    pub app: AgroVisionApp,
    pub paths: AgroPaths,
    pub settings: AppSettings,
}

impl AppBootstrap {
    /// Builds the app from the standard locations, honouring the API key
    /// environment variables. `base_dir` relocates every file under one
    /// directory.
    pub async fn initialize(
        base_dir: Option<&Path>,
        camera: Arc<dyn CameraDevice>,
    ) -> Result<Self> {
        let paths = AgroPaths::new(base_dir);
        let secrets = SecretServiceImpl::new(&paths)?;
        Self::initialize_with(paths, &secrets, camera).await
    }

    pub async fn initialize_with(
        paths: AgroPaths,
        secrets: &dyn SecretService,
        camera: Arc<dyn CameraDevice>,
    ) -> Result<Self> {
        let settings = SettingsService::new(&paths)?
            .get_settings()
            .context("Failed to load settings")?;

        if !secrets.secret_file_exists().await {
            let path = paths
                .ensure_secret_file()
                .context("Failed to create secret file template")?;
            tracing::info!(
                "[Bootstrap] Created secret file template at {}",
                path.display()
            );
        }

        let gemini = secrets
            .load_secrets()
            .await?
            .gemini
            .filter(|gemini| !gemini.api_key.trim().is_empty())
            .ok_or_else(|| {
                AgroError::config(
                    "Gemini API key is not configured. Set GEMINI_API_KEY or add it to secret.json",
                )
            })?;

        let mut client = GeminiDiagnosisClient::new(gemini.api_key, &settings.diagnosis)?;
        if let Some(model) = gemini.model_name.filter(|model| !model.trim().is_empty()) {
            client = client.with_model(model);
        }
        tracing::info!("[Bootstrap] Diagnosis model: {}", client.model());

        let repository = FileHistoryRepository::new(&paths)?;
        tracing::info!("[Bootstrap] History file: {}", repository.path().display());
        let history = Arc::new(HistoryStore::open(Arc::new(repository)).await);

        let app = AgroVisionApp::new(history, Arc::new(client), camera);
        Ok(Self {
            app,
            paths,
            settings,
        })
    }
}
