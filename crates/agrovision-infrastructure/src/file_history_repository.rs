//! File-based history repository.
//!
//! File location: `{data_dir}/history.json`

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use agrovision_core::AgroError;
use agrovision_core::error::Result;
use agrovision_core::history::{HistoryRepository, ScanRecord};

use crate::dto::{StoredScanRecord, records_from_dtos, records_to_dtos};
use crate::paths::AgroPaths;
use crate::storage::{AtomicJsonError, AtomicJsonFile};

/// Stores the full history as one JSON array, replaced atomically on save.
pub struct FileHistoryRepository {
    file: Arc<AtomicJsonFile<Vec<StoredScanRecord>>>,
}

impl FileHistoryRepository {
    /// Creates a repository at the default history location.
    pub fn new(paths: &AgroPaths) -> Result<Self> {
        let path = paths
            .history_file()
            .map_err(|e| AgroError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a repository backed by a custom file (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path)),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }
}

fn map_load_error(err: AtomicJsonError) -> AgroError {
    match err {
        AtomicJsonError::ParseError(e) => {
            AgroError::storage_read(format!("history file is not valid: {e}"))
        }
        AtomicJsonError::IoError(e) => {
            AgroError::storage_read(format!("history file cannot be read: {e}"))
        }
        other => AgroError::storage_read(other.to_string()),
    }
}

#[async_trait]
impl HistoryRepository for FileHistoryRepository {
    async fn load_all(&self) -> Result<Vec<ScanRecord>> {
        let file = Arc::clone(&self.file);
        let dtos = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| AgroError::internal(format!("history load task failed: {e}")))?
            .map_err(map_load_error)?;

        Ok(dtos.map(records_from_dtos).unwrap_or_default())
    }

    async fn save_all(&self, records: &[ScanRecord]) -> Result<()> {
        let file = Arc::clone(&self.file);
        let dtos = records_to_dtos(records);
        tokio::task::spawn_blocking(move || file.save(&dtos))
            .await
            .map_err(|e| AgroError::internal(format!("history save task failed: {e}")))?
            .map_err(|e| AgroError::storage(format!("failed to write history: {e}")))?;

        tracing::debug!(count = records.len(), "history persisted");
        Ok(())
    }
}
