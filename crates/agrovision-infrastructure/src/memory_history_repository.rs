//! In-memory history repository.
//!
//! Holds the serialized history as a single text blob, the same document the
//! file repository writes. Useful for ephemeral front ends and tests that
//! need to plant corrupt data.

use async_trait::async_trait;
use std::sync::Mutex;

use agrovision_core::AgroError;
use agrovision_core::error::Result;
use agrovision_core::history::{HistoryRepository, ScanRecord};

use crate::dto::{StoredScanRecord, records_from_dtos, records_to_dtos};

#[derive(Default)]
pub struct InMemoryHistoryRepository {
    blob: Mutex<Option<String>>,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `blob` as the stored document, valid or not.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }

    /// The currently stored document.
    pub fn blob(&self) -> Option<String> {
        self.blob.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn load_all(&self) -> Result<Vec<ScanRecord>> {
        let blob = self
            .blob
            .lock()
            .map_err(|e| AgroError::storage_read(format!("history slot poisoned: {e}")))?
            .clone();

        let Some(blob) = blob.filter(|b| !b.trim().is_empty()) else {
            return Ok(Vec::new());
        };

        let dtos: Vec<StoredScanRecord> = serde_json::from_str(&blob)
            .map_err(|e| AgroError::storage_read(format!("stored history is not valid: {e}")))?;
        Ok(records_from_dtos(dtos))
    }

    async fn save_all(&self, records: &[ScanRecord]) -> Result<()> {
        let json = serde_json::to_string(&records_to_dtos(records))?;
        let mut slot = self
            .blob
            .lock()
            .map_err(|e| AgroError::storage(format!("history slot poisoned: {e}")))?;
        *slot = Some(json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_and_blank_blob_load_as_empty() {
        assert!(InMemoryHistoryRepository::new().load_all().await.unwrap().is_empty());
        assert!(
            InMemoryHistoryRepository::with_blob("")
                .load_all()
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_storage_read_error() {
        let repo = InMemoryHistoryRepository::with_blob("definitely not json");
        assert!(repo.load_all().await.unwrap_err().is_storage_read());
    }

    #[tokio::test]
    async fn test_damaged_entry_does_not_hide_valid_ones() {
        let repo = InMemoryHistoryRepository::with_blob(
            r#"[
                {"id": "broken"},
                {
                    "id": "kept",
                    "timestamp": 1717000000000,
                    "image": "data:image/jpeg;base64,AAAA",
                    "diagnosis": {
                        "plantName": "Mint",
                        "scientificName": "Mentha",
                        "condition": "Healthy",
                        "status": "Healthy",
                        "confidence": 0.9,
                        "symptoms": [],
                        "cause": "None",
                        "recommendations": {"organic": [], "chemical": [], "prevention": []},
                        "summary": "Healthy mint."
                    }
                }
            ]"#,
        );

        let records = repo.load_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "kept");
    }

    #[tokio::test]
    async fn test_save_replaces_blob() {
        let repo = InMemoryHistoryRepository::with_blob("garbage");
        repo.save_all(&[]).await.unwrap();

        assert_eq!(repo.blob().as_deref(), Some("[]"));
        assert!(repo.load_all().await.unwrap().is_empty());
    }
}
