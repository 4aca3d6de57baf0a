//! The scan history service.
//!
//! Owns the in-memory, newest-first list of scan records and keeps it in
//! step with the injected [`HistoryRepository`]. Every mutation computes the
//! next list, persists it, and only then commits it to memory, all under one
//! async lock.

use std::sync::Arc;

use agrovision_core::AgroError;
use agrovision_core::diagnosis::Diagnosis;
use agrovision_core::error::Result;
use agrovision_core::history::{DashboardSummary, HistoryRepository, ScanRecord};
use agrovision_core::image::ImagePayload;
use tokio::sync::Mutex;

pub struct HistoryStore {
    repository: Arc<dyn HistoryRepository>,
    records: Mutex<Vec<ScanRecord>>,
}

impl HistoryStore {
    /// Creates a store with an empty in-memory list. Call [`load`](Self::load)
    /// to read persisted records.
    pub fn new(repository: Arc<dyn HistoryRepository>) -> Self {
        Self {
            repository,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Creates a store and loads the persisted history into it.
    pub async fn open(repository: Arc<dyn HistoryRepository>) -> Self {
        let store = Self::new(repository);
        store.load().await;
        store
    }

    /// Reloads the history from the repository.
    ///
    /// Never fails: unreadable or corrupt data yields an empty history.
    pub async fn load(&self) -> Vec<ScanRecord> {
        let mut records = self.records.lock().await;
        let loaded = match self.repository.load_all().await {
            Ok(loaded) => loaded,
            Err(err) => {
                tracing::warn!(error = %err, "Could not read scan history, starting empty");
                Vec::new()
            }
        };
        tracing::info!(count = loaded.len(), "Scan history loaded");
        *records = loaded.clone();
        loaded
    }

    /// Replaces the whole history.
    pub async fn save(&self, next: Vec<ScanRecord>) -> Result<()> {
        let mut records = self.records.lock().await;
        self.repository.save_all(&next).await?;
        *records = next;
        Ok(())
    }

    /// Prepends a record.
    ///
    /// The record must pass the same checks applied when history is read
    /// back; an invalid diagnosis is refused with its validation error.
    pub async fn insert(&self, record: ScanRecord) -> Result<()> {
        if record.id.trim().is_empty() {
            return Err(AgroError::storage("scan record has an empty id"));
        }
        record.diagnosis.validate()?;

        let mut records = self.records.lock().await;
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(AgroError::DuplicateId { id: record.id });
        }

        let mut next = Vec::with_capacity(records.len() + 1);
        next.push(record);
        next.extend(records.iter().cloned());

        self.repository.save_all(&next).await?;
        tracing::info!(id = %next[0].id, count = next.len(), "Scan record added");
        *records = next;
        Ok(())
    }

    /// Removes the record with `id`. An unknown id is a no-op.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.records.lock().await;
        if !records.iter().any(|record| record.id == id) {
            tracing::debug!(id, "Delete requested for unknown scan record");
            return Ok(());
        }

        let next: Vec<ScanRecord> = records
            .iter()
            .filter(|record| record.id != id)
            .cloned()
            .collect();

        self.repository.save_all(&next).await?;
        tracing::info!(id, count = next.len(), "Scan record deleted");
        *records = next;
        Ok(())
    }

    /// Builds a fresh record for a completed diagnosis and inserts it.
    pub async fn record_scan(
        &self,
        image: &ImagePayload,
        diagnosis: Diagnosis,
    ) -> Result<ScanRecord> {
        let record = ScanRecord::new(image, diagnosis);
        self.insert(record.clone()).await?;
        Ok(record)
    }

    pub async fn records(&self) -> Vec<ScanRecord> {
        self.records.lock().await.clone()
    }

    pub async fn find(&self, id: &str) -> Option<ScanRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    pub async fn summary(&self) -> DashboardSummary {
        DashboardSummary::from_history(&self.records.lock().await)
    }
}
