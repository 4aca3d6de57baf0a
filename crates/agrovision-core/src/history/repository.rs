//! History repository trait.

use async_trait::async_trait;

use super::model::ScanRecord;
use crate::error::Result;

/// Persistence port for the scan history.
///
/// The whole ordered sequence is read and written at once; there is no
/// per-record update. Implementations decide where the single serialized
/// blob lives (a file, an in-memory slot, platform key-value storage).
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Loads the persisted sequence, newest first.
    ///
    /// # Returns
    ///
    /// - `Ok(records)`: Stored records, or an empty list when nothing was stored yet
    /// - `Err(AgroError::StorageRead)`: Stored data exists but cannot be parsed
    /// - `Err(_)`: The storage could not be read at all
    async fn load_all(&self) -> Result<Vec<ScanRecord>>;

    /// Replaces the persisted sequence with `records`.
    async fn save_all(&self, records: &[ScanRecord]) -> Result<()>;
}
