//! Scan record domain model.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diagnosis::Diagnosis;
use crate::image::ImagePayload;

/// One completed scan: the photo and the diagnosis it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    /// Unique identifier (UUID v4), fixed at creation.
    pub id: String,
    /// Creation instant in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// The photo as a `data:` URL.
    pub image: String,
    pub diagnosis: Diagnosis,
}

impl ScanRecord {
    /// Creates a record with a fresh id and the current time.
    pub fn new(image: &ImagePayload, diagnosis: Diagnosis) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            image: image.to_data_url(),
            diagnosis,
        }
    }
}
