//! Scan record DTOs
//!
//! ## Version History
//! - **1**: Flat JSON array of records, newest first, camelCase fields

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use agrovision_core::AgroError;
use agrovision_core::diagnosis::{Diagnosis, DiagnosisStatus, Recommendations};
use agrovision_core::history::ScanRecord;

// ============================================================================
// Diagnosis DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsV1 {
    pub organic: Vec<String>,
    pub chemical: Vec<String>,
    pub prevention: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisV1 {
    pub plant_name: String,
    pub scientific_name: String,
    pub condition: String,
    pub status: DiagnosisStatus,
    pub confidence: f64,
    pub symptoms: Vec<String>,
    pub cause: String,
    pub recommendations: RecommendationsV1,
    pub summary: String,
}

impl From<&Diagnosis> for DiagnosisV1 {
    fn from(diagnosis: &Diagnosis) -> Self {
        DiagnosisV1 {
            plant_name: diagnosis.plant_name.clone(),
            scientific_name: diagnosis.scientific_name.clone(),
            condition: diagnosis.condition.clone(),
            status: diagnosis.status,
            confidence: diagnosis.confidence,
            symptoms: diagnosis.symptoms.clone(),
            cause: diagnosis.cause.clone(),
            recommendations: RecommendationsV1 {
                organic: diagnosis.recommendations.organic.clone(),
                chemical: diagnosis.recommendations.chemical.clone(),
                prevention: diagnosis.recommendations.prevention.clone(),
            },
            summary: diagnosis.summary.clone(),
        }
    }
}

impl From<DiagnosisV1> for Diagnosis {
    fn from(dto: DiagnosisV1) -> Self {
        Diagnosis {
            plant_name: dto.plant_name,
            scientific_name: dto.scientific_name,
            condition: dto.condition,
            status: dto.status,
            confidence: dto.confidence,
            symptoms: dto.symptoms,
            cause: dto.cause,
            recommendations: Recommendations {
                organic: dto.recommendations.organic,
                chemical: dto.recommendations.chemical,
                prevention: dto.recommendations.prevention,
            },
            summary: dto.summary,
        }
    }
}

// ============================================================================
// ScanRecord DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecordV1 {
    pub id: String,
    pub timestamp: i64,
    pub image: String,
    pub diagnosis: DiagnosisV1,
}

impl From<&ScanRecord> for ScanRecordV1 {
    fn from(record: &ScanRecord) -> Self {
        ScanRecordV1 {
            id: record.id.clone(),
            timestamp: record.timestamp,
            image: record.image.clone(),
            diagnosis: (&record.diagnosis).into(),
        }
    }
}

/// One element of the stored array.
///
/// Elements that do not have the record shape deserialize as raw JSON, so a
/// single damaged entry does not make the whole document unreadable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredScanRecord {
    V1(ScanRecordV1),
    Unrecognized(serde_json::Value),
}

/// Stored records are re-validated on the way in.
impl TryFrom<ScanRecordV1> for ScanRecord {
    type Error = AgroError;

    fn try_from(dto: ScanRecordV1) -> Result<Self, Self::Error> {
        if dto.id.trim().is_empty() {
            return Err(AgroError::storage_read("stored record has an empty id"));
        }

        let diagnosis: Diagnosis = dto.diagnosis.into();
        diagnosis.validate().map_err(|e| {
            AgroError::storage_read(format!("stored record '{}' is invalid: {}", dto.id, e))
        })?;

        Ok(ScanRecord {
            id: dto.id,
            timestamp: dto.timestamp,
            image: dto.image,
            diagnosis,
        })
    }
}

/// Converts a stored document back into domain records.
///
/// Unrecognized or invalid entries are skipped. When an id repeats, the
/// first (newest) entry wins.
pub fn records_from_dtos(entries: Vec<StoredScanRecord>) -> Vec<ScanRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let dto = match entry {
            StoredScanRecord::V1(dto) => dto,
            StoredScanRecord::Unrecognized(_) => {
                tracing::warn!(index, "Skipping stored history entry with unknown shape");
                continue;
            }
        };

        let record = match ScanRecord::try_from(dto) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(index, error = %err, "Skipping invalid stored history entry");
                continue;
            }
        };

        if !seen.insert(record.id.clone()) {
            tracing::warn!(
                index,
                id = %record.id,
                "Skipping stored history entry with repeated id"
            );
            continue;
        }
        records.push(record);
    }

    records
}

pub fn records_to_dtos(records: &[ScanRecord]) -> Vec<StoredScanRecord> {
    records
        .iter()
        .map(|record| StoredScanRecord::V1(record.into()))
        .collect()
}
