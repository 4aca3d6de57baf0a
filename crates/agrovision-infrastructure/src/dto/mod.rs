//! Persisted shapes, kept apart from the domain models so the stored layout
//! can evolve independently.

pub mod scan_record;

pub use scan_record::{
    DiagnosisV1, RecommendationsV1, ScanRecordV1, StoredScanRecord, records_from_dtos,
    records_to_dtos,
};
