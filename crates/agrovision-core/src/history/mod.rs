//! Scan history domain models and repository traits.
//!
//! The history is an ordered list of scan records, newest first.

mod model;
mod repository;
mod summary;

pub use model::ScanRecord;
pub use repository::HistoryRepository;
pub use summary::{DashboardSummary, RECENT_SCAN_LIMIT};
