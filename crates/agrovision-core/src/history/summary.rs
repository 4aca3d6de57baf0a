//! Dashboard figures derived from the history.

use serde::Serialize;

use super::model::ScanRecord;

/// How many records the dashboard lists under "Recent Scans".
pub const RECENT_SCAN_LIMIT: usize = 3;

/// Totals and the most recent scans shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_scans: usize,
    /// Records whose diagnosis status is `Infected`.
    pub alerts: usize,
    /// Newest records first, at most [`RECENT_SCAN_LIMIT`].
    pub recent: Vec<ScanRecord>,
}

impl DashboardSummary {
    /// Builds the summary from a newest-first history.
    pub fn from_history(records: &[ScanRecord]) -> Self {
        Self {
            total_scans: records.len(),
            alerts: records.iter().filter(|r| r.diagnosis.is_alert()).count(),
            recent: records.iter().take(RECENT_SCAN_LIMIT).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::DiagnosisStatus;
    use crate::test_support::{healthy_basil, record, tomato_blight};

    #[test]
    fn test_empty_history() {
        let summary = DashboardSummary::from_history(&[]);
        assert_eq!(summary.total_scans, 0);
        assert_eq!(summary.alerts, 0);
        assert!(summary.recent.is_empty());
    }

    #[test]
    fn test_only_infected_counts_as_alert() {
        let mut warning = tomato_blight();
        warning.status = DiagnosisStatus::Warning;

        let records = vec![
            record("a", 4, tomato_blight()),
            record("b", 3, healthy_basil()),
            record("c", 2, warning),
            record("d", 1, tomato_blight()),
        ];
        let summary = DashboardSummary::from_history(&records);

        assert_eq!(summary.total_scans, 4);
        assert_eq!(summary.alerts, 2);
        let recent: Vec<&str> = summary.recent.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(recent, vec!["a", "b", "c"]);
    }
}
