//! The surface a front end drives: current view, selected result, history
//! and the scan session factory.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use agrovision_core::AgroError;
use agrovision_core::capture::{CameraDevice, CaptureConstraints};
use agrovision_core::diagnosis::{Diagnosis, DiagnosisService};
use agrovision_core::error::Result;
use agrovision_core::history::{DashboardSummary, ScanRecord};
use agrovision_core::image::ImagePayload;
use agrovision_core::view::AppView;

use crate::history_store::HistoryStore;
use crate::scan_session::{ScanSession, SessionTicket};

pub struct AgroVisionApp {
    history: Arc<HistoryStore>,
    diagnosis: Arc<dyn DiagnosisService>,
    camera: Arc<dyn CameraDevice>,
    constraints: CaptureConstraints,
    view: AppView,
    selected: Option<ScanRecord>,
    session_active: Arc<AtomicBool>,
}

impl AgroVisionApp {
    pub fn new(
        history: Arc<HistoryStore>,
        diagnosis: Arc<dyn DiagnosisService>,
        camera: Arc<dyn CameraDevice>,
    ) -> Self {
        Self {
            history,
            diagnosis,
            camera,
            constraints: CaptureConstraints::default(),
            view: AppView::Dashboard,
            selected: None,
            session_active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_constraints(mut self, constraints: CaptureConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn view(&self) -> AppView {
        self.view
    }

    pub fn selected_result(&self) -> Option<&ScanRecord> {
        self.selected.as_ref()
    }

    pub fn history_store(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Opens a scan session and switches to the scan view.
    ///
    /// Fails with `InvalidState` while an earlier session is still alive.
    pub fn begin_scan(&mut self) -> Result<ScanSession> {
        let ticket = SessionTicket::acquire(&self.session_active)
            .ok_or_else(|| AgroError::invalid_state("scanning", "begin_scan"))?;

        let session = ScanSession::new(
            Arc::clone(&self.camera),
            Arc::clone(&self.diagnosis),
            Arc::clone(&self.history),
        )
        .with_constraints(self.constraints.clone())
        .with_ticket(ticket);

        self.view = AppView::Scan;
        tracing::info!("Scan session started");
        Ok(session)
    }

    /// Stores a diagnosis produced outside a session and shows it.
    pub async fn complete_scan(
        &mut self,
        image: &ImagePayload,
        diagnosis: Diagnosis,
    ) -> Result<ScanRecord> {
        let record = self.history.record_scan(image, diagnosis).await?;
        self.show_result(record.clone());
        Ok(record)
    }

    /// Shows a record a session has just produced.
    pub fn show_result(&mut self, record: ScanRecord) {
        self.selected = Some(record);
        self.view = AppView::Result;
    }

    /// Shows a record picked from the history list.
    pub async fn select_result(&mut self, id: &str) -> Result<ScanRecord> {
        let record = self
            .history
            .find(id)
            .await
            .ok_or_else(|| AgroError::not_found("ScanRecord", id))?;
        self.show_result(record.clone());
        Ok(record)
    }

    pub async fn delete_history_item(&mut self, id: &str) -> Result<()> {
        self.history.delete(id).await?;
        if self.selected.as_ref().is_some_and(|record| record.id == id) {
            self.selected = None;
            if self.view == AppView::Result {
                self.view = AppView::History;
            }
        }
        Ok(())
    }

    /// Switches views. `Result` without a selection falls back to the dashboard.
    pub fn navigate(&mut self, view: AppView) -> AppView {
        self.view = match view {
            AppView::Result if self.selected.is_none() => AppView::Dashboard,
            other => other,
        };
        tracing::debug!(view = ?self.view, "Navigated");
        self.view
    }

    pub async fn dashboard(&self) -> DashboardSummary {
        self.history.summary().await
    }

    pub async fn history(&self) -> Vec<ScanRecord> {
        self.history.records().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockCamera, MockDiagnosisService, healthy_basil, tomato_blight};
    use agrovision_infrastructure::InMemoryHistoryRepository;

    fn app() -> AgroVisionApp {
        AgroVisionApp::new(
            Arc::new(HistoryStore::new(Arc::new(InMemoryHistoryRepository::new()))),
            Arc::new(MockDiagnosisService::returning(tomato_blight())),
            Arc::new(MockCamera::default()),
        )
    }

    #[test]
    fn test_starts_on_dashboard() {
        let app = app();
        assert_eq!(app.view(), AppView::Dashboard);
        assert!(app.selected_result().is_none());
    }

    #[test]
    fn test_only_one_session_at_a_time() {
        let mut app = app();
        let session = app.begin_scan().unwrap();
        assert_eq!(app.view(), AppView::Scan);

        let err = app.begin_scan().err().unwrap();
        assert_eq!(err, AgroError::invalid_state("scanning", "begin_scan"));

        drop(session);
        assert!(app.begin_scan().is_ok());
    }

    #[tokio::test]
    async fn test_complete_scan_selects_record() {
        let mut app = app();
        let record = app
            .complete_scan(&ImagePayload::jpeg(vec![1]), healthy_basil())
            .await
            .unwrap();

        assert_eq!(app.view(), AppView::Result);
        assert_eq!(app.selected_result(), Some(&record));
        assert_eq!(app.history().await, vec![record]);
    }

    #[tokio::test]
    async fn test_select_unknown_result_is_not_found() {
        let mut app = app();
        let err = app.select_result("nope").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(app.view(), AppView::Dashboard);
    }

    #[tokio::test]
    async fn test_deleting_selected_record_clears_selection() {
        let mut app = app();
        let record = app
            .complete_scan(&ImagePayload::jpeg(vec![1]), tomato_blight())
            .await
            .unwrap();

        app.delete_history_item(&record.id).await.unwrap();
        assert!(app.selected_result().is_none());
        assert_eq!(app.view(), AppView::History);
        assert!(app.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_navigate_to_result_without_selection_falls_back() {
        let mut app = app();
        assert_eq!(app.navigate(AppView::Result), AppView::Dashboard);
        assert_eq!(app.navigate(AppView::History), AppView::History);

        let record = app
            .complete_scan(&ImagePayload::jpeg(vec![1]), tomato_blight())
            .await
            .unwrap();
        app.navigate(AppView::Dashboard);
        app.select_result(&record.id).await.unwrap();
        assert_eq!(app.navigate(AppView::Result), AppView::Result);
    }
}
