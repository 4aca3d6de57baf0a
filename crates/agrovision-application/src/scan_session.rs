//! One scan attempt, from camera (or upload) to a stored record.
//!
//! ```text
//! Idle ──start_camera──▶ Capturing ──capture──▶ Analyzing ──▶ Completed
//!  ▲  └──────────────upload────────────────────▲     │
//!  └──────────────── cancel (any state) ───────┴─────┴──▶ Failed
//! ```
//!
//! The camera is held through a [`CameraLease`]; dropping the lease stops
//! the device, so every exit path releases it.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use agrovision_core::AgroError;
use agrovision_core::capture::{CameraDevice, CaptureConstraints};
use agrovision_core::diagnosis::DiagnosisService;
use agrovision_core::error::Result;
use agrovision_core::history::ScanRecord;
use agrovision_core::image::ImagePayload;
use tokio_util::sync::CancellationToken;

use crate::history_store::HistoryStore;

#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    Idle,
    Capturing,
    Analyzing,
    Completed(ScanRecord),
    Failed(AgroError),
}

impl ScanState {
    pub fn name(&self) -> &'static str {
        match self {
            ScanState::Idle => "idle",
            ScanState::Capturing => "capturing",
            ScanState::Analyzing => "analyzing",
            ScanState::Completed(_) => "completed",
            ScanState::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Exclusive hold on the camera. Stops the device when dropped.
struct CameraLease {
    camera: Arc<dyn CameraDevice>,
}

impl CameraLease {
    fn new(camera: Arc<dyn CameraDevice>) -> Self {
        Self { camera }
    }
}

impl Drop for CameraLease {
    fn drop(&mut self) {
        self.camera.stop();
        tracing::debug!("Camera released");
    }
}

/// Marks the owning app's single scan slot as taken until dropped.
pub(crate) struct SessionTicket {
    active: Arc<AtomicBool>,
}

impl SessionTicket {
    /// Takes the slot, or returns `None` when another session holds it.
    pub(crate) fn acquire(active: &Arc<AtomicBool>) -> Option<Self> {
        active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                active: Arc::clone(active),
            })
    }
}

impl Drop for SessionTicket {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

pub struct ScanSession {
    camera: Arc<dyn CameraDevice>,
    diagnosis: Arc<dyn DiagnosisService>,
    history: Arc<HistoryStore>,
    constraints: CaptureConstraints,
    state: ScanState,
    lease: Option<CameraLease>,
    cancel: CancellationToken,
    _ticket: Option<SessionTicket>,
}

impl ScanSession {
    pub fn new(
        camera: Arc<dyn CameraDevice>,
        diagnosis: Arc<dyn DiagnosisService>,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self {
            camera,
            diagnosis,
            history,
            constraints: CaptureConstraints::default(),
            state: ScanState::Idle,
            lease: None,
            cancel: CancellationToken::new(),
            _ticket: None,
        }
    }

    pub fn with_constraints(mut self, constraints: CaptureConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub(crate) fn with_ticket(mut self, ticket: SessionTicket) -> Self {
        self._ticket = Some(ticket);
        self
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn constraints(&self) -> &CaptureConstraints {
        &self.constraints
    }

    pub fn is_camera_active(&self) -> bool {
        self.lease.is_some()
    }

    /// Handle that aborts the running analysis from another task.
    ///
    /// A handle stays valid across [`cancel`](Self::cancel) and failed
    /// attempts until it fires. A token can only fire once: after it has,
    /// the session switches to a new token and earlier handles no longer
    /// reach it. A handle fired while no analysis is running is discarded
    /// when the next analysis starts.
    pub fn cancellation_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Opens the camera with the session's capture constraints.
    pub async fn start_camera(&mut self) -> Result<()> {
        if !matches!(self.state, ScanState::Idle | ScanState::Failed(_)) {
            return Err(AgroError::invalid_state(self.state.name(), "start_camera"));
        }

        // Held before `start` so a half-opened device is still stopped.
        let lease = CameraLease::new(Arc::clone(&self.camera));
        match self.camera.start(&self.constraints).await {
            Ok(()) => {
                self.lease = Some(lease);
                self.state = ScanState::Capturing;
                tracing::info!(facing = ?self.constraints.facing_mode, "Camera started");
                Ok(())
            }
            Err(err) => {
                drop(lease);
                tracing::warn!(error = %err, "Camera could not be started");
                self.state = ScanState::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Grabs a still from the running camera and analyzes it.
    pub async fn capture(&mut self) -> Result<ScanRecord> {
        if self.state != ScanState::Capturing {
            return Err(AgroError::invalid_state(self.state.name(), "capture"));
        }

        let lease = self.lease.take();
        let frame = self.camera.capture_frame().await;
        drop(lease);

        match frame {
            Ok(image) => self.analyze(image).await,
            Err(err) => {
                tracing::warn!(error = %err, "Frame capture failed");
                self.state = ScanState::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Analyzes a user-supplied photo instead of a camera frame.
    pub async fn upload(&mut self, image: ImagePayload) -> Result<ScanRecord> {
        if !matches!(
            self.state,
            ScanState::Idle | ScanState::Capturing | ScanState::Failed(_)
        ) {
            return Err(AgroError::invalid_state(self.state.name(), "upload"));
        }

        self.lease = None;
        self.analyze(image).await
    }

    /// Analyzes a photo handed over as a `data:` URL, the form file pickers
    /// in web front ends produce. A malformed URL leaves the state as it was.
    pub async fn upload_data_url(&mut self, data_url: &str) -> Result<ScanRecord> {
        let image = ImagePayload::from_data_url(data_url)?;
        self.upload(image).await
    }

    /// Abandons the attempt and returns to `Idle`.
    pub fn cancel(&mut self) {
        self.lease = None;
        self.state = ScanState::Idle;
        tracing::info!("Scan cancelled");
    }

    async fn analyze(&mut self, image: ImagePayload) -> Result<ScanRecord> {
        self.state = ScanState::Analyzing;
        tracing::info!(
            mime_type = image.mime_type(),
            size = image.bytes().len(),
            "Analyzing image"
        );

        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        let token = self.cancel.clone();
        let service = Arc::clone(&self.diagnosis);
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = service.diagnose(&image) => Some(result),
        };

        // A result that lands after cancellation is dropped.
        let outcome = match outcome {
            Some(result) if !token.is_cancelled() => result,
            _ => {
                self.cancel = CancellationToken::new();
                self.state = ScanState::Idle;
                tracing::info!("Analysis cancelled, result discarded");
                return Err(AgroError::Cancelled);
            }
        };

        let diagnosis = match outcome {
            Ok(diagnosis) => diagnosis,
            Err(err) => {
                tracing::error!(error = %err, "Diagnosis failed");
                self.state = ScanState::Failed(err.clone());
                return Err(err);
            }
        };

        match self.history.record_scan(&image, diagnosis).await {
            Ok(record) => {
                tracing::info!(
                    id = %record.id,
                    status = %record.diagnosis.status,
                    "Scan completed"
                );
                self.state = ScanState::Completed(record.clone());
                Ok(record)
            }
            Err(err) => {
                tracing::error!(error = %err, "Could not store scan record");
                self.state = ScanState::Failed(err.clone());
                Err(err)
            }
        }
    }
}
