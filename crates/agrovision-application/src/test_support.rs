//! Hand-written port doubles shared by the unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use agrovision_core::capture::{CameraDevice, CaptureConstraints};
use agrovision_core::diagnosis::{Diagnosis, DiagnosisService, DiagnosisStatus, Recommendations};
use agrovision_core::error::Result;
use agrovision_core::history::{HistoryRepository, ScanRecord};
use agrovision_core::image::ImagePayload;
use agrovision_core::{AgroError, MediaAccessReason};
use async_trait::async_trait;
use tokio::sync::Notify;

pub fn tomato_blight() -> Diagnosis {
    Diagnosis {
        plant_name: "Tomato".into(),
        scientific_name: "Solanum lycopersicum".into(),
        condition: "Early Blight".into(),
        status: DiagnosisStatus::Infected,
        confidence: 0.92,
        symptoms: vec!["concentric brown rings on lower leaves".into()],
        cause: "Alternaria solani".into(),
        recommendations: Recommendations {
            organic: vec!["remove infected leaves".into()],
            chemical: vec!["chlorothalonil".into()],
            prevention: vec!["rotate crops".into()],
        },
        summary: "Early blight detected on lower foliage.".into(),
    }
}

pub fn healthy_basil() -> Diagnosis {
    Diagnosis {
        plant_name: "Basil".into(),
        scientific_name: "Ocimum basilicum".into(),
        condition: "Healthy".into(),
        status: DiagnosisStatus::Healthy,
        confidence: 0.97,
        symptoms: Vec::new(),
        cause: "None".into(),
        recommendations: Recommendations {
            organic: Vec::new(),
            chemical: Vec::new(),
            prevention: vec!["water at the base".into()],
        },
        summary: "The plant looks healthy.".into(),
    }
}

pub fn record(id: &str, timestamp: i64) -> ScanRecord {
    ScanRecord {
        id: id.to_string(),
        timestamp,
        image: "data:image/jpeg;base64,AAAA".into(),
        diagnosis: healthy_basil(),
    }
}

/// In-memory repository whose saves can be switched to fail.
#[derive(Default)]
pub struct FailingHistoryRepository {
    records: Mutex<Vec<ScanRecord>>,
    fail_saves: AtomicBool,
}

impl FailingHistoryRepository {
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl HistoryRepository for FailingHistoryRepository {
    async fn load_all(&self) -> Result<Vec<ScanRecord>> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn save_all(&self, records: &[ScanRecord]) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AgroError::storage("disk full"));
        }
        *self.records.lock().unwrap() = records.to_vec();
        Ok(())
    }
}

/// Camera double that counts acquisitions and releases.
#[derive(Default)]
pub struct MockCamera {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    start_error: Mutex<Option<AgroError>>,
    frame_error: Mutex<Option<AgroError>>,
}

impl MockCamera {
    pub fn denied() -> Self {
        let camera = Self::default();
        *camera.start_error.lock().unwrap() = Some(AgroError::media_access(
            MediaAccessReason::PermissionDenied,
            "NotAllowedError",
        ));
        camera
    }

    pub fn broken_frames() -> Self {
        let camera = Self::default();
        *camera.frame_error.lock().unwrap() = Some(AgroError::media_access(
            MediaAccessReason::Unavailable,
            "stream ended",
        ));
        camera
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraDevice for MockCamera {
    async fn start(&self, _constraints: &CaptureConstraints) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        match self.start_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn capture_frame(&self) -> Result<ImagePayload> {
        match self.frame_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(ImagePayload::jpeg(vec![0xFF, 0xD8, 0xFF])),
        }
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Diagnosis double returning a fixed outcome, optionally held until
/// [`release`](Self::release) is called.
pub struct MockDiagnosisService {
    outcome: Result<Diagnosis>,
    gate: Option<Notify>,
    pub calls: AtomicUsize,
}

impl MockDiagnosisService {
    pub fn returning(diagnosis: Diagnosis) -> Self {
        Self {
            outcome: Ok(diagnosis),
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: AgroError) -> Self {
        Self {
            outcome: Err(err),
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn gated(diagnosis: Diagnosis) -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::returning(diagnosis)
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }
}

#[async_trait]
impl DiagnosisService for MockDiagnosisService {
    async fn diagnose(&self, _image: &ImagePayload) -> Result<Diagnosis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcome.clone()
    }
}
