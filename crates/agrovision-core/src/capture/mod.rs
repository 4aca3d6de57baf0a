//! Camera capture port.
//!
//! The device itself lives outside this workspace (a platform media API);
//! the core only needs to start it, grab one still frame and stop it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::image::ImagePayload;

/// Which camera to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacingMode {
    /// Rear camera, pointed at the plant.
    Environment,
    User,
}

/// Requested stream settings. Devices treat the sizes as hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConstraints {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
    /// JPEG quality for still frames, in `(0.0, 1.0]`.
    pub jpeg_quality: f32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            ideal_width: 1080,
            ideal_height: 1920,
            jpeg_quality: 0.85,
        }
    }
}

/// A camera that can be held exclusively between `start` and `stop`.
///
/// `start` failures are reported as `AgroError::MediaAccess` with the
/// reason (permission denied vs unavailable). `stop` must be idempotent and
/// infallible: it runs on every exit path, including drops.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn start(&self, constraints: &CaptureConstraints) -> Result<()>;

    /// Encodes the current frame as a still image.
    async fn capture_frame(&self) -> Result<ImagePayload>;

    fn stop(&self);
}
