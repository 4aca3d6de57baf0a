//! Diagnosis service trait.

use async_trait::async_trait;

use super::model::Diagnosis;
use crate::error::Result;
use crate::image::ImagePayload;

/// Port to the external inference service.
///
/// Implementations perform at most one network attempt per call and report
/// every failure (transport, empty response, schema violation) as
/// `AgroError::Inference`. They hold no state between calls.
#[async_trait]
pub trait DiagnosisService: Send + Sync {
    /// Identifies the plant in `image` and diagnoses its health.
    async fn diagnose(&self, image: &ImagePayload) -> Result<Diagnosis>;
}
