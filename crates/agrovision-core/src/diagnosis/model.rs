//! Plant diagnosis domain models.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AgroError, Result};

/// Health verdict for the photographed plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosisStatus {
    Healthy,
    Infected,
    Warning,
}

impl DiagnosisStatus {
    /// All accepted values, in the order the response schema lists them.
    pub const ALL: [DiagnosisStatus; 3] = [
        DiagnosisStatus::Healthy,
        DiagnosisStatus::Infected,
        DiagnosisStatus::Warning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosisStatus::Healthy => "Healthy",
            DiagnosisStatus::Infected => "Infected",
            DiagnosisStatus::Warning => "Warning",
        }
    }
}

impl fmt::Display for DiagnosisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Treatment options grouped by approach.
///
/// Each list may be empty, but all three keys are required on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recommendations {
    pub organic: Vec<String>,
    pub chemical: Vec<String>,
    pub prevention: Vec<String>,
}

/// Structured result of a plant identification and health check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    /// Common name of the plant.
    pub plant_name: String,
    pub scientific_name: String,
    /// Name of the detected disease, or "Healthy".
    pub condition: String,
    pub status: DiagnosisStatus,
    /// Confidence score in `[0.0, 1.0]`.
    pub confidence: f64,
    pub symptoms: Vec<String>,
    /// The primary cause of the condition.
    pub cause: String,
    pub recommendations: Recommendations,
    pub summary: String,
}

impl Diagnosis {
    /// Checks the invariants serde cannot express: non-blank text fields
    /// and a confidence inside `[0.0, 1.0]`.
    pub fn validate(&self) -> Result<()> {
        let text_fields = [
            ("plantName", &self.plant_name),
            ("scientificName", &self.scientific_name),
            ("condition", &self.condition),
            ("cause", &self.cause),
            ("summary", &self.summary),
        ];
        if let Some((name, _)) = text_fields
            .iter()
            .find(|(_, value)| value.trim().is_empty())
        {
            return Err(AgroError::inference(format!(
                "diagnosis field '{name}' is empty"
            )));
        }

        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(AgroError::inference(format!(
                "diagnosis confidence {} is outside [0, 1]",
                self.confidence
            )));
        }

        Ok(())
    }

    /// Confidence as a whole percentage, as shown on the result screen.
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// Infected plants count towards the dashboard alerts.
    pub fn is_alert(&self) -> bool {
        self.status == DiagnosisStatus::Infected
    }
}
