//! Outbound calls to the AI diagnosis service.

pub mod gemini_diagnosis_client;
pub mod schema;

pub use gemini_diagnosis_client::{GeminiDiagnosisClient, parse_diagnosis};
