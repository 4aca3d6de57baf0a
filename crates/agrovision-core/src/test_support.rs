//! Shared fixtures for unit tests in this crate.

use crate::diagnosis::{Diagnosis, DiagnosisStatus, Recommendations};
use crate::history::ScanRecord;

pub(crate) fn tomato_blight() -> Diagnosis {
    Diagnosis {
        plant_name: "Tomato".to_string(),
        scientific_name: "Solanum lycopersicum".to_string(),
        condition: "Early Blight".to_string(),
        status: DiagnosisStatus::Infected,
        confidence: 0.87,
        symptoms: vec!["brown spots".to_string(), "yellowing leaves".to_string()],
        cause: "fungal infection".to_string(),
        recommendations: Recommendations {
            organic: vec!["neem oil".to_string()],
            chemical: vec!["chlorothalonil".to_string()],
            prevention: vec!["crop rotation".to_string()],
        },
        summary: "Early blight caused by Alternaria solani.".to_string(),
    }
}

pub(crate) fn healthy_basil() -> Diagnosis {
    Diagnosis {
        plant_name: "Basil".to_string(),
        scientific_name: "Ocimum basilicum".to_string(),
        condition: "Healthy".to_string(),
        status: DiagnosisStatus::Healthy,
        confidence: 0.95,
        symptoms: Vec::new(),
        cause: "No disease detected".to_string(),
        recommendations: Recommendations {
            organic: Vec::new(),
            chemical: Vec::new(),
            prevention: vec!["water at the base".to_string()],
        },
        summary: "The plant looks healthy.".to_string(),
    }
}

pub(crate) fn record(id: &str, timestamp: i64, diagnosis: Diagnosis) -> ScanRecord {
    ScanRecord {
        id: id.to_string(),
        timestamp,
        image: "data:image/jpeg;base64,AAAA".to_string(),
        diagnosis,
    }
}
