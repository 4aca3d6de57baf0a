//! The instruction and response schema sent with every diagnosis request.

use serde_json::{Value, json};

use agrovision_core::diagnosis::DiagnosisStatus;

pub const DIAGNOSIS_INSTRUCTION: &str = "Identify the plant in this image and diagnose its health. \
If there is a disease, provide detailed symptoms, causes, and treatments. \
If it is healthy, confirm health and provide maintenance tips. \
Output strictly in JSON format according to the schema.";

/// Fields the service must always return.
pub const REQUIRED_FIELDS: [&str; 9] = [
    "plantName",
    "scientificName",
    "condition",
    "status",
    "confidence",
    "symptoms",
    "cause",
    "recommendations",
    "summary",
];

/// Gemini `responseSchema` (OpenAPI subset) for a plant diagnosis.
pub fn diagnosis_response_schema() -> Value {
    let statuses: Vec<&str> = DiagnosisStatus::ALL.iter().map(|s| s.as_str()).collect();
    let string_list = |description: &str| {
        json!({
            "type": "ARRAY",
            "items": { "type": "STRING" },
            "description": description,
        })
    };

    json!({
        "type": "OBJECT",
        "properties": {
            "plantName": { "type": "STRING", "description": "Common name of the plant" },
            "scientificName": { "type": "STRING", "description": "Scientific name of the plant" },
            "condition": { "type": "STRING", "description": "Name of the detected disease or 'Healthy'" },
            "status": {
                "type": "STRING",
                "enum": statuses,
                "description": "Must be 'Healthy', 'Infected', or 'Warning'",
            },
            "confidence": { "type": "NUMBER", "description": "Confidence score from 0 to 1" },
            "symptoms": string_list("List of observed symptoms"),
            "cause": { "type": "STRING", "description": "The primary cause of the condition" },
            "recommendations": {
                "type": "OBJECT",
                "properties": {
                    "organic": string_list("Organic treatment options"),
                    "chemical": string_list("Chemical treatment options"),
                    "prevention": string_list("Preventative measures"),
                },
                "required": ["organic", "chemical", "prevention"],
            },
            "summary": { "type": "STRING", "description": "Short summary of the diagnosis" },
        },
        "required": REQUIRED_FIELDS,
    })
}
