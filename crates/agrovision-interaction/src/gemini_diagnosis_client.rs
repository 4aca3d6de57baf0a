use std::time::Duration;

use agrovision_core::AgroError;
use agrovision_core::config::{DEFAULT_GEMINI_BASE_URL, DiagnosisSettings};
use agrovision_core::diagnosis::{Diagnosis, DiagnosisService};
use agrovision_core::error::Result;
use agrovision_core::image::ImagePayload;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{DIAGNOSIS_INSTRUCTION, diagnosis_response_schema};

const RESPONSE_MIME_TYPE: &str = "application/json";

/// Diagnoses plant photos through the Gemini `generateContent` REST API.
///
/// One request per call, no retries. The API key travels as the `key` query
/// parameter and is stripped from every error message.
pub struct GeminiDiagnosisClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl GeminiDiagnosisClient {
    pub fn new(api_key: impl Into<String>, settings: &DiagnosisSettings) -> Result<Self> {
        let mut builder = Client::builder();
        if settings.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(settings.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|err| AgroError::config(format!("Failed to build HTTP client: {err}")))?;

        let base_url = if settings.base_url.trim().is_empty() {
            DEFAULT_GEMINI_BASE_URL.to_string()
        } else {
            settings.base_url.trim_end_matches('/').to_string()
        };

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: settings.model.clone(),
            base_url,
            temperature: settings.temperature,
        })
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, image: &ImagePayload) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineDataPayload {
                            mime_type: image.mime_type().to_string(),
                            data: image.to_base64(),
                        },
                    },
                    Part::Text {
                        text: DIAGNOSIS_INSTRUCTION.to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: RESPONSE_MIME_TYPE.to_string(),
                response_schema: diagnosis_response_schema(),
                temperature: self.temperature,
            },
        }
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                let kind = if err.is_timeout() { "timed out" } else { "failed" };
                AgroError::inference(format!(
                    "Gemini API request {kind}: {}",
                    err.without_url()
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            AgroError::inference(format!(
                "Failed to parse Gemini response: {}",
                err.without_url()
            ))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl DiagnosisService for GeminiDiagnosisClient {
    async fn diagnose(&self, image: &ImagePayload) -> Result<Diagnosis> {
        tracing::info!(
            model = %self.model,
            mime_type = image.mime_type(),
            size = image.bytes().len(),
            "Requesting plant diagnosis"
        );

        let request = self.build_request(image);
        let text = self.send_request(&request).await.inspect_err(|err| {
            tracing::warn!(error = %err, "Diagnosis request failed");
        })?;

        let diagnosis = parse_diagnosis(&text)?;
        tracing::info!(
            plant = %diagnosis.plant_name,
            status = %diagnosis.status,
            confidence = diagnosis.confidence,
            "Diagnosis received"
        );
        Ok(diagnosis)
    }
}

/// Parses the model's JSON text into a validated [`Diagnosis`].
///
/// Anything short of a complete, valid object is rejected.
pub fn parse_diagnosis(text: &str) -> Result<Diagnosis> {
    let json = strip_code_fence(text);
    let diagnosis: Diagnosis = serde_json::from_str(json)
        .map_err(|err| AgroError::inference(format!("Diagnosis does not match schema: {err}")))?;
    diagnosis.validate()?;
    Ok(diagnosis)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AgroError::inference("malformed or empty response"))
}

fn map_http_error(status: StatusCode, body: String) -> AgroError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    AgroError::inference_http(status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrovision_core::diagnosis::DiagnosisStatus;
    use serde_json::json;

    fn blight_json() -> Value {
        json!({
            "plantName": "Tomato",
            "scientificName": "Solanum lycopersicum",
            "condition": "Late Blight",
            "status": "Infected",
            "confidence": 0.92,
            "symptoms": ["dark lesions on leaves"],
            "cause": "Phytophthora infestans",
            "recommendations": {
                "organic": ["remove affected leaves"],
                "chemical": ["copper fungicide"],
                "prevention": ["avoid overhead watering"]
            },
            "summary": "Late blight detected."
        })
    }

    fn client() -> GeminiDiagnosisClient {
        GeminiDiagnosisClient::new("test-key", &DiagnosisSettings::default()).unwrap()
    }

    #[test]
    fn test_parses_complete_diagnosis() {
        let diagnosis = parse_diagnosis(&blight_json().to_string()).unwrap();
        assert_eq!(diagnosis.plant_name, "Tomato");
        assert_eq!(diagnosis.status, DiagnosisStatus::Infected);
        assert_eq!(diagnosis.recommendations.chemical, vec!["copper fungicide"]);
    }

    #[test]
    fn test_unwraps_markdown_fence() {
        let text = format!("```json\n{}\n```", blight_json());
        let diagnosis = parse_diagnosis(&text).unwrap();
        assert_eq!(diagnosis.condition, "Late Blight");
    }

    #[test]
    fn test_missing_recommendations_is_rejected() {
        let mut value = blight_json();
        value.as_object_mut().unwrap().remove("recommendations");
        let err = parse_diagnosis(&value.to_string()).unwrap_err();
        assert!(err.is_inference());
    }

    #[test]
    fn test_missing_recommendation_key_is_rejected() {
        let mut value = blight_json();
        value["recommendations"]
            .as_object_mut()
            .unwrap()
            .remove("prevention");
        assert!(parse_diagnosis(&value.to_string()).unwrap_err().is_inference());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let mut value = blight_json();
        value["status"] = json!("Dying");
        assert!(parse_diagnosis(&value.to_string()).unwrap_err().is_inference());
    }

    #[test]
    fn test_out_of_range_confidence_is_rejected() {
        let mut value = blight_json();
        value["confidence"] = json!(1.5);
        assert!(parse_diagnosis(&value.to_string()).unwrap_err().is_inference());
    }

    #[test]
    fn test_empty_candidates_is_malformed() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [] })).unwrap();
        let err = extract_text_response(response).unwrap_err();
        assert_eq!(err, AgroError::inference("malformed or empty response"));
    }

    #[test]
    fn test_extracts_first_text_part() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{}" }] } }]
        }))
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), "{}");
    }

    #[test]
    fn test_http_error_carries_status_and_message() {
        let body = json!({
            "error": { "code": 403, "status": "PERMISSION_DENIED", "message": "API key not valid" }
        })
        .to_string();
        let err = map_http_error(StatusCode::FORBIDDEN, body);
        assert_eq!(
            err,
            AgroError::inference_http(403, "PERMISSION_DENIED: API key not valid")
        );
    }

    #[test]
    fn test_http_error_falls_back_to_raw_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert_eq!(err, AgroError::inference_http(502, "upstream down"));
    }

    #[test]
    fn test_request_shape() {
        let image = ImagePayload::jpeg(vec![1, 2, 3]);
        let request = serde_json::to_value(client().build_request(&image)).unwrap();

        let parts = &request["contents"][0]["parts"];
        assert_eq!(request["contents"][0]["role"], "user");
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "AQID");
        assert_eq!(parts[1]["text"], DIAGNOSIS_INSTRUCTION);

        let config = &request["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["type"], "OBJECT");
        assert!((config["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_transport_failure_is_inference_error_without_key() {
        let settings = DiagnosisSettings {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 5,
            ..DiagnosisSettings::default()
        };
        let client = GeminiDiagnosisClient::new("super-secret-key", &settings).unwrap();

        let err = client
            .diagnose(&ImagePayload::jpeg(vec![0xFF, 0xD8]))
            .await
            .unwrap_err();
        assert!(err.is_inference());
        assert!(!err.to_string().contains("super-secret-key"));
    }
}
