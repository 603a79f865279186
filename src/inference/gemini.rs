//! Gemini REST transport for the diagnosis call.
//!
//! One image in, one candidate text out. No retries, no caching — a
//! single attempt per call; anything beyond that is a pipeline
//! concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::InferenceError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Bounded wait for the provider call. Expiry maps to
/// `InferenceError::Timeout`.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Provider transport abstraction (allows mocking).
///
/// Takes the already base64-encoded image and its media type, returns
/// the raw candidate text. Parsing and schema validation happen in the
/// engine, never here.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(
        &self,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<String, InferenceError>;
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Constructor with an overridable base URL (for tests against a
    /// local stub server).
    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

// ── Wire types for generateContent ──────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "systemInstruction")]
    system_instruction: SystemInstruction<'a>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    #[serde(rename = "inlineData")]
    inline_data: InlineData<'a>,
}

#[derive(Serialize)]
struct InlineData<'a> {
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig<'a> {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn generate(
        &self,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<String, InferenceError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart {
                    inline_data: InlineData {
                        mime_type,
                        data: image_base64,
                    },
                }],
            }],
            system_instruction: SystemInstruction {
                parts: vec![TextPart {
                    text: super::prompt::DIAGNOSIS_SYSTEM_PROMPT,
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response = self.http.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_connect() {
                InferenceError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                InferenceError::Timeout(REQUEST_TIMEOUT_SECS)
            } else {
                InferenceError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::JsonParsing(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or(InferenceError::EmptyResponse)
    }
}

/// Mock vision model for testing — returns a configurable response or
/// a configurable error.
pub struct MockVisionModel {
    response: Result<String, fn() -> InferenceError>,
}

impl MockVisionModel {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
        }
    }

    pub fn failing(make_error: fn() -> InferenceError) -> Self {
        Self {
            response: Err(make_error),
        }
    }
}

#[async_trait]
impl VisionModel for MockVisionModel {
    async fn generate(
        &self,
        _image_base64: &str,
        _mime_type: &str,
    ) -> Result<String, InferenceError> {
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(make_error) => Err(make_error()),
        }
    }
}
