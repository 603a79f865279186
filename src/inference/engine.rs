//! Image → validated diagnostic payload.
//!
//! Composes the provider transport, the response-shape adapter and the
//! schema model into one call: every caller gets either a fully typed
//! `DiagnosticPayload` or an `InferenceError`, never a half-parsed
//! structure.

use std::sync::Arc;

use base64::Engine as _;

use super::gemini::VisionModel;
use super::parser::parse_diagnosis_json;
use super::InferenceError;
use crate::models::DiagnosticPayload;

pub struct DiagnosisEngine {
    model: Arc<dyn VisionModel>,
}

impl DiagnosisEngine {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        Self { model }
    }

    /// Obtain one structured diagnosis for the given image. Single
    /// attempt; the caller decides what a failure means.
    pub async fn analyze_image(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<DiagnosticPayload, InferenceError> {
        if image_bytes.is_empty() {
            return Err(InferenceError::EmptyImage);
        }

        let start = std::time::Instant::now();
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image_bytes);

        let raw = self.model.generate(&image_base64, mime_type).await?;
        let value = parse_diagnosis_json(&raw)?;
        let payload = DiagnosticPayload::from_value(&value)?;

        tracing::info!(
            mime_type,
            image_size = image_bytes.len(),
            elapsed_ms = %start.elapsed().as_millis(),
            urgency = payload.urgency_level.as_str(),
            trade = payload.required_trade.as_str(),
            "Image diagnosis complete"
        );

        Ok(payload)
    }
}
