//! Image upload → diagnostic pipeline.
//!
//! `POST /analizar-problema` — multipart photo upload, analyzed by the
//! vision model and best-effort recorded in the job store.

use axum::extract::{Multipart, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::AnalysisResponse;

/// Upload size cap (8 MB), enforced while draining the field.
const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// `POST /analizar-problema` — run the diagnostic pipeline on one
/// uploaded image.
///
/// The image travels in the multipart part named `file`; other parts
/// are skipped. Its declared content type must start with `image/`;
/// anything else is rejected before the AI provider is contacted.
/// Inference failure is a hard 500; persistence failure still yields
/// a 200 whose body simply lacks `firestore_id`.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let pipeline = ctx.pipeline.as_ref().ok_or(ApiError::AiUnavailable)?;

    let (content_type, image_bytes) = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
            .ok_or_else(|| ApiError::BadRequest("Missing file field".into()))?;
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or("").to_string();
        tracing::debug!(content_type, "Received upload");
        if !content_type.starts_with("image/") {
            return Err(ApiError::BadRequest(format!(
                "File must be an image, got: {content_type}"
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;
        break (content_type, bytes);
    };

    if image_bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded image is empty".into()));
    }
    if image_bytes.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::BadRequest(format!(
            "Image exceeds {} MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    let outcome = pipeline.analyze(&image_bytes, &content_type).await?;
    Ok(Json(outcome.into()))
}
