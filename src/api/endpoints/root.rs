use axum::Json;
use serde::Serialize;

use crate::config;

#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
}

/// `GET /` — liveness banner. Succeeds regardless of collaborator state.
pub async fn index() -> Json<RootResponse> {
    Json(RootResponse {
        message: format!(
            "{} API online (v{})",
            config::APP_NAME,
            config::APP_VERSION
        ),
    })
}
