use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::DiagnosticRecord;

/// How many records the history view returns at most.
const HISTORY_LIMIT: u32 = 20;

/// `GET /diagnosticos` — most recent jobs, newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<DiagnosticRecord>>, ApiError> {
    let store = ctx.store.as_ref().ok_or(ApiError::StoreUnavailable)?;
    let records = store.list_recent(HISTORY_LIMIT)?;
    Ok(Json(records))
}
