use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::{DatabaseError, DiagnosticUpdate};

#[derive(Deserialize)]
pub struct EstadoRequest {
    pub estado: String,
    pub garantia: Option<String>,
}

#[derive(Serialize)]
pub struct EstadoResponse {
    pub message: String,
    pub datos: AppliedFields,
}

/// Echo of exactly the fields that were applied; an absent `garantia`
/// was never touched.
#[derive(Serialize)]
pub struct AppliedFields {
    pub estado: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garantia: Option<String>,
}

/// `PUT /diagnosticos/{id}/estado` — job state update.
///
/// Only `estado`/`garantia` pass through; diagnostic content fields
/// are not updatable via this path. An unparseable id, an unknown id
/// and a backend write failure all answer 404: the caller learns the
/// record was not updated, nothing more.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(body): Json<EstadoRequest>,
) -> Result<Json<EstadoResponse>, ApiError> {
    let store = ctx.store.as_ref().ok_or(ApiError::StoreUnavailable)?;

    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::NotFound(format!("Diagnostic {id} not found")))?;

    let update = DiagnosticUpdate {
        estado: Some(body.estado.clone()),
        garantia: body.garantia.clone(),
    };
    store.update(&id, &update).map_err(|e| {
        if !matches!(e, DatabaseError::NotFound(_)) {
            tracing::warn!(id = %id, error = %e, "Diagnostic update failed");
        }
        ApiError::NotFound(format!("Diagnostic {id} not found or not updated"))
    })?;

    tracing::info!(id = %id, estado = %body.estado, "Diagnostic state updated");

    Ok(Json(EstadoResponse {
        message: "Diagnostic updated".to_string(),
        datos: AppliedFields {
            estado: body.estado,
            garantia: body.garantia,
        },
    }))
}
