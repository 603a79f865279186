//! End-to-end "analyze, then persist" flow.
//!
//! The two steps have deliberately asymmetric failure policies:
//! inference failure aborts the request (nothing is persisted, the
//! caller gets an error), while persistence failure is soft — the
//! diagnosis is still returned, and the miss is carried in the output
//! type instead of being swallowed in a catch block.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::db::JobStore;
use crate::inference::{DiagnosisEngine, InferenceError};
use crate::models::DiagnosticPayload;

/// What happened to the side recording of a successful diagnosis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceOutcome {
    Saved(Uuid),
    Failed(String),
    StoreUnavailable,
}

/// Successful pipeline run: the payload always, an identifier only
/// when the store accepted the record.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub payload: DiagnosticPayload,
    pub persistence: PersistenceOutcome,
}

/// Client-facing body for a successful analysis. `firestore_id` is
/// present only when persistence succeeded.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub payload: DiagnosticPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firestore_id: Option<String>,
}

impl From<AnalysisOutcome> for AnalysisResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        let firestore_id = match outcome.persistence {
            PersistenceOutcome::Saved(id) => Some(id.to_string()),
            _ => None,
        };
        Self {
            payload: outcome.payload,
            firestore_id,
        }
    }
}

pub struct DiagnosticPipeline {
    engine: Arc<DiagnosisEngine>,
    store: Option<Arc<JobStore>>,
}

impl DiagnosticPipeline {
    pub fn new(engine: Arc<DiagnosisEngine>, store: Option<Arc<JobStore>>) -> Self {
        Self { engine, store }
    }

    /// Run the full flow for one uploaded image.
    ///
    /// Inference errors are hard failures; store errors degrade to a
    /// warn log plus a `PersistenceOutcome` the caller can inspect.
    pub async fn analyze(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<AnalysisOutcome, InferenceError> {
        let payload = self.engine.analyze_image(image_bytes, mime_type).await?;

        let persistence = match &self.store {
            None => {
                tracing::warn!("Job store unavailable, diagnosis not recorded");
                PersistenceOutcome::StoreUnavailable
            }
            Some(store) => match store.create(&payload) {
                Ok(id) => {
                    tracing::info!(id = %id, "Diagnosis persisted");
                    PersistenceOutcome::Saved(id)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to persist diagnosis, returning result anyway");
                    PersistenceOutcome::Failed(e.to_string())
                }
            },
        };

        Ok(AnalysisOutcome { payload, persistence })
    }
}
