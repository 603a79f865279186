//! Shared state for the API layer.

use std::sync::Arc;

use crate::db::JobStore;
use crate::pipeline::DiagnosticPipeline;

/// Shared context for all API routes.
///
/// Both collaborator handles are explicit `Option`s: each endpoint
/// checks the one it needs and degrades with a clear error response
/// when it is missing, instead of the process refusing to start.
#[derive(Clone)]
pub struct ApiContext {
    pub pipeline: Option<Arc<DiagnosticPipeline>>,
    pub store: Option<Arc<JobStore>>,
}

impl ApiContext {
    pub fn new(pipeline: Option<Arc<DiagnosticPipeline>>, store: Option<Arc<JobStore>>) -> Self {
        Self { pipeline, store }
    }
}
