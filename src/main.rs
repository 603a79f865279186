use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use casafix::api::{build_router, ApiContext};
use casafix::config::{self, Config};
use casafix::db::JobStore;
use casafix::inference::{DiagnosisEngine, GeminiClient};
use casafix::pipeline::DiagnosticPipeline;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        version = config::APP_VERSION,
        model = %config.gemini_model,
        db = %config.database_path.display(),
        "Starting {}",
        config::APP_NAME
    );

    // Both collaborators degrade independently: the API stays up and
    // reports the missing capability per request.
    let pipeline = match &config.gemini_api_key {
        Some(key) => {
            let client = GeminiClient::new(key, &config.gemini_model);
            Some(Arc::new(DiagnosisEngine::new(Arc::new(client))))
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set, image analysis disabled");
            None
        }
    };

    let store = match JobStore::open(&config.database_path) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            tracing::warn!(error = %e, "Job store unavailable, running without persistence");
            None
        }
    };

    let pipeline = pipeline
        .map(|engine| Arc::new(DiagnosticPipeline::new(engine, store.clone())));
    let router = build_router(ApiContext::new(pipeline, store));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Listening");
    axum::serve(listener, router).await?;

    Ok(())
}
