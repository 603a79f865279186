//! HTTP surface assembly.
//!
//! Thin request/response mapping over the pipeline and the job store.
//! CORS is permissive (single-page frontends during development) and
//! every request is traced.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the application router.
pub fn build_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/", get(endpoints::root::index))
        .route("/diagnosticos", get(endpoints::historial::list))
        .route("/diagnosticos/:id/estado", put(endpoints::estado::update))
        .route("/analizar-problema", post(endpoints::analizar::analyze))
        .with_state(ctx)
        // Above the per-image cap so oversize uploads reach the
        // handler's own check instead of a bare 413.
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::db::JobStore;
    use crate::inference::{DiagnosisEngine, InferenceError, MockVisionModel};
    use crate::pipeline::DiagnosticPipeline;

    fn valid_model_response() -> String {
        json!({
            "diagnostico_corto": "Filtración en caño de agua fría",
            "diagnostico_detallado": "Humedad activa en la unión del codo.",
            "nivel_urgencia": "ALTA",
            "color_urgencia": "#e53935",
            "solucion_tecnica_pasos": ["Cerrar la llave de paso", "Reemplazar el codo"],
            "materiales_sugeridos": ["Codo PPN 20mm", "Cinta de teflón"],
            "precio_mano_obra_min_ars": 45000,
            "precio_mano_obra_max_ars": 70000,
            "consejo_anti_verso": "No acepten cambiar toda la cañería.",
            "mini_contrato_sugerido": "Se acuerda la reparación de la filtración.",
            "oficio_requerido": "PLOMERO"
        })
        .to_string()
    }

    fn engine_with(response: &str) -> Arc<DiagnosisEngine> {
        Arc::new(DiagnosisEngine::new(Arc::new(MockVisionModel::new(response))))
    }

    fn failing_engine() -> Arc<DiagnosisEngine> {
        Arc::new(DiagnosisEngine::new(Arc::new(MockVisionModel::failing(
            || InferenceError::Connection("provider down".into()),
        ))))
    }

    /// Router with a mock AI and a temp-dir store. The tempdir guard
    /// must be kept alive for the duration of the test.
    fn test_router(engine: Arc<DiagnosisEngine>) -> (Router, Arc<JobStore>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(JobStore::open(&tmp.path().join("jobs.db")).unwrap());
        let pipeline = Arc::new(DiagnosticPipeline::new(engine, Some(store.clone())));
        let router = build_router(ApiContext::new(Some(pipeline), Some(store.clone())));
        (router, store, tmp)
    }

    /// (name, content type, bytes) triples, in order, as one multipart
    /// request body.
    fn multipart_request(parts: &[(&str, &str, &[u8])]) -> Request<Body> {
        let boundary = "casafix-test-boundary";
        let mut body = Vec::new();
        for (name, content_type, bytes) in parts {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                     filename=\"foto.jpg\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/analizar-problema")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn multipart_upload(content_type: &str, bytes: &[u8]) -> Request<Body> {
        multipart_request(&[("file", content_type, bytes)])
    }

    fn put_estado(id: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(format!("/diagnosticos/{id}/estado"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_always_answers() {
        let router = build_router(ApiContext::new(None, None));
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["message"].as_str().unwrap().contains("online"));
    }

    #[tokio::test]
    async fn historial_without_store_is_503() {
        let router = build_router(ApiContext::new(None, None));
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/diagnosticos")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn historial_empty_store_is_empty_list() {
        let (router, _store, _tmp) = test_router(engine_with(&valid_model_response()));
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/diagnosticos")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn upload_analyze_list_update_flow() {
        let (router, _store, _tmp) = test_router(engine_with(&valid_model_response()));

        // Upload a "leaking pipe" photo
        let response = router
            .clone()
            .oneshot(multipart_upload("image/jpeg", b"fake-jpeg-bytes"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let analysis = body_json(response).await;
        assert_eq!(analysis["nivel_urgencia"], "ALTA");
        assert_eq!(analysis["oficio_requerido"], "PLOMERO");
        let id = analysis["firestore_id"].as_str().unwrap().to_string();

        // The new record is first in the history
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/diagnosticos")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let history = body_json(response).await;
        assert_eq!(history[0]["firestore_id"], id.as_str());
        assert_eq!(history[0]["estado"], "pendiente");

        // Resolve the job with a warranty
        let response = router
            .clone()
            .oneshot(put_estado(&id, json!({"estado": "resuelto", "garantia": "30 dias"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["datos"]["estado"], "resuelto");
        assert_eq!(updated["datos"]["garantia"], "30 dias");

        // Diagnostic content survived the update untouched
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/diagnosticos")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let history = body_json(response).await;
        assert_eq!(history[0]["estado"], "resuelto");
        assert_eq!(history[0]["garantia"], "30 dias");
        assert_eq!(
            history[0]["diagnostico_corto"],
            "Filtración en caño de agua fría"
        );
    }

    #[tokio::test]
    async fn update_without_garantia_leaves_it_untouched() {
        let (router, store, _tmp) = test_router(engine_with(&valid_model_response()));
        router
            .clone()
            .oneshot(multipart_upload("image/jpeg", b"bytes"))
            .await
            .unwrap();
        let id = store.list_recent(1).unwrap()[0].firestore_id.clone();

        let response = router
            .oneshot(put_estado(&id, json!({"estado": "en_progreso"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert!(updated["datos"].get("garantia").is_none());

        let record = &store.list_recent(1).unwrap()[0];
        assert_eq!(record.estado, "en_progreso");
        assert!(record.garantia.is_none());
    }

    #[tokio::test]
    async fn update_unknown_id_is_404_and_store_unchanged() {
        let (router, store, _tmp) = test_router(engine_with(&valid_model_response()));
        let response = router
            .oneshot(put_estado(
                &uuid::Uuid::new_v4().to_string(),
                json!({"estado": "resuelto"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(store.list_recent(20).unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_backend_failure_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("gone");
        let store = Arc::new(JobStore::open(&dir.join("jobs.db")).unwrap());
        std::fs::remove_dir_all(&dir).unwrap();

        let router = build_router(ApiContext::new(None, Some(store)));
        let response = router
            .oneshot(put_estado(
                &uuid::Uuid::new_v4().to_string(),
                json!({"estado": "resuelto"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_malformed_id_is_404() {
        let (router, _store, _tmp) = test_router(engine_with(&valid_model_response()));
        let response = router
            .oneshot(put_estado("no-es-un-uuid", json!({"estado": "resuelto"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_image_upload_is_400_and_no_record_created() {
        // A failing engine would turn any AI call into a 500; the 400
        // proves the request was rejected before inference.
        let (router, store, _tmp) = test_router(failing_engine());
        let response = router
            .oneshot(multipart_upload("application/pdf", b"%PDF-1.4"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.list_recent(20).unwrap().is_empty());
    }

    #[tokio::test]
    async fn inference_failure_is_500_and_no_record_created() {
        let (router, store, _tmp) = test_router(failing_engine());
        let response = router
            .oneshot(multipart_upload("image/jpeg", b"bytes"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Image analysis failed"));
        assert!(store.list_recent(20).unwrap().is_empty());
    }

    #[tokio::test]
    async fn analyze_without_ai_is_500() {
        let router = build_router(ApiContext::new(None, None));
        let response = router
            .oneshot(multipart_upload("image/jpeg", b"bytes"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "AI_UNAVAILABLE");
    }

    #[tokio::test]
    async fn store_outage_still_returns_diagnosis_without_id() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("gone");
        let store = Arc::new(JobStore::open(&dir.join("jobs.db")).unwrap());
        std::fs::remove_dir_all(&dir).unwrap();

        let pipeline = Arc::new(DiagnosticPipeline::new(
            engine_with(&valid_model_response()),
            Some(store.clone()),
        ));
        let router = build_router(ApiContext::new(Some(pipeline), Some(store)));

        let response = router
            .oneshot(multipart_upload("image/jpeg", b"bytes"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["nivel_urgencia"], "ALTA");
        assert!(json.get("firestore_id").is_none());
    }

    #[tokio::test]
    async fn upload_skips_parts_other_than_file() {
        let (router, _store, _tmp) = test_router(engine_with(&valid_model_response()));
        let response = router
            .oneshot(multipart_request(&[
                ("nota", "text/plain", b"se rompio el canio"),
                ("file", "image/jpeg", b"fake-jpeg-bytes"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["oficio_requerido"], "PLOMERO");
    }

    #[tokio::test]
    async fn upload_without_file_part_is_400() {
        let (router, store, _tmp) = test_router(failing_engine());
        let response = router
            .oneshot(multipart_request(&[("nota", "text/plain", b"sin foto")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.list_recent(20).unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_upload_is_400() {
        let (router, _store, _tmp) = test_router(engine_with(&valid_model_response()));
        let response = router
            .oneshot(multipart_upload("image/jpeg", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
