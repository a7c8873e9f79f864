pub mod dtos;
pub mod handlers;

use axum::{
    Router,
    body::Body,
    http::{HeaderName, Request},
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info_span;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    app_state::AppState,
    extraction::{ArticleResult, ExtractionRequest},
    health::{self, HealthResponse},
    summarizer::SummaryMode,
};
use dtos::{ErrorResponse, SummarizeRequest, SummarizeResponse};

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(OpenApi)]
#[openapi(
    paths(handlers::extract, handlers::summarize, health::health_check),
    components(schemas(
        ExtractionRequest,
        ArticleResult,
        SummarizeRequest,
        SummarizeResponse,
        ErrorResponse,
        HealthResponse,
        SummaryMode
    )),
    tags(
        (name = "extraction", description = "Article extraction and summaries"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// Full HTTP surface with tracing, request ids, CORS and API docs.
pub fn router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(health::health_check))
        .route("/extract", post(handlers::extract))
        .route("/summarize", post(handlers::summarize))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        extraction::{ExtractionService, ExtractionSettings},
        extractor::MockContentExtractor,
        fetcher::MockDocumentFetcher,
        summarizer::{ExtractiveSummarizer, SummaryMode},
    };
    use axum::http::StatusCode;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState {
            extraction: Arc::new(ExtractionService::new(
                Arc::new(MockDocumentFetcher::new()),
                Arc::new(MockContentExtractor::new()),
                None,
                ExtractionSettings::default(),
            )),
            summarizer: Arc::new(ExtractiveSummarizer),
            summary_mode: SummaryMode::Extractive,
        }
    }

    #[tokio::test]
    async fn test_healthz_reports_summary_mode() {
        let request = Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();
        let response = router(state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "OK");
        assert_eq!(body["summary_mode"], "extractive");
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let request = Request::builder()
            .uri("/")
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = router(state()).oneshot(request).await.unwrap();
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "abc-123");
    }

    #[tokio::test]
    async fn test_cors_preflight_is_allowed() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/extract")
            .header("origin", "chrome-extension://abcdef")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = router(state()).oneshot(request).await.unwrap();
        assert!(
            response
                .headers()
                .contains_key("access-control-allow-origin")
        );
    }

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/extract"));
        assert!(doc.paths.paths.contains_key("/summarize"));
        assert!(doc.paths.paths.contains_key("/healthz"));
    }
}
