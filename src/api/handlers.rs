use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use crate::{
    api::dtos::{ErrorResponse, SummarizeRequest, SummarizeResponse},
    app_state::AppState,
    extraction::{ArticleResult, ExtractionError, ExtractionRequest},
};

impl IntoResponse for ExtractionError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), "extraction failed: {:?}", self);
        } else {
            info!(code = self.code(), "extraction rejected: {}", self);
        }
        let body = ErrorResponse::new(self.to_string(), self.code()).with_details(self.details());
        (status, Json(body)).into_response()
    }
}

pub async fn root() -> &'static str {
    "Talkify backend is running"
}

#[utoipa::path(
    post,
    path = "/extract",
    tag = "extraction",
    request_body = ExtractionRequest,
    responses(
        (status = 200, description = "Readable article or its summary", body = ArticleResult),
        (status = 400, description = "Invalid or unsupported URL", body = ErrorResponse),
        (status = 422, description = "No usable article content", body = ErrorResponse),
        (status = 500, description = "Fetch or summarization failed", body = ErrorResponse)
    )
)]
pub async fn extract(
    State(state): State<AppState>,
    payload: Result<Json<ExtractionRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("unreadable extract body: {}", rejection);
            return ExtractionError::invalid_url().into_response();
        }
    };

    match state.extraction.extract(&request).await {
        Ok(article) => (StatusCode::OK, Json(article)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/summarize",
    tag = "extraction",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "Summary of the posted text", body = SummarizeResponse),
        (status = 400, description = "No text provided", body = ErrorResponse),
        (status = 500, description = "Summarization failed", body = ErrorResponse)
    )
)]
pub async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(rejection.body_text(), "invalid_input")),
            )
                .into_response();
        }
    };
    if let Err(error) = request.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(error, "invalid_input")),
        )
            .into_response();
    }

    match state.summarizer.summarize(&request.text).await {
        Ok(summary) => (StatusCode::OK, Json(SummarizeResponse { summary })).into_response(),
        Err(err) => {
            error!(summarizer = state.summarizer.name(), "summarize failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(
                    ErrorResponse::new("Summarization failed", "summarization_failed")
                        .with_details(Some(err.to_string())),
                ),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        extraction::{ExtractionService, ExtractionSettings},
        extractor::{MockContentExtractor, ReadableArticle},
        fetcher::{FetchError, MockDocumentFetcher, PageResponse},
        summarizer::{MockSummarizer, SummarizationError, SummaryMode, Summarizer},
    };
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::Request,
        routing::{get, post},
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state(
        fetcher: MockDocumentFetcher,
        extractor: MockContentExtractor,
        summarizer: MockSummarizer,
    ) -> AppState {
        let summarizer: Arc<dyn Summarizer> = Arc::new(summarizer);
        let extraction = ExtractionService::new(
            Arc::new(fetcher),
            Arc::new(extractor),
            None,
            ExtractionSettings::default(),
        );
        AppState {
            extraction: Arc::new(extraction),
            summarizer,
            summary_mode: SummaryMode::Off,
        }
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/", get(root))
            .route("/extract", post(extract))
            .route("/summarize", post(summarize))
            .with_state(state)
    }

    fn post_json(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_extract_returns_article_body() {
        let mut fetcher = MockDocumentFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|url| Ok(PageResponse::from_html(url.clone(), "<html></html>")));
        let mut extractor = MockContentExtractor::new();
        extractor.expect_extract().returning(|_, _| {
            Some(ReadableArticle {
                title: "Rust in Production".to_string(),
                site_name: None,
                text: "Teams keep choosing Rust for services. ".repeat(8),
            })
        });

        let app = app(state(fetcher, extractor, MockSummarizer::new()));
        let request = post_json(
            "/extract",
            serde_json::json!({ "url": "https://news.example.com/rust" }).to_string(),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["title"], "Rust in Production");
        assert!(body["body"].as_str().unwrap().starts_with("Teams keep choosing"));
        assert!(body.get("summary").is_none());
    }

    #[tokio::test]
    async fn test_extract_twitter_is_bad_request() {
        let mut fetcher = MockDocumentFetcher::new();
        fetcher.expect_fetch().never();

        let app = app(state(fetcher, MockContentExtractor::new(), MockSummarizer::new()));
        let request = post_json(
            "/extract",
            serde_json::json!({ "url": "https://x.com/foo" }).to_string(),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Twitter/X links not supported.");
        assert_eq!(body["code"], "unsupported_source");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_extract_malformed_body_is_invalid_url() {
        let app = app(state(
            MockDocumentFetcher::new(),
            MockContentExtractor::new(),
            MockSummarizer::new(),
        ));

        for body in ["not json", r#"{"url": 42}"#] {
            let response = app
                .clone()
                .oneshot(post_json("/extract", body.to_string()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(json_body(response).await["error"], "Invalid URL");
        }
    }

    #[tokio::test]
    async fn test_extract_missing_url_is_invalid_input() {
        let app = app(state(
            MockDocumentFetcher::new(),
            MockContentExtractor::new(),
            MockSummarizer::new(),
        ));
        let response = app
            .oneshot(post_json("/extract", "{}".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "invalid_input");
    }

    #[tokio::test]
    async fn test_extract_short_content_is_unprocessable() {
        let mut fetcher = MockDocumentFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|url| Ok(PageResponse::from_html(url.clone(), "<html></html>")));
        let mut extractor = MockContentExtractor::new();
        extractor.expect_extract().returning(|_, _| {
            Some(ReadableArticle {
                title: "Stub".to_string(),
                site_name: None,
                text: "x".repeat(150),
            })
        });

        let app = app(state(fetcher, extractor, MockSummarizer::new()));
        let response = app
            .oneshot(post_json(
                "/extract",
                serde_json::json!({ "url": "https://example.com/stub" }).to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["code"], "content_too_short");
    }

    #[tokio::test]
    async fn test_extract_fetch_failure_has_details() {
        let mut fetcher = MockDocumentFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Err(FetchError::Http {
                status: StatusCode::SERVICE_UNAVAILABLE,
            }));

        let app = app(state(fetcher, MockContentExtractor::new(), MockSummarizer::new()));
        let response = app
            .oneshot(post_json(
                "/extract",
                serde_json::json!({ "url": "https://example.com/down" }).to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Extraction failed");
        assert_eq!(body["code"], "fetch_failed");
        assert!(body["details"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_summarize_returns_summary() {
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .withf(|text| text.trim_end() == "Some long text.")
            .returning(|_| Ok("Short.".to_string()));

        let app = app(state(
            MockDocumentFetcher::new(),
            MockContentExtractor::new(),
            summarizer,
        ));
        let response = app
            .oneshot(post_json(
                "/summarize",
                serde_json::json!({ "text": "Some long text." }).to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["summary"], "Short.");
    }

    #[tokio::test]
    async fn test_summarize_empty_text_is_bad_request() {
        let mut summarizer = MockSummarizer::new();
        summarizer.expect_summarize().never();

        let app = app(state(
            MockDocumentFetcher::new(),
            MockContentExtractor::new(),
            summarizer,
        ));
        let response = app
            .oneshot(post_json(
                "/summarize",
                serde_json::json!({ "text": "   " }).to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_summarize_failure_is_server_error() {
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .returning(|_| Err(SummarizationError::RateLimited));
        summarizer.expect_name().return_const("generative");

        let app = app(state(
            MockDocumentFetcher::new(),
            MockContentExtractor::new(),
            summarizer,
        ));
        let response = app
            .oneshot(post_json(
                "/summarize",
                serde_json::json!({ "text": "Some text." }).to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["code"], "summarization_failed");
        assert!(body["details"].as_str().unwrap().contains("rate limiting"));
    }

    #[tokio::test]
    async fn test_root_is_alive() {
        let app = app(state(
            MockDocumentFetcher::new(),
            MockContentExtractor::new(),
            MockSummarizer::new(),
        ));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
