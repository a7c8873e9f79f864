use axum::{Json, extract::State};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::{app_state::AppState, summarizer::SummaryMode};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    summary_mode: SummaryMode,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Health check successful", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    debug!("Health check passed");
    Json(HealthResponse {
        status: "OK".to_string(),
        summary_mode: state.summary_mode,
    })
}
