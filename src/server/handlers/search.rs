use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::core::errors::ApiError;
use crate::pipeline::run_search_pipeline;
use crate::state::AppState;

fn default_max_results() -> usize {
    5
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(rename = "maxResults", default = "default_max_results")]
    pub max_results: usize,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Token per request; cancelling it aborts the remaining stages.
    let cancel = CancellationToken::new();
    let answer =
        run_search_pipeline(&state, &request.query, request.max_results, &cancel).await?;
    Ok(Json(answer))
}
