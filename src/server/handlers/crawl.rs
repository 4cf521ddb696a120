use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

const MAX_URLS: usize = 10;

#[derive(Debug, Deserialize)]
pub struct CrawlRequest {
    pub urls: Vec<String>,
}

pub async fn crawl(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CrawlRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.urls.is_empty() {
        return Err(ApiError::BadRequest("URLs array is required".to_string()));
    }

    let mut urls = request.urls;
    urls.truncate(MAX_URLS);

    let results = state.fetcher.fetch_all(&urls).await;
    Ok(Json(json!({ "results": results })))
}
