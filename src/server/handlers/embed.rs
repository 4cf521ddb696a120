use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

const MAX_TEXTS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct EmbedRequest {
    pub texts: Vec<String>,
}

pub async fn embed(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmbedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.texts.is_empty() {
        return Err(ApiError::BadRequest("Texts array is required".to_string()));
    }

    let mut texts = request.texts;
    texts.truncate(MAX_TEXTS);

    let embeddings = state.embedder.embed_batch(&texts).await;
    Ok(Json(json!({ "embeddings": embeddings })))
}
