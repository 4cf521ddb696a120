use std::cmp::Ordering;

use ndarray::ArrayView1;

use crate::core::errors::ApiError;

/// Cosine similarity of two equal-length vectors.
///
/// Returns NaN when either vector has zero magnitude; ranking helpers
/// treat NaN as the lowest possible score.
pub fn cosine_similarity(query: &[f32], candidate: &[f32]) -> Result<f32, ApiError> {
    if query.is_empty() || candidate.is_empty() {
        return Err(ApiError::BadRequest(
            "Vectors must not be empty".to_string(),
        ));
    }
    if query.len() != candidate.len() {
        return Err(ApiError::BadRequest(format!(
            "Vector length mismatch: {} != {}",
            query.len(),
            candidate.len()
        )));
    }

    let query_view = ArrayView1::from(query);
    let candidate_view = ArrayView1::from(candidate);

    let dot = query_view.dot(&candidate_view);
    let denom = query_view.dot(&query_view).sqrt() * candidate_view.dot(&candidate_view).sqrt();

    Ok(dot / denom)
}

/// Score used for ordering: NaN (zero-magnitude input) sorts below
/// every real similarity.
pub fn rank_score(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

pub fn rank_descending_by_cosine(
    query: &[f32],
    candidates: &[Vec<f32>],
) -> Result<Vec<(usize, f32)>, ApiError> {
    let mut scores = Vec::with_capacity(candidates.len());
    for (idx, candidate) in candidates.iter().enumerate() {
        let score = cosine_similarity(query, candidate)?;
        scores.push((idx, score));
    }

    scores.sort_by(|left, right| {
        rank_score(right.1)
            .partial_cmp(&rank_score(left.1))
            .unwrap_or(Ordering::Equal)
    });
    Ok(scores)
}
