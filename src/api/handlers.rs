use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{IndexStats, MovieId, RecommendationResponse, SimilarMoviesResponse},
    services::recommendations,
};

use super::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    #[serde(default)]
    pub q: String,
    pub n: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarParams {
    pub n: Option<usize>,
}

/// Requested result count, defaulted and bounded by config
fn result_count(state: &AppState, requested: Option<usize>) -> AppResult<usize> {
    let max = state.config().max_results;
    match requested {
        Some(n) if n > max => Err(AppError::InvalidInput(format!(
            "n must be at most {}",
            max
        ))),
        Some(n) => Ok(n),
        None => Ok(state.config().default_results),
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Keyword recommendations with posters
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendParams>,
) -> AppResult<Json<RecommendationResponse>> {
    let n = result_count(&state, params.n)?;

    tracing::info!(
        request_id = %request_id,
        query = %params.q,
        n,
        "Processing recommendation request"
    );

    let results =
        recommendations::recommend_with_posters(state.index().await, state.posters(), &params.q, n)
            .await?;

    Ok(Json(RecommendationResponse {
        query: params.q,
        results,
    }))
}

/// Movies similar to a corpus movie
pub async fn similar(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(movie_id): Path<MovieId>,
    Query(params): Query<SimilarParams>,
) -> AppResult<Json<SimilarMoviesResponse>> {
    let n = result_count(&state, params.n)?;

    tracing::info!(
        request_id = %request_id,
        movie_id,
        n,
        "Processing similar movies request"
    );

    let (movie, results) =
        recommendations::similar_with_posters(state.index().await, state.posters(), movie_id, n)
            .await?;

    Ok(Json(SimilarMoviesResponse { movie, results }))
}

/// Stats of the loaded index
pub async fn index_stats(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.stats().await)
}

/// Rebuild the index from the configured corpus
pub async fn reload_index(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<IndexStats>> {
    tracing::info!(request_id = %request_id, "Reloading recommendation index");
    Ok(Json(state.reload().await?))
}
