use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{MovieId, MovieSummary, Poster, RankedMovie, Recommendation},
    recommender::{self, Index},
    services::posters::PosterProvider,
};

/// Ranks the corpus against `query` and attaches posters.
///
/// Ranking errors propagate; poster problems only ever turn into placeholders.
pub async fn recommend_with_posters(
    index: Arc<Index>,
    posters: Arc<dyn PosterProvider>,
    query: &str,
    n: usize,
) -> AppResult<Vec<Recommendation>> {
    let ranked = recommender::recommend(&index, query, n)?;

    tracing::info!(
        query = %query,
        results = ranked.len(),
        "Keyword ranking completed"
    );

    Ok(attach_posters(posters, ranked).await)
}

/// Movies most similar to `movie_id`, with posters
pub async fn similar_with_posters(
    index: Arc<Index>,
    posters: Arc<dyn PosterProvider>,
    movie_id: MovieId,
    n: usize,
) -> AppResult<(MovieSummary, Vec<Recommendation>)> {
    let ranked = recommender::similar_movies(&index, movie_id, n)?;
    let movie = index
        .movie(movie_id)
        .cloned()
        .ok_or(recommender::RecommendError::UnknownMovie(movie_id))?;

    tracing::info!(
        movie_id,
        results = ranked.len(),
        "Similar movie ranking completed"
    );

    Ok((movie, attach_posters(posters, ranked).await))
}

/// Fetches posters for every ranked movie in parallel, preserving rank order
pub async fn attach_posters(
    posters: Arc<dyn PosterProvider>,
    ranked: Vec<RankedMovie>,
) -> Vec<Recommendation> {
    let mut tasks = Vec::with_capacity(ranked.len());

    for movie in &ranked {
        let provider = posters.clone();
        let summary = MovieSummary::from(movie);
        let task = tokio::spawn(async move { provider.poster_url(&summary).await });
        tasks.push(task);
    }

    let mut results = Vec::with_capacity(ranked.len());
    let mut missing = 0;

    for (movie, task) in ranked.into_iter().zip(tasks) {
        let url = match task.await {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(error = %e, movie_id = movie.id, "Poster task join error");
                None
            }
        };
        if url.is_none() {
            missing += 1;
        }

        let poster = Poster::from_lookup(url, &movie.title);
        results.push(Recommendation {
            id: movie.id,
            title: movie.title,
            score: movie.score,
            poster,
        });
    }

    if missing > 0 {
        tracing::debug!(
            missing,
            provider = posters.name(),
            "Using placeholders for missing posters"
        );
    }

    results
}
