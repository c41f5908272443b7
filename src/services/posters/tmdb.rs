//! TMDB poster provider
//!
//! API Flow:
//! 1. Details: /movie/{id} → `poster_path` for the corpus movie id
//! 2. Fallback search: /search/movie?query={title} → first result with a `poster_path`
//!
//! The image URL is the configured image base joined with the `poster_path`.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    models::{MovieId, MovieSummary, TmdbMovieDetails, TmdbSearchResponse},
    services::posters::{
        cache::{CacheKey, PosterCache},
        PosterProvider,
    },
};

#[derive(Clone)]
pub struct TmdbPosterProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_url: String,
    cache: PosterCache,
}

impl TmdbPosterProvider {
    /// Creates a provider whose every request is bounded by `timeout`
    pub fn new(
        cache: PosterCache,
        api_key: String,
        api_url: String,
        image_url: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            image_url: image_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    fn image_for(&self, poster_path: &str) -> String {
        if poster_path.starts_with('/') {
            format!("{}{}", self.image_url, poster_path)
        } else {
            format!("{}/{}", self.image_url, poster_path)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Poster path from the movie details endpoint
    async fn poster_path_by_id(&self, id: MovieId) -> AppResult<Option<String>> {
        let details: TmdbMovieDetails = self.get_json(&format!("/movie/{}", id), &[]).await?;
        Ok(details.poster_path.filter(|p| !p.is_empty()))
    }

    /// Poster path of the first title search result that has one
    async fn poster_path_by_title(&self, title: &str) -> AppResult<Option<String>> {
        let key = CacheKey::title_search(title);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let response: TmdbSearchResponse =
            self.get_json("/search/movie", &[("query", title)]).await?;
        let poster_path = response.first_poster_path().map(str::to_string);

        self.cache.insert(key, poster_path.clone()).await;
        Ok(poster_path)
    }

    async fn lookup(&self, movie: &MovieSummary) -> Option<String> {
        match self.poster_path_by_id(movie.id).await {
            Ok(Some(path)) => return Some(self.image_for(&path)),
            Ok(None) => {
                tracing::debug!(movie_id = movie.id, "TMDB details have no poster");
            }
            Err(e) => {
                tracing::warn!(
                    movie_id = movie.id,
                    error = %e,
                    provider = "tmdb",
                    "Poster lookup by id failed"
                );
            }
        }

        match self.poster_path_by_title(&movie.title).await {
            Ok(path) => path.map(|path| self.image_for(&path)),
            Err(e) => {
                tracing::warn!(
                    title = %movie.title,
                    error = %e,
                    provider = "tmdb",
                    "Poster lookup by title failed"
                );
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl PosterProvider for TmdbPosterProvider {
    async fn poster_url(&self, movie: &MovieSummary) -> Option<String> {
        let key = CacheKey::Poster(movie.id);
        if let Some(cached) = self.cache.get(&key).await {
            return cached;
        }

        let url = self.lookup(movie).await;

        tracing::info!(
            movie_id = movie.id,
            found = url.is_some(),
            provider = "tmdb",
            "Poster lookup completed"
        );

        self.cache.insert(key, url.clone()).await;
        url
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
