// ============================================================================
// TMDB API Types
// ============================================================================

use serde::Deserialize;

use super::MovieId;

/// Response from GET /movie/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: MovieId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Response from GET /search/movie
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbSearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResult {
    pub id: MovieId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl TmdbSearchResponse {
    /// Poster path of the first result that has one
    pub fn first_poster_path(&self) -> Option<&str> {
        self.results
            .iter()
            .find_map(|result| result.poster_path.as_deref().filter(|p| !p.is_empty()))
    }
}
