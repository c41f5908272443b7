use serde::{Deserialize, Serialize};

pub mod tmdb;

pub use tmdb::{TmdbMovieDetails, TmdbSearchResponse, TmdbSearchResult};

/// TMDB movie id
pub type MovieId = i64;

/// A movie in the recommendation corpus
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Space-joined genre, keyword (and optionally overview) text
    pub tags: String,
}

/// Identity of a movie, without its tags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
        }
    }
}

/// A ranked match with its cosine similarity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedMovie {
    pub id: MovieId,
    pub title: String,
    pub score: f64,
}

impl From<&RankedMovie> for MovieSummary {
    fn from(ranked: &RankedMovie) -> Self {
        Self {
            id: ranked.id,
            title: ranked.title.clone(),
        }
    }
}

/// Poster for a recommended movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Poster {
    Image { url: String },
    /// Text shown in place of a missing image
    Placeholder { text: String },
}

impl Poster {
    pub fn from_lookup(url: Option<String>, title: &str) -> Self {
        match url {
            Some(url) => Poster::Image { url },
            None => Poster::Placeholder {
                text: title.to_string(),
            },
        }
    }
}

/// A ranked movie decorated with its poster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub id: MovieId,
    pub title: String,
    pub score: f64,
    pub poster: Poster,
}

/// Response for a keyword query
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub query: String,
    pub results: Vec<Recommendation>,
}

/// Response for a "more like this" query
#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarMoviesResponse {
    pub movie: MovieSummary,
    pub results: Vec<Recommendation>,
}

/// Summary of the currently loaded index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexStats {
    pub movies: usize,
    pub vocabulary_size: usize,
    pub max_features: usize,
}
