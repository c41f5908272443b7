//! Poster lookup abstraction
//!
//! Posters are decoration on top of a ranking: a provider answers with an
//! image URL or nothing, and nothing is an ordinary outcome. Providers never
//! return errors to their callers; failures are logged and become `None`.
use crate::models::MovieSummary;

pub mod cache;
pub mod tmdb;

pub use cache::PosterCache;
pub use tmdb::TmdbPosterProvider;

/// Trait for poster image sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterProvider: Send + Sync {
    /// Image URL for `movie`, or `None` when the source has no poster or failed
    async fn poster_url(&self, movie: &MovieSummary) -> Option<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Provider used when no poster source is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPosterProvider;

#[async_trait::async_trait]
impl PosterProvider for DisabledPosterProvider {
    async fn poster_url(&self, _movie: &MovieSummary) -> Option<String> {
        None
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
