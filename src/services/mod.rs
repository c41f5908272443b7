pub mod posters;
pub mod recommendations;

pub use posters::{DisabledPosterProvider, PosterCache, PosterProvider, TmdbPosterProvider};
