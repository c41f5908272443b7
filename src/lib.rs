//! Keyword-based movie recommendations with TMDB posters.
//!
//! [`recommender`] holds the synchronous ranking engine; the remaining
//! modules load the corpus, look up posters and serve everything over HTTP.
pub mod api;
pub mod config;
pub mod corpus;
pub mod error;
pub mod middleware;
pub mod models;
pub mod recommender;
pub mod services;
