use std::time::Duration;

use serde::Deserialize;

use crate::corpus::TagPolicy;
use crate::recommender::{VectorizerConfig, DEFAULT_MAX_FEATURES, DEFAULT_TOP_N};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the TMDB movies CSV file
    #[serde(default = "default_corpus_path")]
    pub corpus_path: String,

    /// Which movie fields are joined into tags
    #[serde(default)]
    pub tag_policy: TagPolicy,

    /// Vocabulary size cap
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Result count when a request does not specify one
    #[serde(default = "default_results")]
    pub default_results: usize,

    /// Largest result count a request may ask for
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// TMDB API key. Posters are disabled when unset.
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Prefix joined with a TMDB `poster_path`
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Per-request timeout for poster lookups
    #[serde(default = "default_poster_timeout_secs")]
    pub poster_timeout_secs: u64,

    /// How long poster lookups (hits and misses) are cached
    #[serde(default = "default_poster_cache_ttl_secs")]
    pub poster_cache_ttl_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_corpus_path() -> String {
    "tmdb_5000_movies.csv".to_string()
}

fn default_max_features() -> usize {
    DEFAULT_MAX_FEATURES
}

fn default_results() -> usize {
    DEFAULT_TOP_N
}

fn default_max_results() -> usize {
    50
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_poster_timeout_secs() -> u64 {
    5
}

fn default_poster_cache_ttl_secs() -> u64 {
    86400 // 1 day
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            tag_policy: TagPolicy::default(),
            max_features: default_max_features(),
            default_results: default_results(),
            max_results: default_max_results(),
            tmdb_api_key: None,
            tmdb_api_url: default_tmdb_api_url(),
            tmdb_image_url: default_tmdb_image_url(),
            poster_timeout_secs: default_poster_timeout_secs(),
            poster_cache_ttl_secs: default_poster_cache_ttl_secs(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would make every request fail
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_features == 0 {
            anyhow::bail!("MAX_FEATURES must be at least 1");
        }
        if self.default_results == 0 {
            anyhow::bail!("DEFAULT_RESULTS must be at least 1");
        }
        if self.default_results > self.max_results {
            anyhow::bail!("DEFAULT_RESULTS must not exceed MAX_RESULTS");
        }
        if self.poster_timeout_secs == 0 {
            anyhow::bail!("POSTER_TIMEOUT_SECS must be at least 1");
        }
        Ok(())
    }

    pub fn vectorizer(&self) -> VectorizerConfig {
        VectorizerConfig {
            max_features: self.max_features,
            ..VectorizerConfig::default()
        }
    }

    pub fn poster_timeout(&self) -> Duration {
        Duration::from_secs(self.poster_timeout_secs)
    }

    pub fn poster_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.poster_cache_ttl_secs)
    }

    /// API key, ignoring blank values
    pub fn tmdb_api_key(&self) -> Option<&str> {
        self.tmdb_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
