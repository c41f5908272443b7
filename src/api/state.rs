use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::{
    config::Config,
    corpus,
    error::{AppError, AppResult},
    models::IndexStats,
    recommender::{self, Index},
    services::PosterProvider,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Swapped wholesale on reload; readers keep their snapshot
    index: RwLock<Arc<Index>>,
    /// Serializes rebuilds so a corpus version is built at most once
    reload_lock: Mutex<()>,
    posters: Arc<dyn PosterProvider>,
    config: Config,
}

impl AppState {
    /// Creates state around an already built index
    pub fn new(index: Index, posters: Arc<dyn PosterProvider>, config: Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                index: RwLock::new(Arc::new(index)),
                reload_lock: Mutex::new(()),
                posters,
                config,
            }),
        }
    }

    /// Current index snapshot
    pub async fn index(&self) -> Arc<Index> {
        self.inner.index.read().await.clone()
    }

    pub fn posters(&self) -> Arc<dyn PosterProvider> {
        self.inner.posters.clone()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub async fn stats(&self) -> IndexStats {
        let index = self.index().await;
        stats_for(index.as_ref())
    }

    /// Reloads the corpus and swaps in a freshly built index.
    ///
    /// On failure the current index stays in place.
    pub async fn reload(&self) -> AppResult<IndexStats> {
        let _guard = self.inner.reload_lock.lock().await;

        let config = self.inner.config.clone();
        let index = tokio::task::spawn_blocking(move || load_index(&config))
            .await
            .map_err(|e| AppError::Internal(format!("Index build task failed: {}", e)))??;

        let stats = stats_for(&index);
        *self.inner.index.write().await = Arc::new(index);

        tracing::info!(
            movies = stats.movies,
            vocabulary_size = stats.vocabulary_size,
            "Recommendation index reloaded"
        );

        Ok(stats)
    }
}

/// Loads the configured corpus and builds an index from it. Blocking.
pub fn load_index(config: &Config) -> AppResult<Index> {
    let movies = corpus::load_movies(&config.corpus_path, config.tag_policy)?;
    Ok(recommender::build_index_with(&movies, &config.vectorizer())?)
}

fn stats_for(index: &Index) -> IndexStats {
    IndexStats {
        movies: index.len(),
        vocabulary_size: index.vocabulary().len(),
        max_features: index.vectorizer().max_features(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::models::Movie;
    use crate::services::DisabledPosterProvider;

    fn seed_index() -> Index {
        recommender::build_index(&[Movie {
            id: 1,
            title: "Seed".to_string(),
            tags: "seed".to_string(),
        }])
        .unwrap()
    }

    #[tokio::test]
    async fn test_concurrent_reloads_both_succeed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "movie_id,title,tags\n10,Space,space alien\n11,Western,cowboy desert\n12,Aliens,alien invasion\n"
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config {
            corpus_path: file.path().to_string_lossy().to_string(),
            ..Config::default()
        };
        let expected = stats_for(&load_index(&config).unwrap());
        let state = AppState::new(seed_index(), Arc::new(DisabledPosterProvider), config);

        let (first, second) = tokio::join!(state.reload(), state.reload());

        assert_eq!(first.unwrap(), expected);
        assert_eq!(second.unwrap(), expected);
        assert_eq!(state.stats().await, expected);
        assert_eq!(state.index().await.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_snapshot() {
        let config = Config {
            corpus_path: "/definitely/not/here.csv".to_string(),
            ..Config::default()
        };
        let state = AppState::new(seed_index(), Arc::new(DisabledPosterProvider), config);
        let before = state.index().await;

        assert!(matches!(state.reload().await, Err(AppError::Corpus(_))));
        assert!(Arc::ptr_eq(&before, &state.index().await));
    }
}
