use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moviematch_api::{
    api::{create_router, state::load_index, AppState},
    config::Config,
    services::{DisabledPosterProvider, PosterCache, PosterProvider, TmdbPosterProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("moviematch_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Build the index before accepting traffic
    let index = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || load_index(&config))
            .await
            .context("Index build task failed")?
            .context("Failed to build recommendation index")?
    };

    let posters: Arc<dyn PosterProvider> = match config.tmdb_api_key() {
        Some(api_key) => {
            let cache = PosterCache::new(config.poster_cache_ttl());
            cache.spawn_purger(config.poster_cache_ttl());
            Arc::new(TmdbPosterProvider::new(
                cache,
                api_key.to_string(),
                config.tmdb_api_url.clone(),
                config.tmdb_image_url.clone(),
                config.poster_timeout(),
            )?)
        }
        None => {
            tracing::warn!("TMDB_API_KEY not set, posters will use placeholders");
            Arc::new(DisabledPosterProvider)
        }
    };
    tracing::info!(provider = posters.name(), "Poster provider configured");

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(index, posters, config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        // Keep serving; never resolve
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
