use std::sync::Arc;
use std::time::Duration;

use cinematch_api::{
    config::Config,
    routes::{create_router, AppState},
    services::{
        providers::{ArticleSource, CompletionSource, GeminiProvider, MediaWikiProvider},
        recommend::Recommender,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        gemini_key = if config.gemini_api_key.is_empty() {
            "not found"
        } else {
            "found"
        },
        "Configuration loaded"
    );

    let timeout = Duration::from_secs(config.upstream_timeout_secs);
    let articles: Arc<dyn ArticleSource> =
        Arc::new(MediaWikiProvider::new(config.wiki_api_url.clone(), timeout)?);
    let completions: Arc<dyn CompletionSource> = Arc::new(GeminiProvider::new(
        config.gemini_api_url.clone(),
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        timeout,
    )?);
    let recommender = Arc::new(Recommender::new(
        Arc::clone(&articles),
        completions,
        config.enrich_concurrency,
    ));

    let state = AppState {
        articles,
        recommender,
    };
    let app = create_router(state, &config.client_url);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
