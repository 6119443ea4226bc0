use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use watchnext_api::{
    config::Config,
    db::{
        self, AnalyticsProvider, Cache, CacheWriterHandle, InMemoryProfileStore, PgProfileStore,
        ProfileStore,
    },
    error::set_development_mode,
    middleware::{LruRateLimitStore, RateLimiter},
    routes::{create_router, AppState},
    services::{
        providers::{CatalogProvider, OpenAiChatProvider, StaticCatalog, TmdbProvider},
        scoring::AiScorer,
        RecommendationService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watchnext_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    set_development_mode(config.is_development());
    tracing::info!(environment = %config.environment, "Configuration loaded");

    let (store, analytics) = profile_store(&config).await?;
    let (cache, cache_writer) = cache(&config).await;
    let catalog = catalog(&config, cache);
    let ai = ai_scorer(&config);

    let service = RecommendationService::new(store, analytics, catalog, ai);
    let rate_limiter = RateLimiter::new(Arc::new(LruRateLimitStore::new(
        config.rate_limit_max_requests,
        Duration::from_secs(config.rate_limit_window_secs),
        config.rate_limit_capacity,
    )));

    let app = create_router(AppState::new(service, rate_limiter));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    if let Some(writer) = cache_writer {
        writer.shutdown().await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn profile_store(
    config: &Config,
) -> Result<(Arc<dyn ProfileStore>, Arc<dyn AnalyticsProvider>)> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, using in-memory profile store");
        let store = Arc::new(InMemoryProfileStore::new());
        let profiles: Arc<dyn ProfileStore> = store.clone();
        let analytics: Arc<dyn AnalyticsProvider> = store;
        return Ok((profiles, analytics));
    };

    let pool = db::create_pool(database_url).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database connected and migrated");

    let store = Arc::new(PgProfileStore::new(pool));
    let profiles: Arc<dyn ProfileStore> = store.clone();
    let analytics: Arc<dyn AnalyticsProvider> = store;
    Ok((profiles, analytics))
}

/// Redis is optional; a bad URL or unreachable server disables caching
async fn cache(config: &Config) -> (Option<Cache>, Option<CacheWriterHandle>) {
    let Some(redis_url) = config.redis_url.as_deref() else {
        return (None, None);
    };

    match db::create_redis_client(redis_url) {
        Ok(client) => {
            let (cache, writer) = Cache::new(client).await;
            tracing::info!("Redis cache enabled");
            (Some(cache), Some(writer))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Redis unavailable, catalog caching disabled");
            (None, None)
        }
    }
}

fn catalog(config: &Config, cache: Option<Cache>) -> Arc<dyn CatalogProvider> {
    match config.tmdb_api_key.clone() {
        Some(api_key) => Arc::new(TmdbProvider::new(api_key, config.tmdb_api_url.clone(), cache)),
        None => {
            tracing::warn!("TMDB_API_KEY not set, serving the static catalog");
            Arc::new(StaticCatalog::new())
        }
    }
}

fn ai_scorer(config: &Config) -> Option<AiScorer> {
    let Some(api_key) = config.openai_api_key.clone() else {
        tracing::info!("OPENAI_API_KEY not set, AI scoring disabled");
        return None;
    };

    let chat = OpenAiChatProvider::new(
        api_key,
        config.openai_api_url.clone(),
        config.openai_model.clone(),
    );
    Some(AiScorer::new(
        Arc::new(chat),
        Duration::from_secs(config.ai_timeout_secs),
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
