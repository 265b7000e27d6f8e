use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use g_edge::board::load_board;
use g_edge::config::{Config, EnvConfig};
use g_edge::data::cache::FeedCache;
use g_edge::data::feeds::FeedService;
use g_edge::data::football_data::FootballDataClient;
use g_edge::monitoring::logging::init_tracing;
use g_edge::polling::BoardPoller;
use g_edge::server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    tracing::info!("⚽ G-Edge backend starting...");

    let env_config = EnvConfig::load()?;
    let mut config = Config::load_or_default(&env_config.config_path)?;
    config.apply_env(&env_config);

    tracing::info!("Upstream: {}", config.upstream.base_url);
    tracing::info!("Supported leagues: {:?}", config.leagues.supported_ids);
    tracing::info!("Default analysis profile: {:?}", config.analysis.profile);

    let client = FootballDataClient::new(
        &env_config.football_data_key,
        &config.upstream,
        &config.leagues,
    )
    .context("Failed to build football-data client")?;

    let feeds = FeedService::new(client, FeedCache::new(&config.cache));
    #[cfg(feature = "metrics")]
    let metrics = Arc::new(
        g_edge::monitoring::metrics::Metrics::new().context("Failed to register metrics")?,
    );
    #[cfg(feature = "metrics")]
    let feeds = feeds.with_metrics(metrics.clone());
    let feeds = Arc::new(feeds);

    let mut state = AppState::new(feeds.clone(), config.analysis.profile);
    #[cfg(feature = "metrics")]
    {
        state = state.with_metrics(metrics);
    }

    let poller = if config.polling.enabled {
        let loader_feeds = feeds.clone();
        let poller = BoardPoller::spawn(
            Duration::from_secs(config.polling.interval_secs),
            config.polling.initial_filter,
            move || {
                let feeds = loader_feeds.clone();
                async move { load_board(&feeds).await }
            },
        );
        state = state.with_board(poller.handle());
        Some(poller)
    } else {
        tracing::info!("Board polling disabled");
        None
    };

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    tracing::info!("✅ Listening on {}", config.server.bind_addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        })
        .await
        .context("Server error")?;

    if let Some(poller) = poller {
        poller.shutdown().await;
    }

    Ok(())
}
