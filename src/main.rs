//! NFT Sentiment Service — Binary Entrypoint
//! Loads config, wires the news backend into the pipeline and boots the Axum router.

use nft_sentiment_analyzer::api::{create_router, AppState};
use nft_sentiment_analyzer::config::AnalyzerConfig;
use nft_sentiment_analyzer::ingest::NewsSource;
use nft_sentiment_analyzer::metrics::Metrics;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nft_sentiment_analyzer=info,warn"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    // The shuttle runtime may already own the global subscriber.
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AnalyzerConfig::load()?;
    let state = AppState::from_config(&cfg)?;
    tracing::info!(
        positive = state.pipeline.profile().positive,
        negative = state.pipeline.profile().negative,
        backend = state.source.name(),
        "analyzer configured"
    );

    let mut router = create_router(state, &cfg.server.allowed_origins);
    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = ?e, "prometheus recorder not installed; /metrics disabled"),
    }

    Ok(router.into())
}
