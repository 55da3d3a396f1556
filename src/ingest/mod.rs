// src/ingest/mod.rs
//! News backends. Each one implements [`NewsSource`] and hands raw items to
//! the pipeline; none of them classify anything.

pub mod providers;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

use crate::config::{AnalyzerConfig, Backend};
use crate::ingest::providers::google_news::GoogleNewsProvider;
use crate::ingest::providers::newsapi::NewsApiProvider;
pub use crate::ingest::types::NewsSource;

const USER_AGENT: &str = "nft-sentiment-analyzer/0.1";

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_items_total", "Raw items parsed from news backends.");
        describe_counter!("pipeline_requests_total", "Entity analyses started.");
        describe_counter!(
            "pipeline_fetch_errors_total",
            "Backend fetch/parse errors degraded to zero items."
        );
        describe_counter!(
            "pipeline_posts_filtered_total",
            "Posts dropped for being too short."
        );
        describe_counter!(
            "pipeline_posts_classified_total",
            "Posts classified and aggregated."
        );
        describe_counter!(
            "pipeline_panics_total",
            "Panics contained at the pipeline boundary, by stage."
        );
        describe_counter!(
            "classifier_model_failures_total",
            "Polarity model failures degraded to NEUTRAL."
        );
        describe_histogram!("pipeline_fetch_ms", "Backend fetch time in milliseconds.");
    });
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(4).min(timeout))
        .timeout(timeout)
        .build()
        .context("building http client")
}

/// Build the backend selected in `[source]`.
pub fn build_source(cfg: &AnalyzerConfig) -> Result<Arc<dyn NewsSource>> {
    let src = &cfg.source;
    let client = http_client(src.timeout())?;
    let out: Arc<dyn NewsSource> = match src.backend {
        Backend::GoogleNews => Arc::new(GoogleNewsProvider::from_client(client, src.clone())),
        Backend::Newsapi => Arc::new(NewsApiProvider::from_client(
            client,
            src.clone(),
            AnalyzerConfig::newsapi_key(),
        )),
    };
    tracing::info!(backend = out.name(), "news backend ready");
    Ok(out)
}
