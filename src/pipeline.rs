// src/pipeline.rs
//! # Pipeline facade
//! fetch (backend) → normalize → length filter → classify + aggregate → response.
//!
//! Every failure ends in one of two error outcomes (`no_data`, `internal`);
//! nothing escapes as a panic or an unhandled error. A failed fetch counts as
//! zero items and therefore surfaces as `no_data`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use anyhow::Result;
use futures::FutureExt;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::aggregate::{aggregate, Breakdown, Trend, TrendProfile};
use crate::config::{AnalyzerConfig, DEFAULT_MIN_TEXT_LEN};
use crate::ingest::{ensure_metrics_described, NewsSource};
use crate::post::{Post, RawItem};
use crate::sentiment::{LexiconPolarity, SentimentClassifier};

/// User-facing failure of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("No recent data found for this entity.")]
    NoData,
    #[error("Internal server error. Please try again later.")]
    Internal,
}

impl PipelineError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::NoData => "no_data",
            PipelineError::Internal => "internal",
        }
    }
}

/// Error JSON: `{"error": ..., "code": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

impl From<PipelineError> for ErrorResponse {
    fn from(e: PipelineError) -> Self {
        Self::new(e.to_string(), e.code())
    }
}

/// Success JSON for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeResponse {
    pub entity_name: String,
    pub total_posts: usize,
    pub posts: Vec<Post>,
    pub sentiment_breakdown: Breakdown,
    #[serde(skip)]
    pub overall_score: f64,
    pub overall_trend: Trend,
}

pub type AnalysisOutcome = std::result::Result<AnalyzeResponse, PipelineError>;

/// Request-scoped analysis runner. Holds only read-only configuration, so a
/// single instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct Pipeline {
    classifier: SentimentClassifier,
    profile: TrendProfile,
    min_text_len: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(SentimentClassifier::default(), TrendProfile::default())
    }
}

impl Pipeline {
    pub fn new(classifier: SentimentClassifier, profile: TrendProfile) -> Self {
        Self {
            classifier,
            profile,
            min_text_len: DEFAULT_MIN_TEXT_LEN,
        }
    }

    /// Posts with `text` of this many chars or fewer are dropped.
    pub fn with_min_text_len(mut self, min_text_len: usize) -> Self {
        self.min_text_len = min_text_len;
        self
    }

    pub fn from_config(cfg: &AnalyzerConfig) -> Result<Self> {
        let classifier = SentimentClassifier::new(
            cfg.lexicon(),
            std::sync::Arc::new(LexiconPolarity::new()),
        );
        Ok(Self::new(classifier, cfg.trend_profile()?).with_min_text_len(cfg.filter.min_text_len))
    }

    pub fn profile(&self) -> TrendProfile {
        self.profile
    }

    /// Fetch from `source` and analyze the result. A panicking backend is
    /// reported as [`PipelineError::Internal`].
    pub async fn run(&self, entity: &str, source: &dyn NewsSource) -> AnalysisOutcome {
        ensure_metrics_described();
        counter!("pipeline_requests_total").increment(1);

        let t0 = Instant::now();
        let fetched = match AssertUnwindSafe(source.fetch(entity)).catch_unwind().await {
            Ok(fetched) => fetched,
            Err(cause) => return Err(internal_from_panic(entity, "fetch", cause)),
        };
        let items = match fetched {
            Ok(items) => items,
            Err(e) => {
                warn!(error = ?e, provider = source.name(), entity, "fetch failed; treating as zero items");
                counter!("pipeline_fetch_errors_total").increment(1);
                Vec::new()
            }
        };
        histogram!("pipeline_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let fallback_url = source.search_url(entity);
        self.analyze_items(entity, source.name(), fallback_url.as_deref(), items)
    }

    /// Analyze an already-fetched batch. Panics are caught and reported as
    /// [`PipelineError::Internal`].
    pub fn analyze_items(
        &self,
        entity: &str,
        platform: &str,
        fallback_url: Option<&str>,
        items: Vec<RawItem>,
    ) -> AnalysisOutcome {
        contain_panic(entity, || self.build_response(entity, platform, fallback_url, items))
    }

    fn build_response(
        &self,
        entity: &str,
        platform: &str,
        fallback_url: Option<&str>,
        items: Vec<RawItem>,
    ) -> AnalysisOutcome {
        let fetched = items.len();
        let posts: Vec<Post> = items
            .into_iter()
            .map(|raw| Post::from_raw(raw, platform, fallback_url))
            .filter(|p| p.text_len() > self.min_text_len)
            .collect();
        counter!("pipeline_posts_filtered_total").increment((fetched - posts.len()) as u64);

        if posts.is_empty() {
            info!(entity, fetched, "no usable posts");
            return Err(PipelineError::NoData);
        }

        let result = aggregate(posts, &self.classifier, &self.profile);
        counter!("pipeline_posts_classified_total").increment(result.posts.len() as u64);
        info!(
            entity,
            fetched,
            kept = result.posts.len(),
            overall_score = result.overall_score,
            trend = result.trend.label(),
            "entity analyzed"
        );

        Ok(AnalyzeResponse {
            entity_name: entity.to_string(),
            total_posts: result.posts.len(),
            posts: result.posts,
            sentiment_breakdown: result.breakdown,
            overall_score: result.overall_score,
            overall_trend: result.trend,
        })
    }
}

fn contain_panic(entity: &str, f: impl FnOnce() -> AnalysisOutcome) -> AnalysisOutcome {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|cause| Err(internal_from_panic(entity, "analysis", cause)))
}

fn internal_from_panic(
    entity: &str,
    stage: &'static str,
    cause: Box<dyn Any + Send>,
) -> PipelineError {
    let msg = cause
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| cause.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    error!(entity, stage, panic = %msg, "analysis pipeline panicked");
    counter!("pipeline_panics_total", "stage" => stage).increment(1);
    PipelineError::Internal
}
