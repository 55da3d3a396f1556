// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod debug;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod post;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{aggregate, AggregateResult, Breakdown, Trend, TrendProfile};
pub use crate::api::create_router;
pub use crate::pipeline::{AnalysisOutcome, AnalyzeResponse, ErrorResponse, Pipeline, PipelineError};
pub use crate::post::{Category, Post, RawItem};
pub use crate::sentiment::{Lexicon, LexiconPolarity, PolarityModel, SentimentClassifier};
