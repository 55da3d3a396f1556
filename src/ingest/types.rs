// src/ingest/types.rs
use anyhow::Result;

use crate::post::RawItem;

/// Fetch strategy: one news backend able to search for an entity.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch raw items mentioning `entity`. Errors are recovered by the caller.
    async fn fetch(&self, entity: &str) -> Result<Vec<RawItem>>;

    /// Provenance label stamped on every post (e.g. "Google News").
    fn name(&self) -> &'static str;

    /// Human-openable search URL; used as `source_url` for items without a link.
    fn search_url(&self, entity: &str) -> Option<String>;
}
