// tests/metrics.rs
//
// Own test binary: installs the global Prometheus recorder once.

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use nft_sentiment_analyzer::ingest::NewsSource;
use nft_sentiment_analyzer::metrics::Metrics;
use nft_sentiment_analyzer::{Pipeline, RawItem};

struct OneItem;

#[async_trait]
impl NewsSource for OneItem {
    async fn fetch(&self, _entity: &str) -> Result<Vec<RawItem>> {
        Ok(vec![
            RawItem::new("Doodles trading volume spikes on launch day"),
            RawItem::new("short"),
        ])
    }
    fn name(&self) -> &'static str {
        "OneItem"
    }
    fn search_url(&self, _entity: &str) -> Option<String> {
        None
    }
}

#[tokio::test]
async fn pipeline_series_exposed_on_metrics_route() {
    let metrics = Metrics::init().expect("install recorder");

    let resp = Pipeline::default().run("Doodles", &OneItem).await.expect("analysis");
    assert_eq!(resp.total_posts, 1);

    let req = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let out = metrics.router().oneshot(req).await.unwrap();
    assert_eq!(out.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(out.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();

    assert!(text.contains("pipeline_requests_total"));
    assert!(text.contains("pipeline_posts_filtered_total"));
    assert!(text.contains("pipeline_posts_classified_total"));
    assert!(text.contains("pipeline_fetch_ms"));
}
