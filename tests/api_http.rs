// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use nft_sentiment_analyzer::api::{create_router, AppState};
use nft_sentiment_analyzer::ingest::NewsSource;
use nft_sentiment_analyzer::{Pipeline, RawItem, SentimentClassifier, TrendProfile};

const BODY_LIMIT: usize = 1024 * 1024;

struct Canned(Vec<RawItem>);

#[async_trait]
impl NewsSource for Canned {
    async fn fetch(&self, entity: &str) -> Result<Vec<RawItem>> {
        if entity.eq_ignore_ascii_case("ghost") {
            return Ok(Vec::new());
        }
        Ok(self.0.clone())
    }
    fn name(&self) -> &'static str {
        "Canned"
    }
    fn search_url(&self, _entity: &str) -> Option<String> {
        None
    }
}

struct Exploding;

#[async_trait]
impl NewsSource for Exploding {
    async fn fetch(&self, _entity: &str) -> Result<Vec<RawItem>> {
        panic!("driver crashed")
    }
    fn name(&self) -> &'static str {
        "Exploding"
    }
    fn search_url(&self, _entity: &str) -> Option<String> {
        None
    }
}

fn router_with(source: Arc<dyn NewsSource>) -> Router {
    let pipeline = Pipeline::new(SentimentClassifier::default(), TrendProfile::BROAD);
    create_router(
        AppState::new(pipeline, source),
        &["http://localhost:3000".to_string()],
    )
}

fn test_router() -> Router {
    router_with(Arc::new(Canned(vec![
        RawItem::new("Bored Ape sales surge as whales return"),
        RawItem::new("Bored Ape floor holds steady through the week"),
    ])))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

#[tokio::test]
async fn health_returns_ok() {
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = test_router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn analyze_returns_full_contract() {
    let (status, v) = get(test_router(), "/analyze?entity_name=Bored%20Ape").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(v["entity_name"], "Bored Ape");
    assert_eq!(v["total_posts"], 2);
    assert!(v["posts"].is_array());
    assert_eq!(v["posts"][0]["sentiment"], "HYPE");
    for key in ["POSITIVE", "NEGATIVE", "NEUTRAL", "HYPE"] {
        assert!(v["sentiment_breakdown"].get(key).is_some(), "missing {key}");
    }
    assert_eq!(v["overall_trend"], "Neutral 😐");
}

#[tokio::test]
async fn legacy_nft_name_param_is_accepted() {
    let (status, v) = get(test_router(), "/analyze?nft_name=Bored%20Ape").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["entity_name"], "Bored Ape");
}

#[tokio::test]
async fn missing_entity_is_bad_request() {
    let (status, v) = get(test_router(), "/analyze").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["code"], "bad_request");

    let (status, _) = get(test_router(), "/analyze?entity_name=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn no_data_is_404_with_code() {
    let (status, v) = get(test_router(), "/analyze?entity_name=ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["code"], "no_data");
    assert_eq!(v["error"], "No recent data found for this entity.");
}

#[tokio::test]
async fn panicking_backend_is_generic_internal_error() {
    let (status, v) = get(router_with(Arc::new(Exploding)), "/analyze?entity_name=x").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(v["code"], "internal");
    assert_eq!(v["error"], "Internal server error. Please try again later.");
    assert!(!v.to_string().contains("driver crashed"));
}

#[tokio::test]
async fn cors_allows_configured_origin_only() {
    let req = Request::builder()
        .uri("/health")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let resp = test_router().oneshot(req).await.unwrap();
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|h| h.to_str().ok()),
        Some("http://localhost:3000")
    );

    let req = Request::builder()
        .uri("/health")
        .header("origin", "https://evil.example")
        .body(Body::empty())
        .unwrap();
    let resp = test_router().oneshot(req).await.unwrap();
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}
