// src/ingest/providers/newsapi.rs
//! NewsAPI `everything` search. Requires `NEWSAPI_KEY`.
//!
//! API: `https://newsapi.org/v2/everything`

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;
use url::Url;

use crate::config::SourceSection;
use crate::ingest::types::NewsSource;
use crate::post::RawItem;

const EVERYTHING_URL: &str = "https://newsapi.org/v2/everything";

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "publishedAt")]
    published_at: Option<String>,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        api_key: Option<String>,
    },
}

pub struct NewsApiProvider {
    mode: Mode,
    settings: SourceSection,
}

impl NewsApiProvider {
    pub fn from_client(
        client: reqwest::Client,
        settings: SourceSection,
        api_key: Option<String>,
    ) -> Self {
        Self {
            mode: Mode::Http { client, api_key },
            settings,
        }
    }

    /// Serve a canned JSON response instead of calling out.
    pub fn from_fixture(content: &str) -> Self {
        Self {
            mode: Mode::Fixture(content.to_string()),
            settings: SourceSection::default(),
        }
    }

    fn query_url(&self, entity: &str) -> Result<Url> {
        let page_size = self.settings.max_items.clamp(1, 100).to_string();
        Url::parse_with_params(
            EVERYTHING_URL,
            [
                ("q", self.settings.query_for(entity)),
                ("language", self.settings.language.trim().to_ascii_lowercase()),
                ("sortBy", "publishedAt".to_string()),
                ("pageSize", page_size),
            ],
        )
        .context("building newsapi url")
    }

    fn parse_items(&self, body: &str) -> Result<Vec<RawItem>> {
        let resp: NewsApiResponse =
            serde_json::from_str(body).context("parsing newsapi json")?;
        if resp.status != "ok" {
            bail!(
                "newsapi returned status `{}`: {}",
                resp.status,
                resp.message.unwrap_or_default()
            );
        }

        let out: Vec<RawItem> = resp
            .articles
            .into_iter()
            .filter_map(|a| {
                let title = a.title?.trim().to_string();
                // NewsAPI marks deleted articles with this placeholder title.
                if title.is_empty() || title == "[Removed]" {
                    return None;
                }
                Some(RawItem {
                    title,
                    description: a.description.filter(|d| !d.trim().is_empty()),
                    link: a.url,
                    published: a.published_at,
                })
            })
            .take(self.settings.max_items)
            .collect();

        counter!("ingest_items_total", "provider" => self.name()).increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl NewsSource for NewsApiProvider {
    async fn fetch(&self, entity: &str) -> Result<Vec<RawItem>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items(s),
            Mode::Http { client, api_key } => {
                let key = api_key
                    .as_deref()
                    .ok_or_else(|| anyhow!("NEWSAPI_KEY is not set"))?;
                let body = client
                    .get(self.query_url(entity)?)
                    .header("X-Api-Key", key)
                    .send()
                    .await
                    .context("newsapi http get()")?
                    .text()
                    .await
                    .context("newsapi http .text()")?;
                // Error bodies carry status/message too, so parse before judging.
                self.parse_items(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "NewsAPI"
    }

    fn search_url(&self, entity: &str) -> Option<String> {
        self.query_url(entity).ok().map(String::from)
    }
}
