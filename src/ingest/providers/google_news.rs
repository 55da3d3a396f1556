// src/ingest/providers/google_news.rs
//! Google News search via its public RSS feed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use quick_xml::de::from_str;
use serde::Deserialize;
use url::Url;

use crate::config::SourceSection;
use crate::ingest::types::NewsSource;
use crate::post::RawItem;

const FEED_URL: &str = "https://news.google.com/rss/search";
const SEARCH_URL: &str = "https://news.google.com/search";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    source: Option<Outlet>,
}

#[derive(Debug, Deserialize)]
struct Outlet {
    #[serde(rename = "$text")]
    name: Option<String>,
}

enum Mode {
    Fixture(String),
    Http(reqwest::Client),
}

pub struct GoogleNewsProvider {
    mode: Mode,
    settings: SourceSection,
}

impl GoogleNewsProvider {
    pub fn from_client(client: reqwest::Client, settings: SourceSection) -> Self {
        Self {
            mode: Mode::Http(client),
            settings,
        }
    }

    /// Serve a canned RSS document instead of calling out.
    pub fn from_fixture(content: &str) -> Self {
        Self {
            mode: Mode::Fixture(content.to_string()),
            settings: SourceSection::default(),
        }
    }

    fn params(&self, entity: &str) -> [(&'static str, String); 4] {
        let lang = self.settings.language.trim().to_ascii_lowercase();
        [
            ("q", self.settings.query_for(entity)),
            ("hl", format!("{lang}-US")),
            ("gl", "US".to_string()),
            ("ceid", format!("US:{lang}")),
        ]
    }

    fn feed_url(&self, entity: &str) -> Result<Url> {
        Url::parse_with_params(FEED_URL, self.params(entity)).context("building google news feed url")
    }

    fn parse_items(&self, xml: &str) -> Result<Vec<RawItem>> {
        let rss: Rss = from_str(xml).context("parsing google news rss xml")?;

        let out: Vec<RawItem> = rss
            .channel
            .item
            .into_iter()
            .filter_map(|it| {
                let title = it.title?.trim().to_string();
                let outlet = it.source.and_then(|s| s.name).map(|n| n.trim().to_string());
                let title = strip_outlet_suffix(&title, outlet.as_deref());
                if title.is_empty() {
                    return None;
                }
                Some(RawItem {
                    title,
                    description: None,
                    link: it.link,
                    published: it.pub_date,
                })
            })
            .take(self.settings.max_items)
            .collect();

        counter!("ingest_items_total", "provider" => self.name()).increment(out.len() as u64);
        Ok(out)
    }
}

/// Google appends " - Outlet" to every headline; drop it when the outlet is known.
fn strip_outlet_suffix(title: &str, outlet: Option<&str>) -> String {
    match outlet.filter(|o| !o.is_empty()) {
        Some(o) => title
            .strip_suffix(o)
            .and_then(|t| t.strip_suffix(" - "))
            .unwrap_or(title)
            .trim()
            .to_string(),
        None => title.to_string(),
    }
}

#[async_trait]
impl NewsSource for GoogleNewsProvider {
    async fn fetch(&self, entity: &str) -> Result<Vec<RawItem>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items(s),
            Mode::Http(client) => {
                let url = self.feed_url(entity)?;
                let body = client
                    .get(url)
                    .send()
                    .await
                    .context("google news http get()")?
                    .error_for_status()
                    .context("google news http status")?
                    .text()
                    .await
                    .context("google news http .text()")?;
                self.parse_items(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "Google News"
    }

    fn search_url(&self, entity: &str) -> Option<String> {
        Url::parse_with_params(SEARCH_URL, self.params(entity))
            .ok()
            .map(String::from)
    }
}
