// src/post.rs
//! Canonical post shape shared by every news backend.
//!
//! Backends produce [`RawItem`]s in whatever form they naturally have; the
//! normalizer turns each one into a [`Post`] so classification and
//! aggregation never need to know where an item came from.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Display format for publication times.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Hard cap on normalized text length (chars).
const MAX_TEXT_CHARS: usize = 1500;

/// Sentiment category assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Hype,
    Positive,
    Neutral,
    Negative,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Hype,
        Category::Positive,
        Category::Neutral,
        Category::Negative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hype => "HYPE",
            Category::Positive => "POSITIVE",
            Category::Neutral => "NEUTRAL",
            Category::Negative => "NEGATIVE",
        }
    }
}

/// Item as fetched by a backend, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    /// Machine timestamp as delivered (RFC 3339 or RFC 2822).
    #[serde(default)]
    pub published: Option<String>,
}

impl RawItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, d: impl Into<String>) -> Self {
        self.description = Some(d.into());
        self
    }

    pub fn link(mut self, l: impl Into<String>) -> Self {
        self.link = Some(l.into());
        self
    }

    pub fn published(mut self, p: impl Into<String>) -> Self {
        self.published = Some(p.into());
        self
    }
}

/// Normalized post. `sentiment`/`score` stay `None` until classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Post {
    /// Normalize a backend item.
    ///
    /// `platform` is the provenance label of the backend; `fallback_url` is
    /// used as `source_url` when the item carries no link of its own.
    pub fn from_raw(raw: RawItem, platform: &str, fallback_url: Option<&str>) -> Self {
        let description = raw
            .description
            .as_deref()
            .map(normalize_text)
            .filter(|d| !d.is_empty());
        let source_url = raw
            .link
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .or_else(|| fallback_url.map(str::to_string));

        Self {
            text: normalize_text(&raw.title),
            description,
            platform: platform.to_string(),
            timestamp: raw.published.as_deref().and_then(format_timestamp),
            source_url,
            sentiment: None,
            score: None,
        }
    }

    /// Text fed to the classifier: `text` plus `description` when present.
    pub fn classification_text(&self) -> String {
        match &self.description {
            Some(d) => format!("{} {}", self.text, d),
            None => self.text.clone(),
        }
    }

    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Consume the post and return a classified copy.
    pub fn classified(self, sentiment: Category, score: f64) -> Self {
        Self {
            sentiment: Some(sentiment),
            score: Some(score),
            ..self
        }
    }
}

/// Format a machine timestamp as `YYYY-MM-DD HH:MM` (UTC).
///
/// Unparseable input is returned trimmed as-is; blank input yields `None`.
pub fn format_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = DateTime::parse_from_rfc3339(raw).or_else(|_| DateTime::parse_from_rfc2822(raw));
    match parsed {
        Ok(dt) => Some(dt.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string()),
        Err(e) => {
            tracing::debug!(error = %e, raw, "timestamp not parseable, keeping raw value");
            Some(raw.to_string())
        }
    }
}

/// Clean headline text: decode entities, strip tags, fold quotes and whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > MAX_TEXT_CHARS {
        out = out.chars().take(MAX_TEXT_CHARS).collect();
    }
    out
}
