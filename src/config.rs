// src/config.rs
//! Analyzer configuration loaded from TOML (`config/analyzer.toml`).
//!
//! Resolution:
//! 1) `$ANALYZER_CONFIG_PATH` (must exist if set)
//! 2) `config/analyzer.toml`
//! 3) built-in defaults
//!
//! `$TREND_PROFILE` overrides the file's `[trend]` section with a named profile.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::aggregate::TrendProfile;
use crate::sentiment::{Lexicon, DEFAULT_HYPE_TERMS, DEFAULT_NEGATIVE_TERMS};

pub const DEFAULT_CONFIG_PATH: &str = "config/analyzer.toml";
pub const ENV_CONFIG_PATH: &str = "ANALYZER_CONFIG_PATH";
pub const ENV_TREND_PROFILE: &str = "TREND_PROFILE";
pub const ENV_NEWSAPI_KEY: &str = "NEWSAPI_KEY";

/// Posts whose text is this many chars or fewer are dropped before classification.
pub const DEFAULT_MIN_TEXT_LEN: usize = 20;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub trend: TrendSection,
    pub filter: FilterSection,
    pub lexicon: LexiconSection,
    pub source: SourceSection,
    pub server: ServerSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrendSection {
    /// "broad" (±5) | "narrow" (±2)
    pub profile: String,
    /// Explicit thresholds; override the named profile when both are set.
    pub positive: Option<f64>,
    pub negative: Option<f64>,
}

impl Default for TrendSection {
    fn default() -> Self {
        Self {
            profile: "broad".to_string(),
            positive: None,
            negative: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterSection {
    pub min_text_len: usize,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            min_text_len: DEFAULT_MIN_TEXT_LEN,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LexiconSection {
    pub hype: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for LexiconSection {
    fn default() -> Self {
        Self {
            hype: DEFAULT_HYPE_TERMS.iter().map(|s| s.to_string()).collect(),
            negative: DEFAULT_NEGATIVE_TERMS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    GoogleNews,
    Newsapi,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    pub backend: Backend,
    /// Upper bound on items taken from one fetch.
    pub max_items: usize,
    /// Appended to the entity name when searching.
    pub query_suffix: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            backend: Backend::GoogleNews,
            max_items: 30,
            query_suffix: "NFT news".to_string(),
            language: "en".to_string(),
            timeout_secs: 10,
        }
    }
}

impl SourceSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn query_for(&self, entity: &str) -> String {
        let suffix = self.query_suffix.trim();
        if suffix.is_empty() {
            entity.trim().to_string()
        } else {
            format!("{} {}", entity.trim(), suffix)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "https://www.blocnexus.site".to_string(),
            ],
        }
    }
}

impl AnalyzerConfig {
    /// Load using env var + fallbacks (see module docs).
    pub fn load() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
            }
            Self::load_from(&pb)?
        } else {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                Self::load_from(default)?
            } else {
                Self::default()
            }
        };

        if let Ok(name) = std::env::var(ENV_TREND_PROFILE) {
            if !name.trim().is_empty() {
                cfg.trend = TrendSection {
                    profile: name,
                    positive: None,
                    negative: None,
                };
            }
        }

        // Fail fast on an unusable trend section.
        cfg.trend_profile()?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading analyzer config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing analyzer config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AnalyzerConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    /// Resolve the trend thresholds; explicit values win over the named profile.
    pub fn trend_profile(&self) -> Result<TrendProfile> {
        match (self.trend.positive, self.trend.negative) {
            (Some(p), Some(n)) => {
                if !p.is_finite() || !n.is_finite() {
                    bail!("trend thresholds must be finite");
                }
                Ok(TrendProfile::new(p, n))
            }
            (None, None) => TrendProfile::named(&self.trend.profile)
                .ok_or_else(|| anyhow!("unknown trend profile `{}`", self.trend.profile)),
            _ => bail!("trend.positive and trend.negative must be set together"),
        }
    }

    pub fn lexicon(&self) -> Lexicon {
        Lexicon::new(&self.lexicon.hype, &self.lexicon.negative)
    }

    pub fn newsapi_key() -> Option<String> {
        std::env::var(ENV_NEWSAPI_KEY)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}
