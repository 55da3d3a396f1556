// src/sentiment.rs
//! Hybrid sentiment classifier: keyword overrides first, polarity model second.
//!
//! Order of evaluation for a single text:
//! 1) hype lexicon hit (substring, case-insensitive) → `HYPE`, +1
//! 2) negative lexicon hit → `NEGATIVE`, -1
//! 3) polarity model with a ±0.1 deadband → `POSITIVE` +0.5 / `NEGATIVE` -0.5 / `NEUTRAL` 0
//!
//! A model failure (error, panic, or non-finite value) degrades the item to
//! `NEUTRAL`, 0 and never aborts the batch.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use metrics::counter;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::post::Category;

pub const DEFAULT_HYPE_TERMS: &[&str] = &[
    "surge",
    "record",
    "all-time high",
    "rally",
    "spike",
    "soar",
    "increase",
    "growth",
    "top sales",
];

pub const DEFAULT_NEGATIVE_TERMS: &[&str] = &[
    "loss", "downturn", "decline", "drop", "fall", "retreat", "decrease", "crash",
];

/// Polarity values within `(-POLARITY_DEADBAND, POLARITY_DEADBAND)` carry no signal.
pub const POLARITY_DEADBAND: f64 = 0.1;

pub const HYPE_SCORE: f64 = 1.0;
pub const KEYWORD_NEGATIVE_SCORE: f64 = -1.0;
pub const MODEL_POSITIVE_SCORE: f64 = 0.5;
pub const MODEL_NEGATIVE_SCORE: f64 = -0.5;
pub const NEUTRAL_SCORE: f64 = 0.0;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Keyword override lists. Entries are stored trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    hype: Vec<String>,
    negative: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(DEFAULT_HYPE_TERMS.iter(), DEFAULT_NEGATIVE_TERMS.iter())
    }
}

impl Lexicon {
    pub fn new<H, N>(hype: H, negative: N) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            hype: clean_terms(hype),
            negative: clean_terms(negative),
        }
    }

    pub fn hype_terms(&self) -> &[String] {
        &self.hype
    }

    pub fn negative_terms(&self) -> &[String] {
        &self.negative
    }

    /// First hype term found in already lower-cased text.
    fn hype_hit(&self, lower: &str) -> Option<&str> {
        self.hype
            .iter()
            .find(|t| lower.contains(t.as_str()))
            .map(String::as_str)
    }

    fn negative_hit(&self, lower: &str) -> Option<&str> {
        self.negative
            .iter()
            .find(|t| lower.contains(t.as_str()))
            .map(String::as_str)
    }
}

fn clean_terms<I>(terms: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    terms
        .into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// General-purpose polarity estimator, consulted only when no keyword fires.
///
/// Implementations must be safe to share across concurrent requests.
pub trait PolarityModel: Send + Sync {
    /// Continuous polarity in `[-1, 1]`.
    fn estimate(&self, text: &str) -> Result<f64>;
    fn name(&self) -> &'static str;
}

/// Word-list polarity model with short-range negation handling.
#[derive(Debug, Clone)]
pub struct LexiconPolarity {
    words: Option<HashMap<String, i32>>,
}

impl Default for LexiconPolarity {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconPolarity {
    /// Model backed by the bundled word list.
    pub fn new() -> Self {
        Self { words: None }
    }

    /// Model backed by a custom JSON word list (`{"word": score, ...}`).
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let words: HashMap<String, i32> = serde_json::from_str(raw)?;
        let words = words
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        Ok(Self { words: Some(words) })
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        let words = self.words.as_ref().unwrap_or_else(|| &*LEXICON);
        *words.get(w).unwrap_or(&0)
    }

    /// Returns (raw summed score, token count).
    /// A negator in the previous 1..=3 tokens flips the sign of a word's score.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for (i, w) in tokens.iter().enumerate() {
            let base = self.word_score(w);
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
        }

        (score, tokens.len())
    }
}

/// Squash constant for mapping summed word scores into (-1, 1).
const NORMALIZE_ALPHA: f64 = 15.0;

impl PolarityModel for LexiconPolarity {
    fn estimate(&self, text: &str) -> Result<f64> {
        let (score, _) = self.score_text(text);
        let s = f64::from(score);
        Ok(s / (s * s + NORMALIZE_ALPHA).sqrt())
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// Alphanumeric tokens (apostrophes kept), lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
            | "don't"
            | "doesn't"
    )
}

/// Keyword-override classifier with a polarity-model fallback.
#[derive(Clone)]
pub struct SentimentClassifier {
    lexicon: Lexicon,
    model: Arc<dyn PolarityModel>,
}

impl std::fmt::Debug for SentimentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentClassifier")
            .field("lexicon", &self.lexicon)
            .field("model", &self.model.name())
            .finish()
    }
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new(Lexicon::default(), Arc::new(LexiconPolarity::new()))
    }
}

impl SentimentClassifier {
    pub fn new(lexicon: Lexicon, model: Arc<dyn PolarityModel>) -> Self {
        Self { lexicon, model }
    }

    /// Classify one text into a category and its score.
    pub fn classify(&self, text: &str) -> (Category, f64) {
        let lower = text.to_lowercase();

        if let Some(term) = self.lexicon.hype_hit(&lower) {
            tracing::trace!(term, "hype keyword hit");
            return (Category::Hype, HYPE_SCORE);
        }
        if let Some(term) = self.lexicon.negative_hit(&lower) {
            tracing::trace!(term, "negative keyword hit");
            return (Category::Negative, KEYWORD_NEGATIVE_SCORE);
        }

        match self.estimate_guarded(text) {
            Ok(polarity) => bucket(polarity),
            Err(e) => {
                tracing::warn!(error = %e, model = self.model.name(), "polarity model failed; item degraded to NEUTRAL");
                counter!("classifier_model_failures_total").increment(1);
                (Category::Neutral, NEUTRAL_SCORE)
            }
        }
    }

    fn estimate_guarded(&self, text: &str) -> Result<f64> {
        let out = panic::catch_unwind(AssertUnwindSafe(|| self.model.estimate(text)))
            .map_err(|_| anyhow!("polarity model panicked"))??;
        if !out.is_finite() {
            return Err(anyhow!("polarity model returned non-finite value {out}"));
        }
        Ok(out.clamp(-1.0, 1.0))
    }
}

/// Map a model polarity into a category with the ±0.1 deadband.
pub fn bucket(polarity: f64) -> (Category, f64) {
    if polarity > POLARITY_DEADBAND {
        (Category::Positive, MODEL_POSITIVE_SCORE)
    } else if polarity < -POLARITY_DEADBAND {
        (Category::Negative, MODEL_NEGATIVE_SCORE)
    } else {
        (Category::Neutral, NEUTRAL_SCORE)
    }
}
