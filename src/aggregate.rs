// src/aggregate.rs
//! Batch aggregation: classify every post, tally categories, sum scores and
//! derive the overall trend label from a configurable threshold profile.
//!
//! Pure with respect to its inputs; no I/O.

use serde::{Deserialize, Serialize, Serializer};

use crate::debug::dev_log_classification;
use crate::post::{Category, Post};
use crate::sentiment::SentimentClassifier;

/// Trend label for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    HypePositive,
    Neutral,
    Negative,
    /// Empty batch; not a result of threshold comparison.
    NoData,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::HypePositive => "Hype/Positive 🚀",
            Trend::Neutral => "Neutral 😐",
            Trend::Negative => "Negative ⚠️",
            Trend::NoData => "No data 😐",
        }
    }
}

impl Serialize for Trend {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Pair of trend thresholds applied to the summed batch score.
///
/// Comparison is strict: a sum equal to a threshold is `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendProfile {
    pub positive: f64,
    pub negative: f64,
}

impl TrendProfile {
    /// Wide band, suited to multi-page fetches.
    pub const BROAD: TrendProfile = TrendProfile {
        positive: 5.0,
        negative: -5.0,
    };
    /// Tight band, suited to small result sets.
    pub const NARROW: TrendProfile = TrendProfile {
        positive: 2.0,
        negative: -2.0,
    };

    /// Build a profile; swaps the pair if given in the wrong order.
    pub fn new(positive: f64, negative: f64) -> Self {
        if positive < negative {
            Self {
                positive: negative,
                negative: positive,
            }
        } else {
            Self { positive, negative }
        }
    }

    /// Look up a named profile (`broad` | `narrow`, case-insensitive).
    pub fn named(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "broad" => Some(Self::BROAD),
            "narrow" => Some(Self::NARROW),
            _ => None,
        }
    }

    pub fn trend_for(&self, overall_score: f64) -> Trend {
        if overall_score > self.positive {
            Trend::HypePositive
        } else if overall_score < self.negative {
            Trend::Negative
        } else {
            Trend::Neutral
        }
    }
}

impl Default for TrendProfile {
    fn default() -> Self {
        Self::BROAD
    }
}

/// Percentage of posts per category. Every key is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    #[serde(rename = "POSITIVE")]
    pub positive: f64,
    #[serde(rename = "NEGATIVE")]
    pub negative: f64,
    #[serde(rename = "NEUTRAL")]
    pub neutral: f64,
    #[serde(rename = "HYPE")]
    pub hype: f64,
}

impl Breakdown {
    pub fn get(&self, c: Category) -> f64 {
        match c {
            Category::Positive => self.positive,
            Category::Negative => self.negative,
            Category::Neutral => self.neutral,
            Category::Hype => self.hype,
        }
    }

    fn slot(&mut self, c: Category) -> &mut f64 {
        match c {
            Category::Positive => &mut self.positive,
            Category::Negative => &mut self.negative,
            Category::Neutral => &mut self.neutral,
            Category::Hype => &mut self.hype,
        }
    }

    /// Each share is rounded to one decimal independently; the sum may drift
    /// slightly from 100.0.
    fn from_counts(counts: &CategoryCounts) -> Self {
        let mut out = Self::default();
        let total = counts.total();
        if total == 0 {
            return out;
        }
        for c in Category::ALL {
            *out.slot(c) = round1(100.0 * counts.get(c) as f64 / total as f64);
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub hype: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl CategoryCounts {
    pub fn get(&self, c: Category) -> usize {
        match c {
            Category::Hype => self.hype,
            Category::Positive => self.positive,
            Category::Neutral => self.neutral,
            Category::Negative => self.negative,
        }
    }

    fn bump(&mut self, c: Category) {
        match c {
            Category::Hype => self.hype += 1,
            Category::Positive => self.positive += 1,
            Category::Neutral => self.neutral += 1,
            Category::Negative => self.negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.hype + self.positive + self.neutral + self.negative
    }
}

/// Outcome of one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    /// Classified posts, same order as the input.
    pub posts: Vec<Post>,
    pub counts: CategoryCounts,
    pub breakdown: Breakdown,
    pub overall_score: f64,
    pub trend: Trend,
}

/// Classify and summarize a batch of posts.
pub fn aggregate(
    posts: Vec<Post>,
    classifier: &SentimentClassifier,
    profile: &TrendProfile,
) -> AggregateResult {
    if posts.is_empty() {
        return AggregateResult {
            posts: Vec::new(),
            counts: CategoryCounts::default(),
            breakdown: Breakdown::default(),
            overall_score: 0.0,
            trend: Trend::NoData,
        };
    }

    let mut counts = CategoryCounts::default();
    let mut overall_score = 0.0;
    let classified: Vec<Post> = posts
        .into_iter()
        .map(|post| {
            let text = post.classification_text();
            let (category, score) = classifier.classify(&text);
            dev_log_classification(&text, category, score);
            counts.bump(category);
            overall_score += score;
            post.classified(category, score)
        })
        .collect();

    AggregateResult {
        breakdown: Breakdown::from_counts(&counts),
        trend: profile.trend_for(overall_score),
        posts: classified,
        counts,
        overall_score,
    }
}

/// One decimal, ties to even on the exact binary value.
fn round1(x: f64) -> f64 {
    format!("{x:.1}").parse().unwrap_or(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_threshold_comparison() {
        let p = TrendProfile::NARROW;
        assert_eq!(p.trend_for(2.0), Trend::Neutral);
        assert_eq!(p.trend_for(2.5), Trend::HypePositive);
        assert_eq!(p.trend_for(-2.0), Trend::Neutral);
        assert_eq!(p.trend_for(-2.5), Trend::Negative);
    }

    #[test]
    fn profile_order_is_repaired() {
        let p = TrendProfile::new(-3.0, 3.0);
        assert_eq!(p.positive, 3.0);
        assert_eq!(p.negative, -3.0);
        assert_eq!(TrendProfile::named(" Narrow "), Some(TrendProfile::NARROW));
        assert_eq!(TrendProfile::named("medium"), None);
    }

    #[test]
    fn thirds_round_independently() {
        let counts = CategoryCounts {
            hype: 1,
            positive: 1,
            neutral: 1,
            negative: 0,
        };
        let b = Breakdown::from_counts(&counts);
        assert_eq!(b.hype, 33.3);
        assert_eq!(b.positive, 33.3);
        assert_eq!(b.neutral, 33.3);
        assert_eq!(b.negative, 0.0);
    }

    #[test]
    fn sixteenths_round_half_to_even() {
        let counts = CategoryCounts {
            hype: 1,
            positive: 5,
            neutral: 10,
            negative: 0,
        };
        let b = Breakdown::from_counts(&counts);
        assert_eq!(b.hype, 6.2);
        assert_eq!(b.positive, 31.2);
        assert_eq!(b.neutral, 62.5);
        assert_eq!(round1(100.0 * 15.0 / 16.0), 93.8);
        assert_eq!(round1(100.0 * 1.0 / 80.0), 1.2);
    }

    #[test]
    fn trend_serializes_as_label() {
        let v = serde_json::to_value(Trend::NoData).unwrap();
        assert_eq!(v, serde_json::json!("No data 😐"));
    }
}
