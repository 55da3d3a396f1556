// tests/classifier_rules.rs
//
// Keyword overrides vs. polarity fallback, via stubbed polarity models.

use std::sync::Arc;

use anyhow::{bail, Result};
use nft_sentiment_analyzer::{Category, Lexicon, LexiconPolarity, PolarityModel, SentimentClassifier};

struct Fixed(f64);

impl PolarityModel for Fixed {
    fn estimate(&self, _text: &str) -> Result<f64> {
        Ok(self.0)
    }
    fn name(&self) -> &'static str {
        "fixed"
    }
}

struct Failing;

impl PolarityModel for Failing {
    fn estimate(&self, _text: &str) -> Result<f64> {
        bail!("model backend unavailable")
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

struct Panicking;

impl PolarityModel for Panicking {
    fn estimate(&self, _text: &str) -> Result<f64> {
        panic!("tokenizer exploded")
    }
    fn name(&self) -> &'static str {
        "panicking"
    }
}

fn classifier(model: impl PolarityModel + 'static) -> SentimentClassifier {
    SentimentClassifier::new(Lexicon::default(), Arc::new(model))
}

#[test]
fn hype_terms_override_any_model_output() {
    for polarity in [-1.0, 0.0, 1.0] {
        let c = classifier(Fixed(polarity));
        for text in [
            "CryptoPunks SURGE after auction",
            "Weekly volume hits an All-Time High",
            "Collectors rally behind the artist",
            "Mint page reports top sales of the month",
            "Prices soaring on secondary markets",
        ] {
            assert_eq!(c.classify(text), (Category::Hype, 1.0), "text: {text}");
        }
    }
}

#[test]
fn negative_terms_apply_when_no_hype_term() {
    let c = classifier(Fixed(0.9));
    for text in [
        "Holders report heavy losses this quarter",
        "Marketplace volume in steady DECLINE",
        "Floor prices fall for a third week",
        "Collection suffers a crash in bids",
    ] {
        assert_eq!(c.classify(text), (Category::Negative, -1.0), "text: {text}");
    }
}

#[test]
fn hype_is_checked_before_negative() {
    let c = classifier(Fixed(0.0));
    assert_eq!(
        c.classify("Brief drop followed by a record rebound"),
        (Category::Hype, 1.0)
    );
}

#[test]
fn model_fallback_uses_deadband() {
    let text = "Artist announces a new collection for the summer";
    assert_eq!(classifier(Fixed(0.11)).classify(text), (Category::Positive, 0.5));
    assert_eq!(classifier(Fixed(-0.11)).classify(text), (Category::Negative, -0.5));
    assert_eq!(classifier(Fixed(0.05)).classify(text), (Category::Neutral, 0.0));
    assert_eq!(classifier(Fixed(-0.05)).classify(text), (Category::Neutral, 0.0));
}

#[test]
fn model_failures_degrade_to_neutral() {
    let text = "Artist announces a new collection for the summer";
    assert_eq!(classifier(Failing).classify(text), (Category::Neutral, 0.0));
    assert_eq!(classifier(Panicking).classify(text), (Category::Neutral, 0.0));
    assert_eq!(classifier(Fixed(f64::NAN)).classify(text), (Category::Neutral, 0.0));
}

#[test]
fn failing_model_is_not_consulted_when_keywords_fire() {
    assert_eq!(
        classifier(Panicking).classify("Secondary sales surge"),
        (Category::Hype, 1.0)
    );
}

#[test]
fn bundled_lexicon_model_drives_fallback() {
    let c = SentimentClassifier::default();
    assert_eq!(
        c.classify("Fans love the amazing new art reveal"),
        (Category::Positive, 0.5)
    );
    assert_eq!(
        c.classify("Marketplace hacked, users fear stolen assets"),
        (Category::Negative, -0.5)
    );
    assert_eq!(
        c.classify("Studio posts an update on the roadmap"),
        (Category::Neutral, 0.0)
    );
}

#[test]
fn custom_lexicon_replaces_defaults() {
    let lex = Lexicon::new(["to the moon"], ["rug pull"]);
    let c = SentimentClassifier::new(lex, Arc::new(Fixed(0.0)));
    assert_eq!(c.classify("Holders say: To The Moon"), (Category::Hype, 1.0));
    assert_eq!(c.classify("Devs vanish in a rug pull"), (Category::Negative, -1.0));
    // default terms no longer fire
    assert_eq!(c.classify("Volume surge today"), (Category::Neutral, 0.0));

    let words = LexiconPolarity::from_json_str(r#"{"wagmi": 3}"#).unwrap();
    let c = SentimentClassifier::new(Lexicon::default(), Arc::new(words));
    assert_eq!(c.classify("Community says wagmi"), (Category::Positive, 0.5));
}
