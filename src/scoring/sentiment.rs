use serde::{Deserialize, Serialize};
use std::fmt;
use vader_sentiment::SentimentIntensityAnalyzer;

use super::config::SentimentThresholds;

/// Capability that scores free text with a compound polarity in [-1, 1].
pub trait SentimentAnalyzer: Send + Sync {
    fn compound(&self, text: &str) -> f64;
}

/// Lexicon and rule based analyzer (VADER).
pub struct VaderSentiment {
    inner: SentimentIntensityAnalyzer<'static>,
}

impl VaderSentiment {
    pub fn new() -> Self {
        Self {
            inner: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderSentiment {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnalyzer for VaderSentiment {
    fn compound(&self, text: &str) -> f64 {
        let scores = self.inner.polarity_scores(text);
        scores.get("compound").copied().unwrap_or(0.0)
    }
}

/// Returns the same compound score for every input.
#[derive(Debug, Clone, Copy)]
pub struct FixedSentiment(pub f64);

impl SentimentAnalyzer for FixedSentiment {
    fn compound(&self, _text: &str) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn classify(compound: f64, thresholds: &SentimentThresholds) -> Self {
        if compound >= thresholds.positive {
            Sentiment::Positive
        } else if compound <= thresholds.negative {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentScore {
    pub compound: f64,
    pub label: Sentiment,
}

impl SentimentScore {
    pub const NEUTRAL: SentimentScore = SentimentScore {
        compound: 0.0,
        label: Sentiment::Neutral,
    };

    /// Compound mapped from [-1, 1] to [0, 1]
    pub fn factor(&self) -> f64 {
        (self.compound + 1.0) / 2.0
    }
}

/// Score the concatenated user text. Blank text is neutral without
/// consulting the analyzer. Whatever the analyzer returns is clamped to
/// [-1, 1]; a non-finite compound counts as 0.0.
pub fn score_sentiment(
    user_text: &str,
    analyzer: &dyn SentimentAnalyzer,
    thresholds: &SentimentThresholds,
) -> SentimentScore {
    if user_text.trim().is_empty() {
        return SentimentScore::NEUTRAL;
    }
    let raw = analyzer.compound(user_text);
    let compound = if raw.is_finite() {
        raw.clamp(-1.0, 1.0)
    } else {
        0.0
    };
    SentimentScore {
        compound,
        label: Sentiment::classify(compound, thresholds),
    }
}
