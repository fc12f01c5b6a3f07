use anyhow::Result;
use regex::RegexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::{AnalysisConfig, KeywordTables};
use super::factors;
use super::latency::average_response_time;
use super::sentiment::{score_sentiment, Sentiment, SentimentAnalyzer, VaderSentiment};
use super::signals::{
    compile_fallback_patterns, count_fallbacks, detect_resolution, fallback_penalty,
    needs_escalation,
};
use super::text::{join_text, partition, round_to};
use crate::conversation::Message;

/// Quality assessment of one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub clarity_score: f64,
    pub relevance_score: f64,
    pub accuracy_score: f64,
    pub completeness_score: f64,
    pub sentiment: Sentiment,
    pub empathy_score: f64,
    /// Seconds
    pub response_time_avg: f64,
    pub fallback_count: u32,
    pub escalation_needed: bool,
    pub resolution: bool,
    pub overall_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactorContribution {
    /// Factor name, e.g. "clarity" or "fallback"
    pub label: &'static str,
    /// Factor value in [0, 1]
    pub value: f64,
    pub weight: f64,
    /// `value * weight`
    pub contribution: f64,
}

/// How the overall score was assembled
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub factors: Vec<FactorContribution>,
    pub compound: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailedAnalysis {
    pub result: AnalysisResult,
    pub breakdown: ScoreBreakdown,
}

/// Conversation scorer. Immutable once built, so one instance can score many
/// conversations, including from several threads.
pub struct Analyzer {
    config: AnalysisConfig,
    keywords: KeywordTables,
    fallback_patterns: RegexSet,
    sentiment: Box<dyn SentimentAnalyzer>,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig, sentiment: Box<dyn SentimentAnalyzer>) -> Result<Self> {
        let fallback_patterns = compile_fallback_patterns(&config.keywords.fallback_patterns)?;
        let keywords = config.keywords.normalized();
        Ok(Self {
            config,
            keywords,
            fallback_patterns,
            sentiment,
        })
    }

    /// Analyzer using the VADER lexicon for sentiment
    pub fn with_vader(config: AnalysisConfig) -> Result<Self> {
        Self::new(config, Box::new(VaderSentiment::new()))
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Score a transcript. `messages` must be in conversation order.
    pub fn analyze(&self, messages: &[Message]) -> AnalysisResult {
        self.analyze_detailed(messages).result
    }

    pub fn analyze_detailed(&self, messages: &[Message]) -> DetailedAnalysis {
        let config = &self.config;
        let kw = &self.keywords;
        let parts = partition(messages);

        let sentiment = score_sentiment(
            &join_text(&parts.user),
            self.sentiment.as_ref(),
            &config.sentiment_thresholds,
        );
        let clarity = factors::clarity(&parts.ai, config.clarity_midpoint);
        let relevance = factors::relevance(&parts.user, &parts.ai);
        let accuracy = factors::accuracy(&parts.ai, &kw.uncertain, &kw.confident);
        let completeness =
            factors::completeness(&parts.user, &parts.ai, &kw.user_closure, &kw.ai_closure);
        let empathy = factors::empathy(&parts.ai, &kw.empathy);

        let fallback_count = count_fallbacks(&parts.ai, &self.fallback_patterns);
        let resolution = detect_resolution(&parts.ai, &kw.resolution);
        let escalation_needed = needs_escalation(
            fallback_count,
            sentiment.label,
            config.escalation_fallback_threshold,
        );
        let response_time_avg =
            average_response_time(messages).unwrap_or(config.default_response_time);

        let w = &config.weights;
        let factors = vec![
            contribution("clarity", clarity, w.clarity),
            contribution("relevance", relevance, w.relevance),
            contribution("empathy", empathy, w.empathy),
            contribution("sentiment", sentiment.factor(), w.sentiment),
            contribution(
                "fallback",
                fallback_penalty(fallback_count, config.fallback_penalty_step),
                w.fallback,
            ),
            contribution("resolution", if resolution { 1.0 } else { 0.0 }, w.resolution),
        ];
        let total: f64 = factors.iter().map(|f| f.contribution).sum();
        let overall_score = round_to(total.clamp(0.0, 1.0), 3);

        debug!(
            messages = messages.len(),
            user = parts.user.len(),
            ai = parts.ai.len(),
            compound = sentiment.compound,
            fallback_count,
            overall_score,
            "analyzed transcript"
        );

        let result = AnalysisResult {
            clarity_score: unit_score(clarity),
            relevance_score: unit_score(relevance),
            accuracy_score: unit_score(accuracy),
            completeness_score: unit_score(completeness),
            sentiment: sentiment.label,
            empathy_score: unit_score(empathy),
            response_time_avg: round_to(response_time_avg.max(0.0), 2),
            fallback_count,
            escalation_needed,
            resolution,
            overall_score,
        };

        DetailedAnalysis {
            result,
            breakdown: ScoreBreakdown {
                factors,
                compound: sentiment.compound,
            },
        }
    }
}

fn contribution(label: &'static str, value: f64, weight: f64) -> FactorContribution {
    FactorContribution {
        label,
        value,
        weight,
        contribution: value * weight,
    }
}

fn unit_score(value: f64) -> f64 {
    round_to(value.clamp(0.0, 1.0), 3)
}
