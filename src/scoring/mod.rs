pub mod config;
pub mod engine;
pub mod factors;
pub mod latency;
pub mod sentiment;
pub mod signals;
pub mod text;
pub mod validation;

pub use config::*;
pub use engine::{AnalysisResult, Analyzer, DetailedAnalysis, FactorContribution, ScoreBreakdown};
pub use sentiment::{FixedSentiment, Sentiment, SentimentAnalyzer, VaderSentiment};
pub use validation::validate_analysis;
