use anyhow::{Context, Result};
use regex::{RegexSet, RegexSetBuilder};

use super::sentiment::Sentiment;
use super::text::contains_any;
use crate::conversation::Message;

/// Compile fallback patterns into a case-insensitive set.
pub fn compile_fallback_patterns(patterns: &[String]) -> Result<RegexSet> {
    RegexSetBuilder::new(patterns)
        .case_insensitive(true)
        .build()
        .context("Failed to compile fallback patterns")
}

/// Number of AI messages matching at least one fallback pattern
pub fn count_fallbacks(ai: &[&Message], patterns: &RegexSet) -> u32 {
    ai.iter().filter(|m| patterns.is_match(&m.text)).count() as u32
}

/// Whether the final AI message announces a resolution
pub fn detect_resolution(ai: &[&Message], keywords: &[String]) -> bool {
    ai.last().is_some_and(|m| contains_any(&m.text, keywords))
}

pub fn needs_escalation(fallback_count: u32, sentiment: Sentiment, threshold: u32) -> bool {
    fallback_count >= threshold || sentiment == Sentiment::Negative
}

/// Multiplier for the fallback weight slot. Each fallback costs `step`,
/// floored at zero.
pub fn fallback_penalty(fallback_count: u32, step: f64) -> f64 {
    (1.0 - fallback_count as f64 * step).clamp(0.0, 1.0)
}
