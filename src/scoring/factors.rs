//! Heuristic quality factors. Each takes the partitioned transcript and
//! returns a score in [0, 1].

use super::text::{contains_any, count_matching, join_text, sentence_lengths, tokenize};
use crate::conversation::Message;
use std::collections::HashSet;

/// Score used when a factor has nothing to measure
pub const NEUTRAL_SCORE: f64 = 0.5;

const RELEVANCE_EPSILON: f64 = 1e-6;

/// Shorter AI sentences read as clearer. Average sentence length of
/// `midpoint` words or more scores zero.
pub fn clarity(ai: &[&Message], midpoint: f64) -> f64 {
    let lengths = sentence_lengths(&join_text(ai));
    if lengths.is_empty() {
        return NEUTRAL_SCORE;
    }
    let avg_len = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
    ((midpoint - avg_len) / midpoint).clamp(0.0, 1.0)
}

/// Share of the user's vocabulary echoed back by the AI.
pub fn relevance(user: &[&Message], ai: &[&Message]) -> f64 {
    let user_tokens: HashSet<String> = user.iter().flat_map(|m| tokenize(&m.text)).collect();
    if user_tokens.is_empty() {
        return NEUTRAL_SCORE;
    }
    let ai_tokens: HashSet<String> = ai.iter().flat_map(|m| tokenize(&m.text)).collect();
    let overlap = user_tokens.intersection(&ai_tokens).count() as f64;
    (overlap / (user_tokens.len() as f64 + RELEVANCE_EPSILON)).min(1.0)
}

/// Confident vs. hedging AI messages, Laplace smoothed.
pub fn accuracy(ai: &[&Message], uncertain: &[String], confident: &[String]) -> f64 {
    if ai.is_empty() {
        return NEUTRAL_SCORE;
    }
    let uncertain_hits = count_matching(ai, uncertain) as f64;
    let confident_hits = count_matching(ai, confident) as f64;
    ((confident_hits + 1.0) / (uncertain_hits + 2.0)).clamp(0.0, 1.0)
}

/// Closure signals in the final user and AI messages.
///
/// 1.0 when both sides signal closure, 0.7 for one side, 0.3 for neither,
/// and 0.0 when either side never spoke.
pub fn completeness(
    user: &[&Message],
    ai: &[&Message],
    user_closure: &[String],
    ai_closure: &[String],
) -> f64 {
    let (Some(last_user), Some(last_ai)) = (user.last(), ai.last()) else {
        return 0.0;
    };
    let user_closed = contains_any(&last_user.text, user_closure);
    let ai_closed = contains_any(&last_ai.text, ai_closure);
    match (user_closed, ai_closed) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.7,
        (false, false) => 0.3,
    }
}

/// Fraction of AI messages using an empathy phrase
pub fn empathy(ai: &[&Message], phrases: &[String]) -> f64 {
    if ai.is_empty() {
        return 0.0;
    }
    count_matching(ai, phrases) as f64 / ai.len() as f64
}
