use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::conversation::{Message, Sender};

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence pattern is valid"));
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// User and AI messages of a transcript, each in transcript order.
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub user: Vec<&'a Message>,
    pub ai: Vec<&'a Message>,
}

/// Split a transcript by sender. Messages from any other sender are dropped.
pub fn partition(messages: &[Message]) -> Partition<'_> {
    let mut parts = Partition::default();
    for message in messages {
        match message.sender {
            Sender::User => parts.user.push(message),
            Sender::Ai => parts.ai.push(message),
            Sender::Other(_) => {}
        }
    }
    parts
}

/// Texts joined by single spaces
pub fn join_text(messages: &[&Message]) -> String {
    messages
        .iter()
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Word counts of each non-blank sentence fragment.
pub fn sentence_lengths(text: &str) -> Vec<usize> {
    SENTENCE_END
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.split_whitespace().count())
        .collect()
}

/// Set of lowercase word tokens
pub fn tokenize(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Whether `text` contains any of the (lowercase) keywords, ignoring case.
pub fn contains_any(text: &str, keywords: &[String]) -> bool {
    let lowered = text.to_lowercase();
    keywords.iter().any(|k| lowered.contains(k.as_str()))
}

/// Number of messages containing at least one keyword
pub fn count_matching(messages: &[&Message], keywords: &[String]) -> usize {
    messages
        .iter()
        .filter(|m| contains_any(&m.text, keywords))
        .count()
}

/// Round to `decimals` places, sending exact ties to the even digit.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
