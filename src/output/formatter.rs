use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;
use terminal_size::{terminal_size, Width};

use crate::conversation::Conversation;
use crate::scoring::{Sentiment, ScoreBreakdown};
use crate::store::StoredAnalysis;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a [0, 1] score with three decimals
pub fn format_score(score: f64) -> String {
    format!("{:.3}", score)
}

/// Format seconds as a human-readable duration ("5s", "1m 30s", "1s 230ms")
pub fn format_response_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "n/a".to_string();
    }
    let millis = (seconds * 1000.0).round() as u64;
    humantime::format_duration(Duration::from_millis(millis)).to_string()
}

/// An analysis with its conversation title for display
pub struct ReportRow<'a> {
    pub analysis: &'a StoredAnalysis,
    pub title: &'a str,
}

fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate title to fit available width, accounting for Unicode
fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn flags(analysis: &StoredAnalysis) -> String {
    let mut parts = Vec::new();
    if analysis.result.escalation_needed {
        parts.push("ESC");
    }
    if analysis.result.resolution {
        parts.push("RES");
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(",")
    }
}

fn paint_sentiment(sentiment: Sentiment, padded: &str) -> String {
    match sentiment {
        Sentiment::Positive => padded.green().to_string(),
        Sentiment::Negative => padded.red().to_string(),
        Sentiment::Neutral => padded.dimmed().to_string(),
    }
}

/// Format analyses as a table with columns: Index, Overall, Sentiment,
/// Flags, Title, Conversation id. No headers.
pub fn format_report_table(rows: &[ReportRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No analyses found.".to_string();
    }

    let term_width = get_terminal_width();

    // " 1." + space, "0.000" + 2, "negative" + 2, "ESC,RES" + 2
    let index_width = 3;
    let score_width = 5;
    let sentiment_width = 8;
    let flags_width = 7;
    let separator = "  ";

    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let result = &row.analysis.result;
            let index_str = format!("{:>2}.", idx + 1);
            let score_str = format_score(result.overall_score);
            let sentiment_str = format!(
                "{:<width$}",
                result.sentiment.as_str(),
                width = sentiment_width
            );
            let flags_str = format!("{:<width$}", flags(row.analysis), width = flags_width);
            let id_str = format!("#{}", row.analysis.conversation_id);

            let fixed_width = index_width
                + 1
                + score_width
                + sentiment_width
                + flags_width
                + separator.len() * 4
                + id_str.len();

            let title = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_title(row.title, width - fixed_width)
                }
                Some(_) => truncate_title(row.title, 20),
                None => row.title.to_string(),
            };

            if use_colors {
                let score_painted = if result.escalation_needed {
                    score_str.red().bold().to_string()
                } else {
                    score_str.bold().to_string()
                };
                format!(
                    "{} {}{}{}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    score_painted,
                    separator,
                    paint_sentiment(result.sentiment, &sentiment_str),
                    separator,
                    flags_str.yellow(),
                    separator,
                    title,
                    separator,
                    id_str.underline()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}",
                    index_str,
                    score_str,
                    separator,
                    sentiment_str,
                    separator,
                    flags_str,
                    separator,
                    title,
                    separator,
                    id_str
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format analyses as tab-separated values for scripting
/// Columns: conversation id, overall, sentiment, escalation, resolution, title
pub fn format_tsv(rows: &[ReportRow]) -> String {
    rows.iter()
        .map(|row| {
            let result = &row.analysis.result;
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                row.analysis.conversation_id,
                format_score(result.overall_score),
                result.sentiment,
                result.escalation_needed,
                result.resolution,
                row.title
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one analysis with every dimension (for the analyze command)
pub fn format_analysis_detail(title: &str, analysis: &StoredAnalysis, use_colors: bool) -> String {
    let r = &analysis.result;
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };

    let heading = format!("#{} {}", analysis.conversation_id, title);
    let overall = format_score(r.overall_score);
    let (heading, overall, sentiment) = if use_colors {
        (
            heading.bold().to_string(),
            overall.bold().to_string(),
            paint_sentiment(r.sentiment, r.sentiment.as_str()),
        )
    } else {
        (heading, overall, r.sentiment.to_string())
    };

    format!(
        "{}\n  Overall: {}\n  Clarity: {}\n  Relevance: {}\n  Accuracy: {}\n  Completeness: {}\n  Empathy: {}\n  Sentiment: {}\n  Avg response time: {}\n  Fallbacks: {}\n  Escalation needed: {}\n  Resolved: {}",
        heading,
        overall,
        format_score(r.clarity_score),
        format_score(r.relevance_score),
        format_score(r.accuracy_score),
        format_score(r.completeness_score),
        format_score(r.empathy_score),
        sentiment,
        format_response_time(r.response_time_avg),
        r.fallback_count,
        yes_no(r.escalation_needed),
        yes_no(r.resolution),
    )
}

/// Format the weighted factors behind an overall score (verbose mode)
pub fn format_breakdown(breakdown: &ScoreBreakdown) -> String {
    let mut lines = vec![format!("  Sentiment compound: {:+.3}", breakdown.compound)];
    for factor in &breakdown.factors {
        lines.push(format!(
            "  {:<11} {:.3} x {:.2} = {:.3}",
            factor.label, factor.value, factor.weight, factor.contribution
        ));
    }
    lines.join("\n")
}

/// Format a stored transcript, one line per message. Timed messages show
/// their offset from the first timestamped message.
pub fn format_transcript(conversation: &Conversation, use_colors: bool) -> String {
    if conversation.messages.is_empty() {
        return "No messages.".to_string();
    }

    let start = conversation.messages.iter().find_map(|m| m.timestamp);

    conversation
        .messages
        .iter()
        .map(|m| {
            let offset = match (start, m.timestamp) {
                (Some(start), Some(ts)) => {
                    let secs = (ts - start).num_milliseconds() as f64 / 1000.0;
                    if secs >= 0.0 {
                        format!("+{}", format_response_time(secs))
                    } else {
                        format!("-{}", format_response_time(-secs))
                    }
                }
                _ => "-".to_string(),
            };
            let offset = format!("{:>8}", offset);
            let sender = format!("{:>5}", m.sender.as_str());
            if use_colors {
                format!("{} {}: {}", offset.dimmed(), sender.cyan(), m.text)
            } else {
                format!("{} {}: {}", offset, sender, m.text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
