use crate::conversation::Message;

/// Mean gap in seconds between adjacent timestamped messages.
///
/// Walks the raw transcript (all senders). A pair is skipped when either
/// side lacks a timestamp, when the gap is negative, or when it does not fit
/// in microseconds. Returns `None` if no pair qualifies.
pub fn average_response_time(messages: &[Message]) -> Option<f64> {
    let diffs: Vec<f64> = messages
        .windows(2)
        .filter_map(|pair| {
            let (earlier, later) = (pair[0].timestamp?, pair[1].timestamp?);
            let micros = (later - earlier).num_microseconds()?;
            (micros >= 0).then(|| micros as f64 / 1_000_000.0)
        })
        .collect();

    if diffs.is_empty() {
        None
    } else {
        Some(diffs.iter().sum::<f64>() / diffs.len() as f64)
    }
}
