use chrono::{DateTime, TimeZone, Utc};
use convo_score::conversation::{Message, Sender};
use convo_score::scoring::{AnalysisConfig, AnalysisResult, Analyzer, FixedSentiment, Sentiment};
use proptest::prelude::*;

fn analyzer(compound: f64) -> Analyzer {
    Analyzer::new(AnalysisConfig::default(), Box::new(FixedSentiment(compound)))
        .expect("default config compiles")
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn sender_strategy() -> impl Strategy<Value = Sender> {
    prop_oneof![
        4 => Just(Sender::User),
        4 => Just(Sender::Ai),
        1 => Just(Sender::Other("system".to_string())),
        1 => Just(Sender::Other("User ".to_string())),
    ]
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("I'm sorry, I don't know.".to_string()),
        Just("I understand how frustrating that is.".to_string()),
        Just("This is resolved. Glad I could help!".to_string()),
        Just("Thanks, that solves it.".to_string()),
        Just("Maybe, perhaps it might work.".to_string()),
        Just("It is definitely fixed.".to_string()),
        Just(String::new()),
        Just("?!...".to_string()),
        "[a-zA-Z .,!?']{0,60}",
    ]
}

fn message_strategy() -> impl Strategy<Value = Message> {
    (
        sender_strategy(),
        text_strategy(),
        proptest::option::of(-3_600i64..3_600),
    )
        .prop_map(|(sender, text, offset)| {
            let message = Message::new(sender, text);
            match offset {
                Some(secs) => message.at(base_time() + chrono::Duration::seconds(secs)),
                None => message,
            }
        })
}

fn transcript_strategy() -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(message_strategy(), 0..12)
}

fn assert_unit(name: &str, value: f64) {
    assert!(
        (0.0..=1.0).contains(&value),
        "{} out of range: {}",
        name,
        value
    );
}

fn assert_bounded(result: &AnalysisResult) {
    assert_unit("clarity", result.clarity_score);
    assert_unit("relevance", result.relevance_score);
    assert_unit("accuracy", result.accuracy_score);
    assert_unit("completeness", result.completeness_score);
    assert_unit("empathy", result.empathy_score);
    assert_unit("overall", result.overall_score);
    assert!(result.response_time_avg.is_finite());
    assert!(result.response_time_avg >= 0.0);
}

proptest! {
    #[test]
    fn test_scores_stay_in_unit_interval(
        messages in transcript_strategy(),
        compound in -1.0f64..=1.0,
    ) {
        let result = analyzer(compound).analyze(&messages);
        assert_bounded(&result);
    }

    #[test]
    fn test_completeness_takes_fixed_levels(messages in transcript_strategy()) {
        let result = analyzer(0.0).analyze(&messages);
        let levels = [0.0, 0.3, 0.7, 1.0];
        prop_assert!(
            levels.contains(&result.completeness_score),
            "unexpected completeness {}",
            result.completeness_score
        );
    }

    #[test]
    fn test_analysis_is_idempotent(
        messages in transcript_strategy(),
        compound in -1.0f64..=1.0,
    ) {
        let analyzer = analyzer(compound);
        prop_assert_eq!(analyzer.analyze(&messages), analyzer.analyze(&messages));
    }

    #[test]
    fn test_appending_fallback_never_lowers_count(messages in transcript_strategy()) {
        let analyzer = analyzer(0.0);
        let before = analyzer.analyze(&messages).fallback_count;

        let mut extended = messages.clone();
        extended.push(Message::ai("I don't know"));
        let after = analyzer.analyze(&extended).fallback_count;

        prop_assert_eq!(after, before + 1);
    }

    #[test]
    fn test_escalation_follows_fallbacks_and_sentiment(
        messages in transcript_strategy(),
        compound in -1.0f64..=1.0,
    ) {
        let result = analyzer(compound).analyze(&messages);
        let expected = result.fallback_count >= 2 || result.sentiment == Sentiment::Negative;
        prop_assert_eq!(result.escalation_needed, expected);
    }

    #[test]
    fn test_fallback_count_bounded_by_ai_messages(messages in transcript_strategy()) {
        let result = analyzer(0.0).analyze(&messages);
        let ai_messages = messages.iter().filter(|m| m.sender == Sender::Ai).count() as u32;
        prop_assert!(result.fallback_count <= ai_messages);
    }
}
