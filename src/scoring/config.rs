use serde::{Deserialize, Serialize};

/// Tunable parameters of the conversation analyzer.
///
/// Every field has a default, so a config file only needs the parts it
/// overrides.
///
/// Example YAML:
/// ```yaml
/// analysis:
///   weights:
///     clarity: 0.3
///     relevance: 0.2
///   keywords:
///     empathy: ["sorry", "apologize", "my bad"]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Weights of the overall score. Must sum to 1.0.
    pub weights: Weights,

    /// Average AI sentence length (in words) at which clarity drops to zero
    pub clarity_midpoint: f64,

    /// Seconds reported when no timestamp pair is usable
    pub default_response_time: f64,

    /// Each fallback costs this fraction of the fallback weight slot
    pub fallback_penalty_step: f64,

    /// Fallback count at which escalation is requested regardless of sentiment
    pub escalation_fallback_threshold: u32,

    pub sentiment_thresholds: SentimentThresholds,

    pub keywords: KeywordTables,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            clarity_midpoint: 15.0,
            default_response_time: 5.0,
            fallback_penalty_step: 0.2,
            escalation_fallback_threshold: 2,
            sentiment_thresholds: SentimentThresholds::default(),
            keywords: KeywordTables::default(),
        }
    }
}

/// Weights of the overall score. Accuracy and completeness are reported but
/// carry no weight.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Weights {
    pub clarity: f64,
    pub relevance: f64,
    pub empathy: f64,
    pub sentiment: f64,
    pub fallback: f64,
    pub resolution: f64,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.clarity + self.relevance + self.empathy + self.sentiment + self.fallback + self.resolution
    }

    /// (name, weight) pairs in aggregation order
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("clarity", self.clarity),
            ("relevance", self.relevance),
            ("empathy", self.empathy),
            ("sentiment", self.sentiment),
            ("fallback", self.fallback),
            ("resolution", self.resolution),
        ]
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            clarity: 0.25,
            relevance: 0.25,
            empathy: 0.15,
            sentiment: 0.15,
            fallback: 0.10,
            resolution: 0.10,
        }
    }
}

/// Compound score cut-offs. `compound >= positive` is positive,
/// `compound <= negative` is negative, anything between is neutral.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SentimentThresholds {
    pub positive: f64,
    pub negative: f64,
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            positive: 0.05,
            negative: -0.05,
        }
    }
}

/// Keyword and pattern tables used by the heuristic scorers.
///
/// Keywords match as case-insensitive substrings. `fallback_patterns` are
/// regular expressions, also matched case-insensitively.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct KeywordTables {
    pub uncertain: Vec<String>,
    pub confident: Vec<String>,
    pub user_closure: Vec<String>,
    pub ai_closure: Vec<String>,
    pub empathy: Vec<String>,
    pub resolution: Vec<String>,
    pub fallback_patterns: Vec<String>,
}

impl KeywordTables {
    /// (name, keywords) pairs for every plain keyword table
    pub fn keyword_lists(&self) -> [(&'static str, &[String]); 6] {
        [
            ("uncertain", self.uncertain.as_slice()),
            ("confident", self.confident.as_slice()),
            ("user_closure", self.user_closure.as_slice()),
            ("ai_closure", self.ai_closure.as_slice()),
            ("empathy", self.empathy.as_slice()),
            ("resolution", self.resolution.as_slice()),
        ]
    }

    /// Copy of the tables with every keyword lowercased, ready for matching
    /// against lowercased message text.
    pub fn normalized(&self) -> Self {
        Self {
            uncertain: lower(&self.uncertain),
            confident: lower(&self.confident),
            user_closure: lower(&self.user_closure),
            ai_closure: lower(&self.ai_closure),
            empathy: lower(&self.empathy),
            resolution: lower(&self.resolution),
            fallback_patterns: self.fallback_patterns.clone(),
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn lower(list: &[String]) -> Vec<String> {
    list.iter().map(|w| w.to_lowercase()).collect()
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            uncertain: words(&["maybe", "might", "i think", "not sure", "possibly", "probably"]),
            confident: words(&["confirmed", "definitely", "checked", "verified", "certainly"]),
            user_closure: words(&["thanks", "thank you", "okay", "great", "good", "perfect"]),
            ai_closure: words(&["resolved", "glad", "happy", "done", "fixed", "completed"]),
            empathy: words(&[
                "sorry",
                "apologize",
                "understand",
                "i'm sorry",
                "that must be",
                "i see",
                "i understand",
            ]),
            resolution: words(&["resolved", "fixed", "shipped", "completed", "delivered", "done"]),
            fallback_patterns: words(&[
                r"don't know",
                r"do not know",
                r"can't help",
                r"cannot help",
                r"i'm not sure",
                r"unable to",
                r"i don'?t have",
                r"no idea",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = Weights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_analysis_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.clarity_midpoint, 15.0);
        assert_eq!(config.default_response_time, 5.0);
        assert_eq!(config.escalation_fallback_threshold, 2);
        assert_eq!(config.keywords.fallback_patterns.len(), 8);
        assert!(config.keywords.empathy.contains(&"that must be".to_string()));
    }

    #[test]
    fn test_empty_analysis_config_parse() {
        let config: AnalysisConfig = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_partial_analysis_config_parse() {
        let yaml = r#"
clarity_midpoint: 20
weights:
  clarity: 0.35
  relevance: 0.15
keywords:
  empathy: ["Sorry", "my bad"]
"#;
        let config: AnalysisConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.clarity_midpoint, 20.0);
        assert_eq!(config.weights.clarity, 0.35);
        assert_eq!(config.weights.relevance, 0.15);
        // Unlisted weights keep their defaults
        assert_eq!(config.weights.empathy, 0.15);
        assert_eq!(config.keywords.empathy, vec!["Sorry", "my bad"]);
        assert_eq!(config.keywords.resolution, KeywordTables::default().resolution);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "clarity_target: 10\n";
        assert!(serde_saphyr::from_str::<AnalysisConfig>(yaml).is_err());
    }

    #[test]
    fn test_analysis_config_serde_roundtrip() {
        let config = AnalysisConfig::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: AnalysisConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_normalized_lowercases_keywords_only() {
        let tables = KeywordTables {
            empathy: vec!["I'm Sorry".to_string()],
            fallback_patterns: vec![r"No\s+Idea".to_string()],
            ..KeywordTables::default()
        };
        let normalized = tables.normalized();
        assert_eq!(normalized.empathy, vec!["i'm sorry"]);
        assert_eq!(normalized.fallback_patterns, vec![r"No\s+Idea"]);
    }
}
