use super::config::AnalysisConfig;
use regex::Regex;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Validate analysis configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_analysis(config: &AnalysisConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Weights
    let mut weights_ok = true;
    for (name, weight) in config.weights.entries() {
        if !weight.is_finite() || weight < 0.0 {
            errors.push(format!(
                "analysis.weights.{}: must be a non-negative number, got {}",
                name, weight
            ));
            weights_ok = false;
        }
    }
    if weights_ok {
        let sum = config.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            errors.push(format!("analysis.weights: must sum to 1.0, got {}", sum));
        }
    }

    if !(config.clarity_midpoint.is_finite() && config.clarity_midpoint > 0.0) {
        errors.push("analysis.clarity_midpoint: must be greater than zero".to_string());
    }

    if !(config.default_response_time.is_finite() && config.default_response_time >= 0.0) {
        errors.push("analysis.default_response_time: must be non-negative".to_string());
    }

    if !(config.fallback_penalty_step.is_finite() && config.fallback_penalty_step >= 0.0) {
        errors.push("analysis.fallback_penalty_step: must be non-negative".to_string());
    }

    let thresholds = &config.sentiment_thresholds;
    if !(-1.0..=1.0).contains(&thresholds.positive) || !(-1.0..=1.0).contains(&thresholds.negative) {
        errors.push("analysis.sentiment_thresholds: values must lie in [-1, 1]".to_string());
    } else if thresholds.negative >= thresholds.positive {
        errors.push(format!(
            "analysis.sentiment_thresholds: negative ({}) must be below positive ({})",
            thresholds.negative, thresholds.positive
        ));
    }

    // Keyword tables
    for (name, list) in config.keywords.keyword_lists() {
        for (i, keyword) in list.iter().enumerate() {
            if keyword.trim().is_empty() {
                errors.push(format!("analysis.keywords.{}[{}]: must not be empty", name, i));
            }
        }
    }

    for (i, pattern) in config.keywords.fallback_patterns.iter().enumerate() {
        if pattern.trim().is_empty() {
            errors.push(format!(
                "analysis.keywords.fallback_patterns[{}]: must not be empty",
                i
            ));
        } else if let Err(e) = Regex::new(pattern) {
            errors.push(format!(
                "analysis.keywords.fallback_patterns[{}]: invalid '{}' - {}",
                i, pattern, e
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{KeywordTables, SentimentThresholds, Weights};

    #[test]
    fn test_default_config_valid() {
        assert!(validate_analysis(&AnalysisConfig::default()).is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let config = AnalysisConfig {
            weights: Weights {
                clarity: 0.5,
                ..Weights::default()
            },
            ..AnalysisConfig::default()
        };
        let errors = validate_analysis(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("must sum to 1.0"));
    }

    #[test]
    fn test_negative_weight() {
        let config = AnalysisConfig {
            weights: Weights {
                clarity: -0.25,
                relevance: 0.75,
                ..Weights::default()
            },
            ..AnalysisConfig::default()
        };
        let errors = validate_analysis(&config).unwrap_err();
        // The sum check is skipped once an individual weight is invalid
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("analysis.weights.clarity"));
    }

    #[test]
    fn test_zero_clarity_midpoint() {
        let config = AnalysisConfig {
            clarity_midpoint: 0.0,
            ..AnalysisConfig::default()
        };
        let errors = validate_analysis(&config).unwrap_err();
        assert!(errors[0].contains("clarity_midpoint"));
    }

    #[test]
    fn test_inverted_sentiment_thresholds() {
        let config = AnalysisConfig {
            sentiment_thresholds: SentimentThresholds {
                positive: -0.1,
                negative: 0.1,
            },
            ..AnalysisConfig::default()
        };
        let errors = validate_analysis(&config).unwrap_err();
        assert!(errors[0].contains("must be below positive"));
    }

    #[test]
    fn test_invalid_fallback_pattern() {
        let config = AnalysisConfig {
            keywords: KeywordTables {
                fallback_patterns: vec!["no idea".to_string(), "(unclosed".to_string()],
                ..KeywordTables::default()
            },
            ..AnalysisConfig::default()
        };
        let errors = validate_analysis(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("analysis.keywords.fallback_patterns[1]"));
    }

    #[test]
    fn test_empty_keyword() {
        let config = AnalysisConfig {
            keywords: KeywordTables {
                empathy: vec!["sorry".to_string(), "  ".to_string()],
                ..KeywordTables::default()
            },
            ..AnalysisConfig::default()
        };
        let errors = validate_analysis(&config).unwrap_err();
        assert!(errors[0].contains("analysis.keywords.empathy[1]"));
    }

    #[test]
    fn test_collects_all_errors() {
        let config = AnalysisConfig {
            clarity_midpoint: -1.0,        // Error 1
            default_response_time: -5.0,   // Error 2
            weights: Weights {
                fallback: 0.5,             // Error 3 (sum)
                ..Weights::default()
            },
            ..AnalysisConfig::default()
        };
        let errors = validate_analysis(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
