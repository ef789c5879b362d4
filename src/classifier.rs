//! Optional ML quality classifier.
//!
//! The classifier is an external collaborator: it rates a snippet with a
//! label and a confidence score. Every failure mode is absorbed into a fixed
//! neutral assessment so that rule-based analysis never depends on it.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::score::serialize_rounded;

/// Default token budget when the model does not say otherwise.
pub const DEFAULT_MAX_TOKENS: usize = 512;
/// Time allowed for one verdict before the neutral fallback is used.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(5);

const NEUTRAL_QUALITY: f64 = 5.0;
const NEUTRAL_CONFIDENCE: f64 = 0.5;
const UNAVAILABLE_NOTE: &str = "AI model not available. Using rule-based analysis instead.";
const ERROR_NOTE: &str = "Error in AI analysis. Using rule-based analysis instead.";

/// Errors raised by a classifier backend.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[cfg(feature = "http-classifier")]
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("classifier returned HTTP {0}")]
    Status(u16),
    #[error("malformed classifier response: {0}")]
    Malformed(String),
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
}

/// Raw model output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

/// A text classifier with a bounded input size.
pub trait QualityClassifier: Send + Sync {
    /// Maximum number of whitespace-delimited tokens accepted per call.
    fn max_tokens(&self) -> usize {
        DEFAULT_MAX_TOKENS
    }

    fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;
}

/// The classifier's verdict as it appears in an analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    #[serde(serialize_with = "serialize_rounded")]
    pub quality_score: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub confidence: f64,
    pub suggestions: Vec<String>,
}

impl AiAnalysis {
    /// Neutral verdict used when no model is configured.
    pub fn unavailable() -> Self {
        Self::neutral(UNAVAILABLE_NOTE)
    }

    /// Neutral verdict used when the model failed.
    pub fn failed() -> Self {
        Self::neutral(ERROR_NOTE)
    }

    fn neutral(note: &str) -> Self {
        Self {
            quality_score: NEUTRAL_QUALITY,
            confidence: NEUTRAL_CONFIDENCE,
            suggestions: vec![note.to_string()],
        }
    }

    /// Map a model score in [0, 1] onto the 0-10 quality scale.
    pub fn from_classification(classification: &Classification) -> Self {
        let score = if classification.score.is_finite() {
            classification.score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let quality_score = score * 10.0;
        let suggestions = if quality_score < 5.0 {
            vec![
                "Consider refactoring this code for better maintainability.".to_string(),
                "The code structure could be improved for better readability.".to_string(),
            ]
        } else if quality_score < 8.0 {
            vec!["Code is decent but could benefit from some improvements.".to_string()]
        } else {
            vec!["Code appears to be well-structured.".to_string()]
        };
        Self {
            quality_score,
            confidence: score,
            suggestions,
        }
    }
}

/// Keep at most `max_tokens` whitespace-delimited tokens of `text`.
pub fn truncate_tokens(text: &str, max_tokens: usize) -> String {
    text.split_whitespace()
        .take(max_tokens)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ask the classifier about `code`, falling back to a neutral verdict on any
/// failure.
pub fn assess(classifier: Option<&dyn QualityClassifier>, code: &str) -> AiAnalysis {
    let Some(classifier) = classifier else {
        return AiAnalysis::unavailable();
    };
    let input = truncate_tokens(code, classifier.max_tokens());
    match catch_unwind(AssertUnwindSafe(|| classifier.classify(&input))) {
        Ok(Ok(classification)) => {
            debug!(label = %classification.label, score = classification.score, "classifier verdict");
            AiAnalysis::from_classification(&classification)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "quality classifier failed, using neutral fallback");
            AiAnalysis::failed()
        }
        Err(_) => {
            warn!("quality classifier panicked, using neutral fallback");
            AiAnalysis::failed()
        }
    }
}

/// Pick the first classification from either `[{..}]` or `[[{..}]]`.
pub fn parse_response(body: &serde_json::Value) -> Result<Classification, ClassifierError> {
    let first = body
        .as_array()
        .and_then(|a| a.first())
        .ok_or_else(|| ClassifierError::Malformed("expected a non-empty array".to_string()))?;
    let first = match first.as_array() {
        Some(nested) => nested
            .first()
            .ok_or_else(|| ClassifierError::Malformed("empty nested array".to_string()))?,
        None => first,
    };
    serde_json::from_value(first.clone()).map_err(|e| ClassifierError::Malformed(e.to_string()))
}

#[cfg(feature = "http-classifier")]
pub use http::HttpClassifier;

#[cfg(feature = "http-classifier")]
mod http {
    use std::time::Duration;

    use super::{parse_response, Classification, ClassifierError, QualityClassifier};

    /// Classifier served by an inference endpoint that accepts
    /// `{"inputs": text}`.
    pub struct HttpClassifier {
        http: reqwest::blocking::Client,
        endpoint: String,
        max_tokens: usize,
    }

    impl HttpClassifier {
        pub fn new(
            endpoint: impl Into<String>,
            max_tokens: usize,
            timeout: Duration,
        ) -> Result<Self, ClassifierError> {
            let http = reqwest::blocking::Client::builder()
                .user_agent(concat!("codecritic/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()?;
            Ok(Self {
                http,
                endpoint: endpoint.into(),
                max_tokens,
            })
        }
    }

    impl QualityClassifier for HttpClassifier {
        fn max_tokens(&self) -> usize {
            self.max_tokens
        }

        fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
            let response = self
                .http
                .post(&self.endpoint)
                .json(&serde_json::json!({ "inputs": text }))
                .send()
                .map_err(|e| {
                    if e.is_timeout() {
                        ClassifierError::Timeout
                    } else {
                        ClassifierError::Network(e)
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(ClassifierError::Status(status.as_u16()));
            }
            let body: serde_json::Value = response.json()?;
            parse_response(&body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Fixed {
        score: f64,
        seen: Mutex<Option<String>>,
    }

    impl QualityClassifier for Fixed {
        fn max_tokens(&self) -> usize {
            3
        }

        fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
            *self.seen.lock().unwrap() = Some(text.to_string());
            Ok(Classification {
                label: "LABEL_2".to_string(),
                score: self.score,
            })
        }
    }

    struct Broken;

    impl QualityClassifier for Broken {
        fn classify(&self, _text: &str) -> Result<Classification, ClassifierError> {
            Err(ClassifierError::Unavailable("model not loaded".to_string()))
        }
    }

    struct Panicky;

    impl QualityClassifier for Panicky {
        fn classify(&self, _text: &str) -> Result<Classification, ClassifierError> {
            panic!("tensor shape mismatch");
        }
    }

    #[test]
    fn test_panic_is_neutral_with_error_note() {
        let ai = assess(Some(&Panicky), "x = 1");
        assert_eq!(ai, AiAnalysis::failed());
    }

    #[test]
    fn test_no_classifier_is_neutral() {
        let ai = assess(None, "x = 1");
        assert_eq!(ai.quality_score, 5.0);
        assert_eq!(ai.confidence, 0.5);
        assert!(ai.suggestions[0].contains("not available"));
    }

    #[test]
    fn test_failure_is_neutral_with_error_note() {
        let ai = assess(Some(&Broken), "x = 1");
        assert_eq!(ai.quality_score, 5.0);
        assert!(ai.suggestions[0].starts_with("Error in AI analysis"));
    }

    #[test]
    fn test_input_is_truncated() {
        let fixed = Fixed {
            score: 0.9,
            seen: Mutex::new(None),
        };
        let ai = assess(Some(&fixed), "a b\n c d e");
        assert_eq!(fixed.seen.lock().unwrap().as_deref(), Some("a b c"));
        assert!((ai.quality_score - 9.0).abs() < 1e-9);
        assert_eq!(ai.suggestions, vec!["Code appears to be well-structured.".to_string()]);
    }

    #[test]
    fn test_suggestion_bands() {
        let low = AiAnalysis::from_classification(&Classification {
            label: "LABEL_0".to_string(),
            score: 0.3,
        });
        assert_eq!(low.suggestions.len(), 2);
        let mid = AiAnalysis::from_classification(&Classification {
            label: "LABEL_1".to_string(),
            score: 0.6,
        });
        assert!(mid.suggestions[0].starts_with("Code is decent"));
    }

    #[test]
    fn test_parse_flat_and_nested_responses() {
        let flat = serde_json::json!([{ "label": "LABEL_1", "score": 0.42 }]);
        assert_eq!(parse_response(&flat).unwrap().label, "LABEL_1");
        let nested = serde_json::json!([[{ "label": "LABEL_2", "score": 0.8 }]]);
        assert_eq!(parse_response(&nested).unwrap().score, 0.8);
        assert!(parse_response(&serde_json::json!({})).is_err());
        assert!(parse_response(&serde_json::json!([])).is_err());
    }

    #[test]
    fn test_rounded_serialization() {
        let ai = AiAnalysis::from_classification(&Classification {
            label: "LABEL_2".to_string(),
            score: 0.87654,
        });
        let json = serde_json::to_value(&ai).unwrap();
        assert_eq!(json["qualityScore"], 8.77);
        assert_eq!(json["confidence"], 0.88);
    }
}
