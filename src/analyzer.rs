//! Language analyzer.
//!
//! Runs every detector registered for a language over a snippet, isolating
//! each one so that a panicking rule contributes nothing instead of aborting
//! the run, then derives the structural estimates, the scores, the test
//! scaffolds and the optional classifier verdict.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::classifier::{self, AiAnalysis, QualityClassifier};
use crate::detect::languages::python;
use crate::detect::lexical::{comment_markers, line_count, max_nesting};
use crate::detect::{Category, Findings, Issue, Severity, Suggestion};
use crate::language::{Language, UnsupportedLanguage};
use crate::library::RuleSet;
use crate::scaffold::{self, TestCase};
use crate::score::{self, serialize_rounded, Metrics};

/// Upper bound of the complexity and quality estimates.
pub const MAX_ESTIMATE: f64 = 10.0;
/// Estimate reported by degraded results.
pub const NEUTRAL_ESTIMATE: f64 = 5.0;
/// Largest bonus modern idioms can add to the quality estimate.
pub const MAX_IDIOM_BONUS: f64 = 3.0;

pub const TIMEOUT_RULE: &str = "analysis-timeout";
pub const FAILURE_RULE: &str = "analysis-failure";

const TIMEOUT_MESSAGE: &str = "Code analysis timeout - try with a smaller code sample";
const TIMEOUT_WARNING: &str = "Analysis is taking longer than expected. Returning partial results.";
const TIMEOUT_SUMMARY: &str = "Analysis timeout. Try with a smaller code sample.";
const FAILURE_MESSAGE: &str = "Code analysis failed unexpectedly - the result is incomplete";
const FAILURE_WARNING: &str = "Analysis failed. Returning partial results.";
const FAILURE_SUMMARY: &str = "Analysis failed. Scores are neutral placeholders.";

/// Errors surfaced by the analysis entry points.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    UnsupportedLanguage(#[from] UnsupportedLanguage),
    #[error("no rule set registered for {0}")]
    MissingRuleSet(Language),
    #[error("analysis cancelled")]
    Cancelled,
}

/// Text statistics reported alongside the findings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeStats {
    pub lines: usize,
    pub characters: usize,
    pub routines: usize,
    pub classes: usize,
    pub comment_markers: usize,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub docstrings: usize,
    /// Usage count per modern idiom.
    pub idioms: BTreeMap<String, usize>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Everything one analysis produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub language: String,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<Suggestion>,
    pub test_cases: Vec<TestCase>,
    pub metrics: Metrics,
    #[serde(serialize_with = "serialize_rounded")]
    pub complexity: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub quality: f64,
    pub summary: String,
    #[serde(default)]
    pub stats: CodeStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAnalysis>,
    /// Set when the result is a placeholder rather than a real analysis.
    #[serde(rename = "partial_result", default, skip_serializing_if = "is_false")]
    pub partial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl AnalysisResult {
    /// Placeholder returned when the time budget ran out.
    pub fn timed_out(language: Language) -> Self {
        Self::degraded(
            language,
            TIMEOUT_RULE,
            TIMEOUT_MESSAGE,
            TIMEOUT_WARNING,
            TIMEOUT_SUMMARY,
        )
    }

    /// Placeholder returned when the analysis itself crashed.
    pub fn failed(language: Language) -> Self {
        Self::degraded(
            language,
            FAILURE_RULE,
            FAILURE_MESSAGE,
            FAILURE_WARNING,
            FAILURE_SUMMARY,
        )
    }

    fn degraded(
        language: Language,
        rule: &str,
        message: &str,
        warning: &str,
        summary: &str,
    ) -> Self {
        Self {
            language: language.as_str().to_string(),
            issues: vec![Issue {
                rule: rule.to_string(),
                line: 1,
                message: message.to_string(),
                severity: Severity::Warning,
                category: Category::Performance,
            }],
            suggestions: Vec::new(),
            test_cases: Vec::new(),
            metrics: Metrics::neutral(),
            complexity: NEUTRAL_ESTIMATE,
            quality: NEUTRAL_ESTIMATE,
            summary: summary.to_string(),
            stats: CodeStats::default(),
            ai_analysis: None,
            partial: true,
            warning: Some(warning.to_string()),
        }
    }

    /// Whether any issue is at error or critical severity.
    pub fn has_severe_issues(&self) -> bool {
        self.issues.iter().any(|i| i.severity.is_severe())
    }
}

/// Analyzer for one language.
///
/// Use builder methods to attach a cancellation token or a classifier, then
/// call [`Analyzer::run`].
pub struct Analyzer<'a> {
    rules: &'a RuleSet,
    cancel: Option<CancellationToken>,
    classifier: Option<&'a dyn QualityClassifier>,
}

impl<'a> Analyzer<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self {
            rules,
            cancel: None,
            classifier: None,
        }
    }

    /// Stop at the next detector boundary once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Merge a classifier verdict into the result.
    pub fn with_classifier(mut self, classifier: Option<&'a dyn QualityClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    fn check_cancelled(&self) -> Result<(), EngineError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(EngineError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Run every detector in registration order.
    pub fn detect(&self, code: &str) -> Result<Findings, EngineError> {
        let mut findings = Findings::new();
        for detector in &self.rules.detectors {
            self.check_cancelled()?;
            match catch_unwind(AssertUnwindSafe(|| detector.detect(code))) {
                Ok(found) => {
                    if !found.is_empty() {
                        debug!(
                            rule = detector.id,
                            issues = found.issues.len(),
                            suggestions = found.suggestions.len(),
                            "detector fired"
                        );
                    }
                    findings.merge(found);
                }
                Err(payload) => {
                    warn!(
                        rule = detector.id,
                        language = %self.rules.language,
                        panic = panic_message(payload.as_ref()),
                        "detector panicked, skipping its findings"
                    );
                }
            }
        }
        Ok(findings)
    }

    /// Analyze `code`.
    pub fn run(&self, code: &str) -> Result<AnalysisResult, EngineError> {
        let language = self.rules.language;
        let findings = self.detect(code)?;
        self.check_cancelled()?;

        let stats = self.stats(code);
        let complexity = complexity(
            self.rules.structure.control_count(code),
            stats.routines,
            max_nesting(code, language.is_brace_delimited()) + 1,
        );
        let idioms: usize = stats.idioms.values().sum();
        let quality = quality(
            findings.issues.len(),
            findings.severe_count(),
            self.rules.severe_weight,
            idioms,
        );
        let metrics = score::calculate(&self.rules.scoring, &findings.issues, code);
        debug!(%language, ?metrics, complexity, quality, "scored");

        self.check_cancelled()?;
        let test_cases = scaffold::test_cases(code, language);

        let ai_analysis = match self.classifier {
            Some(classifier) => {
                self.check_cancelled()?;
                Some(classifier::assess(Some(classifier), code))
            }
            None => None,
        };

        Ok(AnalysisResult {
            language: language.as_str().to_string(),
            summary: summary(findings.issues.len(), quality, complexity),
            issues: findings.issues,
            suggestions: findings.suggestions,
            test_cases,
            metrics,
            complexity,
            quality,
            stats,
            ai_analysis,
            partial: false,
            warning: None,
        })
    }

    fn stats(&self, code: &str) -> CodeStats {
        let structure = &self.rules.structure;
        let docstrings = match self.rules.language {
            Language::Python => python::docstring_count(code),
            _ => 0,
        };
        CodeStats {
            lines: line_count(code),
            characters: code.chars().count(),
            routines: structure.routine_count(code),
            classes: structure.class_count(code),
            comment_markers: comment_markers(code),
            docstrings,
            idioms: self
                .rules
                .idioms
                .iter()
                .map(|idiom| (idiom.name.to_string(), idiom.count(code)))
                .collect(),
        }
    }
}

/// `min(10, (control + routines + nesting) / 3)`.
pub fn complexity(control: usize, routines: usize, nesting: usize) -> f64 {
    ((control + routines + nesting) as f64 / 3.0).min(MAX_ESTIMATE)
}

/// Ten minus one per issue, minus `severe_weight` more per error or critical
/// issue, plus up to three for idiom usage; clamped to [0, 10].
pub fn quality(issues: usize, severe: usize, severe_weight: f64, idioms: usize) -> f64 {
    let bonus = (idioms as f64 / 5.0).min(MAX_IDIOM_BONUS);
    (MAX_ESTIMATE - issues as f64 - severe as f64 * severe_weight + bonus).clamp(0.0, MAX_ESTIMATE)
}

pub fn summary(issues: usize, quality: f64, complexity: f64) -> String {
    format!(
        "Found {} issues. Code quality: {:.1}/10. Complexity: {:.1}/10.",
        issues, quality, complexity
    )
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
