//! Scoring engine.
//!
//! Turns issues and a few text statistics into readability, security and
//! performance scores (0-100) plus their mean. Each language carries its own
//! profile: a base per dimension, a penalty per issue counted against that
//! dimension, an extra penalty for error/critical issues, and an optional
//! readability bonus. Scores keep full precision; rounding to two decimals
//! happens only when they are serialized.

use serde::{Deserialize, Serialize, Serializer};

use crate::detect::lexical::{comment_markers, line_count};
use crate::detect::{Dimension, Issue};

/// Common penalty weights.
pub mod points {
    pub const READABILITY_PER_ISSUE: f64 = 5.0;
    pub const SECURITY_PER_ISSUE: f64 = 10.0;
    pub const PERFORMANCE_PER_ISSUE: f64 = 10.0;
    /// Extra penalty for an error or critical issue when a profile sets no other.
    pub const SEVERE_EXTRA: f64 = 5.0;
}

/// Bounds every score is clamped to.
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Neutral value used for degraded results.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Penalty table for one dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penalty {
    pub base: f64,
    pub per_issue: f64,
    pub per_severe: f64,
}

impl Penalty {
    pub const fn new(base: f64, per_issue: f64, per_severe: f64) -> Self {
        Self {
            base,
            per_issue,
            per_severe,
        }
    }

    fn apply(&self, issues: usize, severe: usize) -> f64 {
        self.base - self.per_issue * issues as f64 - self.per_severe * severe as f64
    }
}

/// Readability bonus.
#[derive(Debug, Clone, Copy)]
pub enum Bonus {
    None,
    /// `min(cap, floor(markers / lines * 100))` over `//`, `/*`, `*/` markers.
    CommentDensity { cap: f64 },
    /// `min(cap, per * count)` over documented routines.
    Docstrings {
        per: f64,
        cap: f64,
        counter: fn(&str) -> usize,
    },
}

impl Bonus {
    fn value(&self, code: &str) -> f64 {
        match self {
            Bonus::None => 0.0,
            Bonus::CommentDensity { cap } => {
                let lines = line_count(code).max(1) as f64;
                let density = (comment_markers(code) as f64 / lines * 100.0).floor();
                density.min(*cap)
            }
            Bonus::Docstrings { per, cap, counter } => (per * counter(code) as f64).min(*cap),
        }
    }
}

/// How the performance score is produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PerformanceModel {
    Penalized(Penalty),
    /// No performance rules exist for the language; the score is a fixed
    /// placeholder and says nothing about the code.
    Unmodeled { placeholder: f64 },
}

/// Substring that counts as extra security issues wherever it appears.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hotspot {
    pub needle: &'static str,
    pub weight: usize,
}

/// Per-language scoring profile.
#[derive(Debug, Clone, Copy)]
pub struct ScoringProfile {
    pub readability: Penalty,
    pub readability_bonus: Bonus,
    pub security: Penalty,
    pub security_hotspots: &'static [Hotspot],
    pub performance: PerformanceModel,
}

/// The four quality scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(rename = "readabilityScore", serialize_with = "serialize_rounded")]
    pub readability: f64,
    #[serde(rename = "securityScore", serialize_with = "serialize_rounded")]
    pub security: f64,
    #[serde(rename = "performanceScore", serialize_with = "serialize_rounded")]
    pub performance: f64,
    #[serde(rename = "overallScore", serialize_with = "serialize_rounded")]
    pub overall: f64,
}

impl Metrics {
    /// Build metrics from three dimension scores; overall is their mean.
    pub fn from_dimensions(readability: f64, security: f64, performance: f64) -> Self {
        Self {
            readability,
            security,
            performance,
            overall: (readability + security + performance) / 3.0,
        }
    }

    /// Fixed neutral metrics for degraded results.
    pub fn neutral() -> Self {
        Self::from_dimensions(NEUTRAL_SCORE, NEUTRAL_SCORE, NEUTRAL_SCORE)
    }

    /// Copy with every score rounded to two decimals.
    pub fn rounded(&self) -> Self {
        Self {
            readability: round2(self.readability),
            security: round2(self.security),
            performance: round2(self.performance),
            overall: round2(self.overall),
        }
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn serialize_rounded<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round2(*value))
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_SCORE;
    }
    value.clamp(MIN_SCORE, MAX_SCORE)
}

/// Issue and severe-issue counts for one dimension.
fn counts(issues: &[Issue], dimension: Dimension) -> (usize, usize) {
    issues
        .iter()
        .filter(|i| i.category.dimension() == dimension)
        .fold((0, 0), |(all, severe), i| {
            (all + 1, severe + usize::from(i.severity.is_severe()))
        })
}

/// Calculate metrics for a snippet from its issues.
pub fn calculate(profile: &ScoringProfile, issues: &[Issue], code: &str) -> Metrics {
    let (r_all, r_severe) = counts(issues, Dimension::Readability);
    let readability = clamp_score(
        profile.readability.apply(r_all, r_severe) + profile.readability_bonus.value(code),
    );

    let (s_all, s_severe) = counts(issues, Dimension::Security);
    let hotspot_hits: usize = profile
        .security_hotspots
        .iter()
        .filter(|h| code.contains(h.needle))
        .map(|h| h.weight)
        .sum();
    let security = clamp_score(profile.security.apply(s_all + hotspot_hits, s_severe));

    let performance = match profile.performance {
        PerformanceModel::Penalized(penalty) => {
            let (p_all, p_severe) = counts(issues, Dimension::Performance);
            clamp_score(penalty.apply(p_all, p_severe))
        }
        PerformanceModel::Unmodeled { placeholder } => clamp_score(placeholder),
    };

    Metrics::from_dimensions(readability, security, performance)
}
