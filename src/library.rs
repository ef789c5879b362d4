//! Pattern library.
//!
//! One immutable [`RuleSet`] per language: detectors in registration order,
//! the idioms counted for the quality estimate, the structural regexes used
//! by the complexity estimate, the scoring profile and the rewrite rules. The
//! built-in library is constructed once and shared read-only.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::detect::languages::{cpp, csharp, java, javascript, php, python};
use crate::detect::{Detector, Idiom, Structure};
use crate::language::Language;
use crate::score::{Bonus, Hotspot, Penalty, PerformanceModel, ScoringProfile};
use crate::transform::{languages as rewrites, Rewrites};

static BUILTIN: Lazy<Arc<PatternLibrary>> = Lazy::new(|| Arc::new(PatternLibrary::builtin()));

/// Extra quality deduction per error or critical issue for languages that
/// weigh severe issues lightly.
pub const LIGHT_SEVERE_WEIGHT: f64 = 1.0;
/// Extra quality deduction per error or critical issue for the rest.
pub const HEAVY_SEVERE_WEIGHT: f64 = 2.0;

pub const JAVASCRIPT_SCORING: ScoringProfile = ScoringProfile {
    readability: Penalty::new(80.0, 5.0, 5.0),
    readability_bonus: Bonus::CommentDensity { cap: 10.0 },
    security: Penalty::new(90.0, 10.0, 15.0),
    security_hotspots: &[],
    performance: PerformanceModel::Unmodeled { placeholder: 82.5 },
};

pub const PYTHON_SCORING: ScoringProfile = ScoringProfile {
    readability: Penalty::new(85.0, 5.0, 5.0),
    readability_bonus: Bonus::Docstrings {
        per: 5.0,
        cap: 15.0,
        counter: python::docstring_count,
    },
    security: Penalty::new(90.0, 10.0, 5.0),
    security_hotspots: &[Hotspot {
        needle: "eval(",
        weight: 2,
    }],
    performance: PerformanceModel::Unmodeled { placeholder: 85.0 },
};

pub const JAVA_SCORING: ScoringProfile = ScoringProfile {
    readability: Penalty::new(80.0, 5.0, 5.0),
    readability_bonus: Bonus::CommentDensity { cap: 10.0 },
    security: Penalty::new(85.0, 10.0, 5.0),
    security_hotspots: &[],
    performance: PerformanceModel::Penalized(Penalty::new(85.0, 10.0, 5.0)),
};

pub const PHP_SCORING: ScoringProfile = ScoringProfile {
    readability: Penalty::new(75.0, 5.0, 5.0),
    readability_bonus: Bonus::None,
    security: Penalty::new(80.0, 5.0, 15.0),
    security_hotspots: &[],
    performance: PerformanceModel::Penalized(Penalty::new(75.0, 10.0, 5.0)),
};

pub const CPP_SCORING: ScoringProfile = ScoringProfile {
    readability: Penalty::new(75.0, 5.0, 5.0),
    readability_bonus: Bonus::CommentDensity { cap: 15.0 },
    security: Penalty::new(80.0, 10.0, 5.0),
    security_hotspots: &[],
    performance: PerformanceModel::Penalized(Penalty::new(85.0, 10.0, 5.0)),
};

pub const CSHARP_SCORING: ScoringProfile = ScoringProfile {
    readability: Penalty::new(80.0, 5.0, 5.0),
    readability_bonus: Bonus::CommentDensity { cap: 10.0 },
    security: Penalty::new(85.0, 10.0, 5.0),
    security_hotspots: &[],
    performance: PerformanceModel::Penalized(Penalty::new(80.0, 10.0, 5.0)),
};

/// Everything the engine knows about one language.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub language: Language,
    pub detectors: Vec<Detector>,
    pub idioms: Vec<Idiom>,
    pub structure: Structure,
    pub scoring: ScoringProfile,
    /// Quality deduction per error or critical issue, on top of the one
    /// every issue costs.
    pub severe_weight: f64,
    pub rewrites: Rewrites,
}

impl RuleSet {
    pub fn builtin(language: Language) -> Self {
        match language {
            Language::JavaScript => Self {
                language,
                detectors: javascript::detectors(),
                idioms: javascript::idioms(),
                structure: javascript::structure(),
                scoring: JAVASCRIPT_SCORING,
                severe_weight: LIGHT_SEVERE_WEIGHT,
                rewrites: rewrites::javascript::rewrites(),
            },
            Language::Python => Self {
                language,
                detectors: python::detectors(),
                idioms: python::idioms(),
                structure: python::structure(),
                scoring: PYTHON_SCORING,
                severe_weight: LIGHT_SEVERE_WEIGHT,
                rewrites: rewrites::python::rewrites(),
            },
            Language::Java => Self {
                language,
                detectors: java::detectors(),
                idioms: java::idioms(),
                structure: java::structure(),
                scoring: JAVA_SCORING,
                severe_weight: LIGHT_SEVERE_WEIGHT,
                rewrites: rewrites::java::rewrites(),
            },
            Language::Php => Self {
                language,
                detectors: php::detectors(),
                idioms: php::idioms(),
                structure: php::structure(),
                scoring: PHP_SCORING,
                severe_weight: HEAVY_SEVERE_WEIGHT,
                rewrites: rewrites::php::rewrites(),
            },
            Language::Cpp => Self {
                language,
                detectors: cpp::detectors(),
                idioms: cpp::idioms(),
                structure: cpp::structure(),
                scoring: CPP_SCORING,
                severe_weight: HEAVY_SEVERE_WEIGHT,
                rewrites: rewrites::cpp::rewrites(),
            },
            Language::CSharp => Self {
                language,
                detectors: csharp::detectors(),
                idioms: csharp::idioms(),
                structure: csharp::structure(),
                scoring: CSHARP_SCORING,
                severe_weight: HEAVY_SEVERE_WEIGHT,
                rewrites: rewrites::csharp::rewrites(),
            },
        }
    }

    /// Append a detector after the built-in ones.
    pub fn with_detector(mut self, detector: Detector) -> Self {
        self.detectors.push(detector);
        self
    }
}

/// Immutable map from language to rule set.
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    rule_sets: HashMap<Language, RuleSet>,
}

impl PatternLibrary {
    /// A library with no languages registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A library with every built-in language.
    pub fn builtin() -> Self {
        Language::ALL
            .into_iter()
            .fold(Self::empty(), |lib, language| {
                lib.with_rule_set(RuleSet::builtin(language))
            })
    }

    /// The process-wide built-in library.
    pub fn shared() -> Arc<PatternLibrary> {
        Arc::clone(&BUILTIN)
    }

    /// Register or replace the rule set for its language.
    pub fn with_rule_set(mut self, rule_set: RuleSet) -> Self {
        self.rule_sets.insert(rule_set.language, rule_set);
        self
    }

    pub fn get(&self, language: Language) -> Option<&RuleSet> {
        self.rule_sets.get(&language)
    }

    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.rule_sets.keys().copied().collect();
        languages.sort_by_key(|l| l.as_str());
        languages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_language() {
        let library = PatternLibrary::builtin();
        for language in Language::ALL {
            let rules = library.get(language).unwrap();
            assert_eq!(rules.language, language);
            assert!(!rules.detectors.is_empty());
            assert!(!rules.idioms.is_empty());
        }
        assert_eq!(library.languages().len(), Language::ALL.len());
    }

    #[test]
    fn test_detector_ids_are_unique_per_language() {
        let library = PatternLibrary::shared();
        for language in Language::ALL {
            let rules = library.get(language).unwrap();
            let mut ids: Vec<&str> = rules.detectors.iter().map(|d| d.id).collect();
            let total = ids.len();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), total, "{}", language);
        }
    }

    #[test]
    fn test_shared_is_built_once() {
        assert!(Arc::ptr_eq(&PatternLibrary::shared(), &PatternLibrary::shared()));
    }

    #[test]
    fn test_empty_library() {
        let library = PatternLibrary::empty();
        assert!(library.get(Language::Python).is_none());
        let library = library.with_rule_set(RuleSet::builtin(Language::Python));
        assert!(library.get(Language::Python).is_some());
        assert!(library.get(Language::Java).is_none());
    }
}
