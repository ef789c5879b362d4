//! codecritic - heuristic multi-language code review engine.
//!
//! Analyzes snippets of JavaScript, Python, Java, PHP, C++ and C# without
//! parsing them: per-language detectors match lexical patterns, a scoring
//! table turns the findings into bounded metrics, a scaffold generator
//! guesses test inputs from parameter names, and a rewrite pipeline fixes or
//! modernizes the text.
//!
//! # Architecture
//!
//! - `library`: the immutable per-language rule sets, built once
//! - `detect`: detectors and the lexical helpers they share
//! - `extract`: best-effort routine signature extraction
//! - `analyzer`: runs a rule set over a snippet with per-detector isolation
//! - `score`: the scoring table
//! - `scaffold`: test scaffold generation
//! - `transform`: fix and enhance pipelines
//! - `orchestrator`: the engine, with its deadline and degraded results
//! - `classifier`, `history`: optional collaborators
//! - `config`, `report`, `cli`: the command-line surface
//!
//! # Adding a New Language
//!
//! Add a variant to [`Language`], a detector module under
//! `src/detect/languages/`, a rewrite module under
//! `src/transform/languages/`, and register both in `RuleSet::builtin`.

pub mod analyzer;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod detect;
pub mod extract;
pub mod history;
pub mod language;
pub mod library;
pub mod orchestrator;
pub mod report;
pub mod scaffold;
pub mod score;
pub mod transform;

pub use analyzer::{AnalysisResult, Analyzer, CodeStats, EngineError};
pub use classifier::{AiAnalysis, QualityClassifier};
pub use config::Config;
pub use detect::{Category, Issue, Severity, Suggestion};
pub use language::{Language, UnsupportedLanguage};
pub use library::{PatternLibrary, RuleSet};
pub use orchestrator::Engine;
pub use scaffold::TestCase;
pub use score::Metrics;
pub use transform::{Mode, TransformOutcome};
