//! Code transformer.
//!
//! Fix mode runs four ordered stages over the text: layout (terminators, or
//! indentation for Python), spacing, language-specific structural repairs,
//! and typo correction. Enhance mode runs fix mode and then the language's
//! modernizing rewrites. Every structural and modernizing rule is guarded by
//! a precondition that no longer holds once it has been applied, so running a
//! mode on its own output converges.
//!
//! Improvements are described after the fact by comparing markers between
//! the input and output text, never by logging which rules ran.

pub mod common;
pub mod languages;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::language::Language;
use crate::library::PatternLibrary;

/// Improvement reported when the text changed but no marker explains how.
pub const GENERAL_IMPROVEMENT: &str = "Applied general code formatting and style improvements";

/// Which pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Fix,
    Enhance,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Fix => "fix",
            Mode::Enhance => "enhance",
        }
    }
}

/// A named text-to-text rewrite.
#[derive(Debug, Clone, Copy)]
pub struct RewriteRule {
    pub id: &'static str,
    pub apply: fn(&str) -> String,
}

impl RewriteRule {
    pub const fn new(id: &'static str, apply: fn(&str) -> String) -> Self {
        Self { id, apply }
    }
}

/// Compares text before and after a pipeline and names the change it sees.
pub type MarkerFn = fn(before: &str, after: &str) -> Option<String>;

/// Everything a language contributes to the transformer.
#[derive(Debug, Clone)]
pub struct Rewrites {
    pub layout: fn(&str) -> String,
    pub spacing: fn(&str) -> String,
    pub structural: Vec<RewriteRule>,
    pub enhance: Vec<RewriteRule>,
    pub fix_markers: Vec<MarkerFn>,
    pub enhance_markers: Vec<MarkerFn>,
}

/// Result of a transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOutcome {
    pub code: String,
    pub improvements: Vec<String>,
    pub changed_lines: usize,
}

impl TransformOutcome {
    /// The input handed back untouched.
    pub fn unchanged(code: &str) -> Self {
        Self {
            code: code.to_string(),
            improvements: Vec::new(),
            changed_lines: 0,
        }
    }
}

/// Transform `code` written in `language`.
///
/// An unknown language is not an error here: the code is returned as is with
/// no improvements.
pub fn transform(library: &PatternLibrary, code: &str, language: &str, mode: Mode) -> TransformOutcome {
    let Ok(language) = language.parse::<Language>() else {
        debug!(language, "unsupported language, passing code through");
        return TransformOutcome::unchanged(code);
    };
    match library.get(language) {
        Some(rules) => run(&rules.rewrites, code, mode),
        None => TransformOutcome::unchanged(code),
    }
}

/// Run the pipeline for `mode` with a language's rewrites.
pub fn run(rewrites: &Rewrites, code: &str, mode: Mode) -> TransformOutcome {
    let fixed = fix(rewrites, code);
    let mut improvements = describe(&rewrites.fix_markers, code, &fixed);

    let output = match mode {
        Mode::Fix => fixed,
        Mode::Enhance => {
            let enhanced = apply_all(&rewrites.enhance, &fixed);
            improvements.extend(describe(&rewrites.enhance_markers, &fixed, &enhanced));
            enhanced
        }
    };

    if improvements.is_empty() && output != code {
        improvements.push(GENERAL_IMPROVEMENT.to_string());
    }
    let changed_lines = output.split('\n').count().abs_diff(code.split('\n').count());
    debug!(
        mode = mode.as_str(),
        improvements = improvements.len(),
        changed_lines,
        "transform finished"
    );

    TransformOutcome {
        code: output,
        improvements,
        changed_lines,
    }
}

fn fix(rewrites: &Rewrites, code: &str) -> String {
    let laid_out = (rewrites.layout)(code);
    let spaced = (rewrites.spacing)(&laid_out);
    let repaired = apply_all(&rewrites.structural, &spaced);
    common::fix_typos(&repaired)
}

fn apply_all(rules: &[RewriteRule], code: &str) -> String {
    rules.iter().fold(code.to_string(), |text, rule| {
        let next = (rule.apply)(&text);
        if next != text {
            debug!(rule = rule.id, "rewrite applied");
        }
        next
    })
}

fn describe(markers: &[MarkerFn], before: &str, after: &str) -> Vec<String> {
    markers.iter().filter_map(|m| m(before, after)).collect()
}

/// Shared improvement markers.
pub mod markers {
    use crate::detect::lexical::missing_terminator_lines;

    use super::common::{braceless_count, has_typos};

    pub fn terminators(before: &str, after: &str) -> Option<String> {
        let added = missing_terminator_lines(before)
            .len()
            .saturating_sub(missing_terminator_lines(after).len());
        (added > 0).then(|| format!("Added {} missing semicolons", added))
    }

    pub fn typos(before: &str, after: &str) -> Option<String> {
        (has_typos(before) && !has_typos(after)).then(|| "Corrected common misspellings".to_string())
    }

    pub fn braces(before: &str, after: &str) -> Option<String> {
        (braceless_count(after) < braceless_count(before))
            .then(|| "Added braces to single-statement control bodies".to_string())
    }

    /// `Some(message)` when `needle` occurs more often after than before.
    pub fn gained(before: &str, after: &str, needle: &str, message: &str) -> Option<String> {
        (after.matches(needle).count() > before.matches(needle).count())
            .then(|| message.to_string())
    }

    /// `Some(message)` when `needle` occurs less often after than before.
    pub fn lost(before: &str, after: &str, needle: &str, message: &str) -> Option<String> {
        (after.matches(needle).count() < before.matches(needle).count())
            .then(|| message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> PatternLibrary {
        PatternLibrary::builtin()
    }

    #[test]
    fn test_unsupported_language_passes_through() {
        let code = "x=1";
        let outcome = transform(&library(), code, "cobol", Mode::Fix);
        assert_eq!(outcome, TransformOutcome::unchanged(code));
        let outcome = transform(&library(), code, "cobol", Mode::Enhance);
        assert_eq!(outcome.code, code);
        assert!(outcome.improvements.is_empty());
    }

    #[test]
    fn test_unchanged_text_reports_nothing() {
        let code = "const a = 1;\n";
        let outcome = transform(&library(), code, "javascript", Mode::Fix);
        assert_eq!(outcome.code, code);
        assert!(outcome.improvements.is_empty());
        assert_eq!(outcome.changed_lines, 0);
    }

    #[test]
    fn test_spacing_only_gets_general_improvement() {
        let outcome = transform(&library(), "f(a,b);", "javascript", Mode::Fix);
        assert_eq!(outcome.code, "f(a, b);");
        assert_eq!(outcome.improvements, vec![GENERAL_IMPROVEMENT.to_string()]);
    }

    #[test]
    fn test_changed_lines_is_line_delta() {
        let code = "if (ok)\n    run();";
        let outcome = transform(&library(), code, "java", Mode::Fix);
        assert_eq!(outcome.code, "if (ok) {\n    run();\n}");
        assert_eq!(outcome.changed_lines, 1);
    }

    #[test]
    fn test_empty_input() {
        for language in Language::ALL {
            for mode in [Mode::Fix, Mode::Enhance] {
                let outcome = transform(&library(), "", language.as_str(), mode);
                assert_eq!(outcome.code, "");
                assert!(outcome.improvements.is_empty());
            }
        }
    }
}
