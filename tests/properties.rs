//! Property-based tests for the engine using proptest.

use proptest::prelude::*;

use codecritic::analyzer::Analyzer;
use codecritic::library::PatternLibrary;
use codecritic::transform::{self, Mode};
use codecritic::{scaffold, Language};

/// Source-like text: keywords, punctuation and indentation mixed freely.
fn code_like() -> impl Strategy<Value = String> {
    let token = prop_oneof![
        Just("def ".to_string()),
        Just("function ".to_string()),
        Just("class ".to_string()),
        Just("public static void ".to_string()),
        Just("if (x) ".to_string()),
        Just("for ".to_string()),
        Just("var ".to_string()),
        Just("new ".to_string()),
        Just("eval(".to_string()),
        Just("console.log(".to_string()),
        Just("print(".to_string()),
        Just("mysql_query(".to_string()),
        Just("array(".to_string()),
        Just("try ".to_string()),
        Just("\"".to_string()),
        Just("'".to_string()),
        Just("$".to_string()),
        Just("{".to_string()),
        Just("}".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
        Just(":".to_string()),
        Just(";".to_string()),
        Just("\n".to_string()),
        Just("\n    ".to_string()),
        "[a-zA-Z_][a-zA-Z0-9_]{0,8}",
        "[ =+*/,.<>0-9]{1,4}",
    ];
    prop::collection::vec(token, 0..80).prop_map(|tokens| tokens.concat())
}

/// Brace-delimited control flow: headers with next-line, inline or missing
/// bodies at varying indentation.
fn control_flow() -> impl Strategy<Value = String> {
    let header = prop_oneof![
        Just("if (x)"),
        Just("while (ok)"),
        Just("for (i = 0; i < n; i++)"),
        Just("} else if (y)"),
    ];
    let statement = prop_oneof![Just("run();"), Just("total = 1;"), Just("}")];
    let line = prop_oneof![
        header.clone().prop_map(str::to_string),
        (header, statement.clone()).prop_map(|(h, s)| format!("{} {}", h, s)),
        statement.prop_map(str::to_string),
        Just(String::new()),
    ];
    prop::collection::vec((0usize..3, line), 0..12).prop_map(|lines| {
        lines
            .into_iter()
            .map(|(depth, text)| format!("{}{}", "    ".repeat(depth), text))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn is_layout_only(improvement: &str) -> bool {
    improvement.ends_with("missing semicolons") || improvement == transform::GENERAL_IMPROVEMENT
}

fn language() -> impl Strategy<Value = Language> {
    prop::sample::select(Language::ALL.to_vec())
}

// --- Analysis ---

proptest! {
    #[test]
    fn analysis_scores_stay_in_range(code in code_like(), language in language()) {
        let library = PatternLibrary::shared();
        let rules = library.get(language).unwrap();
        let result = Analyzer::new(rules).run(&code).unwrap();

        for score in [
            result.metrics.readability,
            result.metrics.security,
            result.metrics.performance,
            result.metrics.overall,
        ] {
            prop_assert!((0.0..=100.0).contains(&score));
        }
        prop_assert!((0.0..=10.0).contains(&result.complexity));
        prop_assert!((0.0..=10.0).contains(&result.quality));
        prop_assert!(!result.partial);
        prop_assert!(result.ai_analysis.is_none());
        prop_assert_eq!(result.language, language.as_str());
    }

    #[test]
    fn analysis_is_deterministic(code in code_like(), language in language()) {
        let library = PatternLibrary::shared();
        let rules = library.get(language).unwrap();
        let first = Analyzer::new(rules).run(&code).unwrap();
        let second = Analyzer::new(rules).run(&code).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn issue_lines_point_into_the_code(code in code_like(), language in language()) {
        let library = PatternLibrary::shared();
        let rules = library.get(language).unwrap();
        let result = Analyzer::new(rules).run(&code).unwrap();
        let lines = code.split('\n').count();
        for issue in &result.issues {
            prop_assert!(issue.line >= 1 && issue.line <= lines.max(1));
        }
    }

    #[test]
    fn arbitrary_text_does_not_break_analysis(code in "\\PC{0,200}", language in language()) {
        let library = PatternLibrary::shared();
        let rules = library.get(language).unwrap();
        prop_assert!(Analyzer::new(rules).run(&code).is_ok());
    }
}

// --- Transformations and scaffolds ---

proptest! {
    #[test]
    fn transforms_are_total(code in code_like(), language in language()) {
        let library = PatternLibrary::shared();
        for mode in [Mode::Fix, Mode::Enhance] {
            let outcome = transform::transform(&library, &code, language.as_str(), mode);
            if outcome.improvements.is_empty() {
                prop_assert_eq!(&outcome.code, &code);
            }
        }
    }

    #[test]
    fn fix_converges_on_control_flow(
        code in control_flow(),
        language in prop::sample::select(vec![Language::Java, Language::JavaScript]),
    ) {
        let library = PatternLibrary::shared();
        let first = transform::transform(&library, &code, language.as_str(), Mode::Fix);
        let second = transform::transform(&library, &first.code, language.as_str(), Mode::Fix);
        for improvement in &second.improvements {
            prop_assert!(is_layout_only(improvement), "{:?} after {:?}", improvement, first.code);
        }
    }

    #[test]
    fn unsupported_language_passes_through(code in code_like()) {
        let library = PatternLibrary::shared();
        let outcome = transform::transform(&library, &code, "fortran", Mode::Enhance);
        prop_assert_eq!(outcome.code, code);
        prop_assert!(outcome.improvements.is_empty());
    }

    #[test]
    fn scaffolds_are_never_empty(code in code_like(), language in language()) {
        let scaffold = scaffold::generate_tests(&code, language.as_str());
        prop_assert!(!scaffold.trim().is_empty());
    }
}
