//! C++ detectors.

use lazy_static::lazy_static;
use regex::Regex;

use super::{
    report_missing_error_handling, report_missing_terminators, suggest_missing_idioms,
    ERROR_HANDLING_MIN_LEN,
};
use crate::detect::lexical::{find_line, find_line_regex};
use crate::detect::{Category, Detector, Emitter, Idiom, Severity, Structure, Suggestion};

lazy_static! {
    static ref COUT: Regex = Regex::new(r"std::cout|\bcout\s*<<").unwrap();
    static ref NEW_KEYWORD: Regex = Regex::new(r"\bnew\b").unwrap();
    static ref DELETE_KEYWORD: Regex = Regex::new(r"\bdelete\b").unwrap();

    static ref CONTROL: Regex = Regex::new(r"\b(?:if|for|while|switch|catch)\b").unwrap();
    static ref ROUTINES: Regex =
        Regex::new(r"\w+\s+\w+\s*\([^)]*\)\s*(?:const)?\s*\{").unwrap();
    static ref CLASSES: Regex = Regex::new(r"\b(?:class|struct)\s+\w+").unwrap();

    static ref AUTO: Regex = Regex::new(r"\bauto\b").unwrap();
    static ref LAMBDA: Regex = Regex::new(r"\[\s*[&=]?\s*\]\s*\(").unwrap();
    static ref RANGE_FOR: Regex = Regex::new(r"for\s*\([^;()]*\w\s*:\s*").unwrap();
    static ref NULLPTR: Regex = Regex::new(r"\bnullptr\b").unwrap();
    static ref SMART_POINTERS: Regex = Regex::new(r"unique_ptr|shared_ptr|weak_ptr").unwrap();
}

pub fn detectors() -> Vec<Detector> {
    vec![
        Detector::new(
            "missing-semicolons",
            Category::Syntax,
            Severity::Error,
            missing_semicolons,
        ),
        Detector::new("cout", Category::Readability, Severity::Info, cout),
        Detector::new(
            "raw-allocation",
            Category::Performance,
            Severity::Critical,
            raw_allocation,
        ),
        Detector::new(
            "missing-error-handling",
            Category::Robustness,
            Severity::Warning,
            missing_error_handling,
        ),
        Detector::new(
            "using-namespace-std",
            Category::Readability,
            Severity::Info,
            using_namespace_std,
        ),
        Detector::new(
            "modern-idioms",
            Category::Modernization,
            Severity::Info,
            modern_idioms,
        ),
    ]
}

pub fn idioms() -> Vec<Idiom> {
    vec![
        Idiom {
            name: "auto",
            pattern: &AUTO,
        },
        Idiom {
            name: "lambda",
            pattern: &LAMBDA,
        },
        Idiom {
            name: "range_for",
            pattern: &RANGE_FOR,
        },
        Idiom {
            name: "nullptr",
            pattern: &NULLPTR,
        },
        Idiom {
            name: "smart_pointers",
            pattern: &SMART_POINTERS,
        },
    ]
}

pub fn structure() -> Structure {
    Structure {
        control_keywords: &CONTROL,
        routines: &ROUTINES,
        classes: &CLASSES,
    }
}

fn missing_semicolons(code: &str, out: &mut Emitter<'_>) {
    report_missing_terminators(code, out);
}

fn cout(code: &str, out: &mut Emitter<'_>) {
    let count = COUT.find_iter(code).count();
    if count > 0 {
        out.issue(
            find_line_regex(code, &COUT),
            format!("Found {} cout statements", count),
        );
    }
}

fn raw_allocation(code: &str, out: &mut Emitter<'_>) {
    let news = NEW_KEYWORD.find_iter(code).count();
    let deletes = DELETE_KEYWORD.find_iter(code).count();
    if news <= deletes {
        return;
    }
    out.issue(
        find_line_regex(code, &NEW_KEYWORD),
        format!(
            "Potential memory leak: {} 'new' operations without corresponding 'delete'",
            news - deletes
        ),
    );
    out.suggest(
        Suggestion::new(
            "Consider using smart pointers (std::unique_ptr, std::shared_ptr) instead of raw pointers",
        )
        .with_snippets(
            "int* value = new int(10);",
            "std::unique_ptr<int> value = std::make_unique<int>(10);",
        ),
    );
}

fn missing_error_handling(code: &str, out: &mut Emitter<'_>) {
    report_missing_error_handling(
        code,
        out,
        ERROR_HANDLING_MIN_LEN,
        "try/catch",
        (
            "int port = std::stoi(value);",
            "try {\n    int port = std::stoi(value);\n} catch (const std::exception& e) {\n    std::cerr << \"Error: \" << e.what() << std::endl;\n}",
        ),
    );
}

fn using_namespace_std(code: &str, out: &mut Emitter<'_>) {
    if code.contains("using namespace std;") {
        out.issue(
            find_line(code, "using namespace std;"),
            "Avoid 'using namespace std;' to prevent name collisions",
        );
    }
}

fn modern_idioms(code: &str, out: &mut Emitter<'_>) {
    suggest_missing_idioms(
        code,
        out,
        &idioms(),
        "Consider using modern C++ features (auto, lambdas, range-for, nullptr, smart pointers)",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Findings;

    fn run(code: &str) -> Findings {
        let mut findings = Findings::new();
        for d in detectors() {
            findings.merge(d.detect(code));
        }
        findings
    }

    #[test]
    fn test_leak_detection() {
        let code = "int main() {\n    int* p = new int(5);\n    return 0;\n}\n";
        let findings = run(code);
        let leak = findings
            .issues
            .iter()
            .find(|i| i.rule == "raw-allocation")
            .unwrap();
        assert_eq!(leak.severity, Severity::Critical);
        assert_eq!(leak.category, Category::Performance);
        assert_eq!(leak.line, 2);
        assert!(findings
            .suggestions
            .iter()
            .any(|s| s.description.contains("smart pointers")));
    }

    #[test]
    fn test_balanced_delete_is_clean() {
        let code = "int* p = new int(5);\ndelete p;\n";
        assert!(!run(code).issues.iter().any(|i| i.rule == "raw-allocation"));
    }

    #[test]
    fn test_preprocessor_lines_need_no_semicolon() {
        let code = "#include <iostream>\nusing namespace std;\n";
        let findings = run(code);
        assert!(!findings
            .issues
            .iter()
            .any(|i| i.rule == "missing-semicolons"));
        assert!(findings
            .issues
            .iter()
            .any(|i| i.rule == "using-namespace-std"));
    }

    #[test]
    fn test_idiom_counts() {
        let code = "for (auto& item : items) { if (item == nullptr) {} }";
        let total: usize = idioms().iter().map(|i| i.count(code)).sum();
        assert_eq!(total, 3);
    }
}
