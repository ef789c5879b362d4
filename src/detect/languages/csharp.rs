//! C# detectors.

use lazy_static::lazy_static;
use regex::Regex;

use super::{
    report_debug_output, report_missing_error_handling, report_missing_terminators,
    suggest_missing_idioms, ERROR_HANDLING_MIN_LEN,
};
use crate::detect::lexical::find_line_regex;
use crate::detect::{Category, Detector, Emitter, Idiom, Severity, Structure, Suggestion};

lazy_static! {
    static ref CONSOLE_WRITELINE: Regex = Regex::new(r"Console\.WriteLine").unwrap();
    static ref USING_STATEMENT: Regex = Regex::new(r"\busing\s*\(|\busing\s+var\b").unwrap();
    static ref DISPOSABLE: Regex = Regex::new(r"IDisposable|\.Dispose\(\)").unwrap();
    static ref TRY_BLOCK: Regex = Regex::new(r"\btry\s*\{|\btry\s*$").unwrap();
    static ref CATCH_BLOCK: Regex = Regex::new(r"\bcatch\b").unwrap();

    static ref CONTROL: Regex =
        Regex::new(r"\b(?:if|for|foreach|while|switch|catch)\b").unwrap();
    static ref ROUTINES: Regex =
        Regex::new(r"(?:public|private|protected|internal)\s+(?:static\s+|async\s+|virtual\s+|override\s+)*[\w<>\[\]?,]+\s+\w+\s*\(").unwrap();
    static ref CLASSES: Regex = Regex::new(r"\b(?:class|struct|record)\s+\w+").unwrap();

    static ref VAR: Regex = Regex::new(r"\bvar\b").unwrap();
    static ref LAMBDA: Regex = Regex::new(r"=>").unwrap();
    static ref LINQ: Regex = Regex::new(r"\.Where\(|\.Select\(|\.OrderBy\(").unwrap();
    static ref ASYNC_AWAIT: Regex = Regex::new(r"\basync\b|\bawait\b").unwrap();
    static ref NULL_CONDITIONAL: Regex = Regex::new(r"\?\.|\?\[").unwrap();
}

pub fn detectors() -> Vec<Detector> {
    vec![
        Detector::new(
            "missing-semicolons",
            Category::Syntax,
            Severity::Error,
            missing_semicolons,
        ),
        Detector::new(
            "console-writeline",
            Category::Readability,
            Severity::Info,
            console_writeline,
        ),
        Detector::new(
            "missing-error-handling",
            Category::Robustness,
            Severity::Warning,
            missing_error_handling,
        ),
        Detector::new(
            "undisposed-resource",
            Category::Resource,
            Severity::Warning,
            undisposed_resource,
        ),
        Detector::new(
            "unbalanced-try",
            Category::Robustness,
            Severity::Warning,
            unbalanced_try,
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
            name: "var",
            pattern: &VAR,
        },
        Idiom {
            name: "lambda",
            pattern: &LAMBDA,
        },
        Idiom {
            name: "linq",
            pattern: &LINQ,
        },
        Idiom {
            name: "async_await",
            pattern: &ASYNC_AWAIT,
        },
        Idiom {
            name: "null_conditional",
            pattern: &NULL_CONDITIONAL,
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

fn console_writeline(code: &str, out: &mut Emitter<'_>) {
    report_debug_output(code, out, &CONSOLE_WRITELINE, "Console.WriteLine");
}

fn missing_error_handling(code: &str, out: &mut Emitter<'_>) {
    report_missing_error_handling(
        code,
        out,
        ERROR_HANDLING_MIN_LEN,
        "try/catch",
        (
            "int port = int.Parse(value);",
            "try\n{\n    int port = int.Parse(value);\n}\ncatch (FormatException ex)\n{\n    logger.LogError(ex, \"Invalid port\");\n}",
        ),
    );
}

fn undisposed_resource(code: &str, out: &mut Emitter<'_>) {
    if DISPOSABLE.is_match(code) && !USING_STATEMENT.is_match(code) {
        out.issue(
            find_line_regex(code, &DISPOSABLE),
            "Disposable resources not properly managed (use 'using' statements)",
        );
        out.suggest(
            Suggestion::new("Wrap disposable resources in 'using' blocks").with_snippets(
                "var reader = new StreamReader(path);",
                "using (var reader = new StreamReader(path))\n{\n    // use reader\n}",
            ),
        );
    }
}

fn unbalanced_try(code: &str, out: &mut Emitter<'_>) {
    let tries = code
        .lines()
        .filter(|l| TRY_BLOCK.is_match(l.trim_end()))
        .count();
    let catches = CATCH_BLOCK.find_iter(code).count();
    if tries > catches {
        out.issue(
            find_line_regex(code, &TRY_BLOCK),
            "Ensure all exceptions are properly caught",
        );
    }
}

fn modern_idioms(code: &str, out: &mut Emitter<'_>) {
    suggest_missing_idioms(
        code,
        out,
        &idioms(),
        "Consider using modern C# features (var, lambdas, LINQ, async/await, null conditional operators)",
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
    fn test_undisposed_resource() {
        let code = "var r = new StreamReader(p);\nr.Dispose();\n";
        let findings = run(code);
        assert!(findings
            .issues
            .iter()
            .any(|i| i.rule == "undisposed-resource" && i.line == 2));

        let managed = "using (var r = new StreamReader(p))\n{\n    r.Dispose();\n}\n";
        assert!(!run(managed)
            .issues
            .iter()
            .any(|i| i.rule == "undisposed-resource"));
    }

    #[test]
    fn test_allman_braces_do_not_need_semicolons() {
        let code = "public class A\n{\n    public void Run()\n    {\n        Console.WriteLine(\"hi\");\n    }\n}\n";
        let findings = run(code);
        assert!(!findings
            .issues
            .iter()
            .any(|i| i.rule == "missing-semicolons"));
        assert!(findings
            .issues
            .iter()
            .any(|i| i.rule == "console-writeline"));
    }

    #[test]
    fn test_try_without_catch() {
        let code = "try\n{\n    Run();\n}\nfinally\n{\n}\n";
        assert!(run(code).issues.iter().any(|i| i.rule == "unbalanced-try"));
    }
}
