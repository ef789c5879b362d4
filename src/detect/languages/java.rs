//! Java detectors.

use lazy_static::lazy_static;
use regex::Regex;

use super::{
    report_debug_output, report_missing_error_handling, suggest_missing_idioms,
    ERROR_HANDLING_MIN_LEN,
};
use crate::detect::lexical::{find_line, is_braceless_control};
use crate::detect::{Category, Detector, Emitter, Idiom, Severity, Structure, Suggestion};

lazy_static! {
    static ref PRINTLN: Regex = Regex::new(r"System\.out\.println").unwrap();
    static ref NULL_CHECK: Regex = Regex::new(r"!= null|== null").unwrap();
    static ref OBJECT_CREATION: Regex = Regex::new(r"new \w+").unwrap();

    static ref CONTROL: Regex = Regex::new(r"\b(?:if|for|while|switch|catch)\b").unwrap();
    static ref ROUTINES: Regex =
        Regex::new(r"(?:public|private|protected)\s+(?:static\s+)?(?:final\s+)?[\w<>\[\],]+\s+\w+\s*\(").unwrap();
    static ref CLASSES: Regex = Regex::new(r"\bclass\s+\w+").unwrap();

    static ref LOCAL_VAR: Regex = Regex::new(r"\bvar\s+\w+\s*=").unwrap();
    static ref LAMBDA: Regex = Regex::new(r"\)\s*->|\w\s*->").unwrap();
    static ref STREAMS: Regex = Regex::new(r"\.stream\(\)").unwrap();
    static ref TRY_WITH_RESOURCES: Regex = Regex::new(r"\btry\s*\(").unwrap();
    static ref OPTIONAL: Regex = Regex::new(r"\bOptional<").unwrap();
}

pub fn detectors() -> Vec<Detector> {
    vec![
        Detector::new(
            "braceless-control",
            Category::Style,
            Severity::Warning,
            braceless_control,
        ),
        Detector::new("println", Category::Readability, Severity::Info, println),
        Detector::new(
            "missing-error-handling",
            Category::Robustness,
            Severity::Warning,
            missing_error_handling,
        ),
        Detector::new(
            "unclosed-stream",
            Category::Resource,
            Severity::Error,
            unclosed_stream,
        ),
        Detector::new(
            "insufficient-null-checks",
            Category::Robustness,
            Severity::Warning,
            insufficient_null_checks,
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
            pattern: &LOCAL_VAR,
        },
        Idiom {
            name: "lambdas",
            pattern: &LAMBDA,
        },
        Idiom {
            name: "streams",
            pattern: &STREAMS,
        },
        Idiom {
            name: "try_with_resources",
            pattern: &TRY_WITH_RESOURCES,
        },
        Idiom {
            name: "optional",
            pattern: &OPTIONAL,
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

fn braceless_control(code: &str, out: &mut Emitter<'_>) {
    let lines: Vec<&str> = code.lines().collect();
    let found: Vec<usize> = (0..lines.len())
        .filter(|&i| is_braceless_control(&lines, i))
        .collect();
    if let Some(&first) = found.first() {
        out.issue(
            first + 1,
            format!(
                "Control statements without braces ({} occurrences)",
                found.len()
            ),
        );
    }
}

fn println(code: &str, out: &mut Emitter<'_>) {
    report_debug_output(code, out, &PRINTLN, "System.out.println");
}

fn missing_error_handling(code: &str, out: &mut Emitter<'_>) {
    report_missing_error_handling(
        code,
        out,
        ERROR_HANDLING_MIN_LEN,
        "try/catch",
        (
            "int port = Integer.parseInt(value);",
            "try {\n    int port = Integer.parseInt(value);\n} catch (NumberFormatException e) {\n    logger.error(\"Invalid port\", e);\n}",
        ),
    );
}

fn unclosed_stream(code: &str, out: &mut Emitter<'_>) {
    if code.contains("new FileInputStream")
        && !TRY_WITH_RESOURCES.is_match(code)
        && !code.contains("close()")
    {
        out.issue(
            find_line(code, "new FileInputStream"),
            "Resources not properly closed (use try-with-resources)",
        );
        out.suggest(
            Suggestion::new("Use try-with-resources so streams are closed automatically")
                .with_snippets(
                    "FileInputStream in = new FileInputStream(path);",
                    "try (FileInputStream in = new FileInputStream(path)) {\n    // use in\n}",
                ),
        );
    }
}

fn insufficient_null_checks(code: &str, out: &mut Emitter<'_>) {
    let checks = NULL_CHECK.find_iter(code).count();
    let creations = OBJECT_CREATION.find_iter(code).count();
    if (checks as f64) < creations as f64 / 3.0 {
        out.issue(1, "Potential null pointer exceptions (insufficient null checks)");
    }
}

fn modern_idioms(code: &str, out: &mut Emitter<'_>) {
    suggest_missing_idioms(
        code,
        out,
        &idioms(),
        "Consider using modern Java features (var, lambdas, streams, try-with-resources, Optional)",
    );
}
