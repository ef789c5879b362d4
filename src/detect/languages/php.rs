//! PHP detectors.

use lazy_static::lazy_static;
use regex::Regex;

use super::{
    report_debug_output, report_missing_error_handling, report_missing_terminators,
    suggest_missing_idioms, ERROR_HANDLING_MIN_LEN,
};
use crate::detect::lexical::{find_line, find_line_regex};
use crate::detect::{Category, Detector, Emitter, Idiom, Severity, Structure, Suggestion};

lazy_static! {
    static ref ECHO: Regex = Regex::new(r"\becho\b").unwrap();
    static ref ERROR_REPORTING_ALL: Regex =
        Regex::new(r"error_reporting\s*\(\s*E_ALL\s*\)").unwrap();

    /// Deprecated function families, each reported once.
    static ref DEPRECATED: Vec<(&'static str, Regex)> = vec![
        ("mysql_", Regex::new(r"\bmysql_\w+\s*\(").unwrap()),
        ("ereg", Regex::new(r"\beregi?(?:_replace)?\s*\(").unwrap()),
        ("split", Regex::new(r"\bsplit\s*\(").unwrap()),
        ("create_function", Regex::new(r"\bcreate_function\s*\(").unwrap()),
    ];

    static ref CONTROL: Regex =
        Regex::new(r"\b(?:if|for|foreach|while|switch|catch)\b").unwrap();
    static ref ROUTINES: Regex = Regex::new(r"\bfunction\s+\w+\s*\(").unwrap();
    static ref CLASSES: Regex = Regex::new(r"\bclass\s+\w+").unwrap();

    static ref STRICT_TYPES: Regex = Regex::new(r"declare\s*\(\s*strict_types").unwrap();
    static ref ARROW_FN: Regex = Regex::new(r"\bfn\s*\(").unwrap();
    static ref NULL_COALESCING: Regex = Regex::new(r"\?\?").unwrap();
    static ref NULLSAFE: Regex = Regex::new(r"\?->").unwrap();
    static ref MATCH_EXPR: Regex = Regex::new(r"\bmatch\s*\(").unwrap();
}

pub fn detectors() -> Vec<Detector> {
    vec![
        Detector::new(
            "missing-semicolons",
            Category::Syntax,
            Severity::Error,
            missing_semicolons,
        ),
        Detector::new("echo", Category::Readability, Severity::Info, echo),
        Detector::new(
            "missing-error-handling",
            Category::Robustness,
            Severity::Warning,
            missing_error_handling,
        ),
        Detector::new(
            "sql-injection",
            Category::Security,
            Severity::Critical,
            sql_injection,
        ),
        Detector::new(
            "deprecated-function",
            Category::Modernization,
            Severity::Warning,
            deprecated_functions,
        ),
        Detector::new(
            "error-reporting-exposed",
            Category::Security,
            Severity::Warning,
            error_reporting_exposed,
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
            name: "strict_types",
            pattern: &STRICT_TYPES,
        },
        Idiom {
            name: "arrow_functions",
            pattern: &ARROW_FN,
        },
        Idiom {
            name: "null_coalescing",
            pattern: &NULL_COALESCING,
        },
        Idiom {
            name: "nullsafe_operator",
            pattern: &NULLSAFE,
        },
        Idiom {
            name: "match_expression",
            pattern: &MATCH_EXPR,
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

fn echo(code: &str, out: &mut Emitter<'_>) {
    let count = ECHO.find_iter(code).count();
    if count > 0 {
        out.issue(
            find_line_regex(code, &ECHO),
            format!("Found {} echo statements", count),
        );
    }
}

fn missing_error_handling(code: &str, out: &mut Emitter<'_>) {
    report_missing_error_handling(
        code,
        out,
        ERROR_HANDLING_MIN_LEN,
        "try/catch",
        (
            "$data = json_decode($body, true);",
            "try {\n    $data = json_decode($body, true, 512, JSON_THROW_ON_ERROR);\n} catch (JsonException $e) {\n    error_log($e->getMessage());\n}",
        ),
    );
}

fn sql_injection(code: &str, out: &mut Emitter<'_>) {
    let queries = code.contains("mysql_query") || code.contains("mysqli_query");
    if !queries || code.contains("prepare") || code.contains("bindParam") {
        return;
    }
    let line = if code.contains("mysql_query") {
        find_line(code, "mysql_query")
    } else {
        find_line(code, "mysqli_query")
    };
    out.issue(
        line,
        "Potential SQL injection vulnerability (use prepared statements)",
    );
    out.suggest(
        Suggestion::new("Use prepared statements to prevent SQL injection").with_snippets(
            "$result = mysqli_query($conn, \"SELECT * FROM users WHERE id = $id\");",
            "$stmt = $conn->prepare(\"SELECT * FROM users WHERE id = ?\");\n$stmt->bind_param(\"s\", $id);\n$stmt->execute();\n$result = $stmt->get_result();",
        ),
    );
}

fn deprecated_functions(code: &str, out: &mut Emitter<'_>) {
    for (family, re) in DEPRECATED.iter() {
        if re.is_match(code) {
            out.issue(
                find_line_regex(code, re),
                format!("Deprecated function used: {}", family),
            );
        }
    }
}

fn error_reporting_exposed(code: &str, out: &mut Emitter<'_>) {
    if ERROR_REPORTING_ALL.is_match(code) {
        out.issue(
            find_line_regex(code, &ERROR_REPORTING_ALL),
            "error_reporting(E_ALL) may expose internals in production",
        );
        out.suggest(Suggestion::new(
            "Log errors instead of displaying them in production (display_errors = Off)",
        ));
    }
}

fn modern_idioms(code: &str, out: &mut Emitter<'_>) {
    suggest_missing_idioms(
        code,
        out,
        &idioms(),
        "Consider using modern PHP features (strict types, arrow functions, null coalescing, match expressions)",
    );
}
