//! Python detectors.

use lazy_static::lazy_static;
use regex::Regex;

use super::{report_debug_output, suggest_missing_idioms};
use crate::detect::lexical::{find_line, find_line_regex, has_try, next_non_blank};
use crate::detect::{Category, Detector, Emitter, Idiom, Severity, Structure, Suggestion};

/// PEP 8 line length limit.
const MAX_LINE_LEN: usize = 79;

lazy_static! {
    static ref BAD_INDENT: Regex = Regex::new(r"^( {1,3}|\t)\w").unwrap();
    static ref PRINT_CALL: Regex = Regex::new(r"\bprint\(").unwrap();
    static ref DEFINITION: Regex = Regex::new(r"^\s*(def|class)\s+(\w+)").unwrap();
    static ref EVAL_CALL: Regex = Regex::new(r"\beval\s*\(").unwrap();
    static ref IMPORT_LINE: Regex =
        Regex::new(r"(?m)^\s*(?:from\s+[\w.]+\s+)?import\s+([\w., ]+?)\s*$").unwrap();

    static ref CONTROL: Regex = Regex::new(r"\b(?:if|for|while|try|with)\b").unwrap();
    static ref ROUTINES: Regex = Regex::new(r"\bdef\s+\w+").unwrap();
    static ref CLASSES: Regex = Regex::new(r"\bclass\s+\w+").unwrap();

    static ref F_STRING: Regex = Regex::new(r#"\bf["']"#).unwrap();
    static ref TYPE_HINT: Regex = Regex::new(r"\)\s*->").unwrap();
    static ref COMPREHENSION: Regex = Regex::new(r"\[[^\]\n]+\bfor\b[^\]\n]+\bin\b").unwrap();
    static ref CONTEXT_MANAGER: Regex = Regex::new(r"\bwith\s+[^\n:]+:").unwrap();
    static ref DATACLASS: Regex = Regex::new(r"@dataclass").unwrap();
}

pub fn detectors() -> Vec<Detector> {
    vec![
        Detector::new("line-too-long", Category::Style, Severity::Info, line_too_long),
        Detector::new(
            "inconsistent-indentation",
            Category::Style,
            Severity::Warning,
            inconsistent_indentation,
        ),
        Detector::new("print-call", Category::Readability, Severity::Info, print_call),
        Detector::new(
            "missing-docstring",
            Category::Documentation,
            Severity::Info,
            missing_docstring,
        ),
        Detector::new(
            "unused-import",
            Category::Performance,
            Severity::Warning,
            unused_import,
        ),
        Detector::new(
            "missing-error-handling",
            Category::Robustness,
            Severity::Warning,
            missing_error_handling,
        ),
        Detector::new("eval-usage", Category::Security, Severity::Error, eval_usage),
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
            name: "f_strings",
            pattern: &F_STRING,
        },
        Idiom {
            name: "type_hints",
            pattern: &TYPE_HINT,
        },
        Idiom {
            name: "comprehensions",
            pattern: &COMPREHENSION,
        },
        Idiom {
            name: "context_managers",
            pattern: &CONTEXT_MANAGER,
        },
        Idiom {
            name: "dataclasses",
            pattern: &DATACLASS,
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

/// Whether a stripped line opens a docstring.
pub(crate) fn is_docstring_start(trimmed: &str) -> bool {
    let unprefixed = trimmed.trim_start_matches(['r', 'R', 'u', 'U']);
    unprefixed.starts_with("\"\"\"") || unprefixed.starts_with("'''")
}

/// Number of docstrings in the snippet.
pub fn docstring_count(code: &str) -> usize {
    let lines: Vec<&str> = code.lines().collect();
    (0..lines.len())
        .filter(|&i| DEFINITION.is_match(lines[i]))
        .filter(|&i| has_docstring(&lines, i))
        .count()
}

fn has_docstring(lines: &[&str], def_idx: usize) -> bool {
    next_non_blank(lines, def_idx)
        .map(|n| is_docstring_start(lines[n].trim()))
        .unwrap_or(false)
}

fn line_too_long(code: &str, out: &mut Emitter<'_>) {
    for (i, line) in code.lines().enumerate() {
        if line.chars().count() > MAX_LINE_LEN {
            out.issue(i + 1, "Line too long (> 79 characters)");
        }
    }
}

fn inconsistent_indentation(code: &str, out: &mut Emitter<'_>) {
    for (i, line) in code.lines().enumerate() {
        if BAD_INDENT.is_match(line) {
            out.issue(i + 1, "Inconsistent indentation (use 4 spaces)");
        }
    }
}

fn print_call(code: &str, out: &mut Emitter<'_>) {
    report_debug_output(code, out, &PRINT_CALL, "print");
}

fn missing_docstring(code: &str, out: &mut Emitter<'_>) {
    let lines: Vec<&str> = code.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = DEFINITION.captures(line) else {
            continue;
        };
        if has_docstring(&lines, i) {
            continue;
        }
        let kind = if &caps[1] == "def" {
            "Function"
        } else {
            "Class"
        };
        out.issue(i + 1, format!("{} '{}' missing docstring", kind, &caps[2]));
    }
}

fn unused_import(code: &str, out: &mut Emitter<'_>) {
    for caps in IMPORT_LINE.captures_iter(code) {
        let Some(names) = caps.get(1) else {
            continue;
        };
        let statement = caps.get(0).map(|m| m.as_str().trim()).unwrap_or_default();
        for name in names.as_str().split(',') {
            let bound = bound_name(name);
            if bound.is_empty() || bound == "*" {
                continue;
            }
            let usage = match Regex::new(&format!(r"\b{}\b", regex::escape(bound))) {
                Ok(re) => re.find_iter(code).count(),
                Err(_) => continue,
            };
            // The import statement itself accounts for one occurrence.
            if usage <= 1 {
                out.issue(
                    find_line(code, statement),
                    format!("Unused import: {}", bound),
                );
                out.suggest(
                    Suggestion::new(format!("Remove unused import '{}'", bound))
                        .with_snippets(statement, format!("# {}", statement)),
                );
            }
        }
    }
}

/// The name an import binds: `a.b as c` binds `c`, `os.path` binds `os`.
fn bound_name(entry: &str) -> &str {
    let entry = entry.trim();
    if let Some((_, alias)) = entry.split_once(" as ") {
        return alias.trim();
    }
    entry.split('.').next().unwrap_or("").trim()
}

fn missing_error_handling(code: &str, out: &mut Emitter<'_>) {
    if has_try(code) || ROUTINES.find_iter(code).count() <= 1 {
        return;
    }
    out.issue(1, "No exception handling found in code");
    out.suggest(
        Suggestion::new("Consider adding try/except blocks for error handling").with_snippets(
            "data = json.loads(payload)",
            "try:\n    data = json.loads(payload)\nexcept ValueError as e:\n    logging.error(\"Invalid payload: %s\", e)",
        ),
    );
}

fn eval_usage(code: &str, out: &mut Emitter<'_>) {
    if EVAL_CALL.is_match(code) {
        out.issue(
            find_line_regex(code, &EVAL_CALL),
            "Use of eval() can execute arbitrary code",
        );
    }
}

fn modern_idioms(code: &str, out: &mut Emitter<'_>) {
    suggest_missing_idioms(
        code,
        out,
        &idioms(),
        "Consider using modern Python features (f-strings, type hints, comprehensions, context managers, dataclasses)",
    );
}
