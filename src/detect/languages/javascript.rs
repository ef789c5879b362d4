//! JavaScript detectors.

use lazy_static::lazy_static;
use regex::Regex;

use super::{
    report_debug_output, report_missing_error_handling, report_missing_terminators,
    suggest_missing_idioms,
};
use crate::detect::lexical::find_line_regex;
use crate::detect::{Category, Detector, Emitter, Idiom, Severity, Structure, Suggestion};

/// JavaScript reports missing error handling earlier than the other languages.
const ERROR_HANDLING_MIN_LEN: usize = 100;

lazy_static! {
    static ref CONSOLE_LOG: Regex = Regex::new(r"console\.log\(").unwrap();
    static ref VAR_KEYWORD: Regex = Regex::new(r"\bvar\b").unwrap();
    static ref VAR_STATEMENT: Regex = Regex::new(r"\bvar\s+\w+\s*=[^;\n]*;?").unwrap();
    static ref ADD_LISTENER: Regex = Regex::new(r"addEventListener\(").unwrap();
    static ref REMOVE_LISTENER: Regex = Regex::new(r"removeEventListener\(").unwrap();
    static ref EVAL_CALL: Regex = Regex::new(r"\beval\s*\(").unwrap();

    static ref CONTROL: Regex = Regex::new(r"\b(?:if|for|while|switch|catch)\b").unwrap();
    static ref ROUTINES: Regex = Regex::new(r"\bfunction\b|\s=>\s").unwrap();
    static ref CLASSES: Regex = Regex::new(r"\bclass\s+\w+").unwrap();

    static ref ARROW: Regex = Regex::new(r"=>").unwrap();
    static ref TEMPLATE_LITERAL: Regex = Regex::new(r"`").unwrap();
    static ref DESTRUCTURING: Regex = Regex::new(r"\b(?:const|let|var)\s*[\[{]").unwrap();
    static ref SPREAD: Regex = Regex::new(r"\.\.\.").unwrap();
    static ref ASYNC_AWAIT: Regex = Regex::new(r"\basync\b|\bawait\b").unwrap();
}

pub fn detectors() -> Vec<Detector> {
    vec![
        Detector::new(
            "missing-semicolons",
            Category::Style,
            Severity::Warning,
            missing_semicolons,
        ),
        Detector::new(
            "console-log",
            Category::Readability,
            Severity::Info,
            console_log,
        ),
        Detector::new(
            "var-declaration",
            Category::Modernization,
            Severity::Warning,
            var_declaration,
        ),
        Detector::new(
            "missing-error-handling",
            Category::Robustness,
            Severity::Warning,
            missing_error_handling,
        ),
        Detector::new(
            "listener-leak",
            Category::Performance,
            Severity::Warning,
            listener_leak,
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
            name: "arrow_functions",
            pattern: &ARROW,
        },
        Idiom {
            name: "template_literals",
            pattern: &TEMPLATE_LITERAL,
        },
        Idiom {
            name: "destructuring",
            pattern: &DESTRUCTURING,
        },
        Idiom {
            name: "spread_operator",
            pattern: &SPREAD,
        },
        Idiom {
            name: "async_await",
            pattern: &ASYNC_AWAIT,
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

fn console_log(code: &str, out: &mut Emitter<'_>) {
    report_debug_output(code, out, &CONSOLE_LOG, "console.log");
}

fn var_declaration(code: &str, out: &mut Emitter<'_>) {
    let count = VAR_KEYWORD.find_iter(code).count();
    if count == 0 {
        return;
    }
    out.issue(
        find_line_regex(code, &VAR_KEYWORD),
        format!("Using 'var' instead of 'const' or 'let' ({} occurrences)", count),
    );

    let suggestion = Suggestion::new(
        "Replace 'var' with 'const' for variables that don't change, or 'let' for variables that do",
    );
    let suggestion = match VAR_STATEMENT.find(code) {
        Some(m) => {
            let before = m.as_str().trim().to_string();
            let after = before.replacen("var", "const", 1);
            suggestion.with_snippets(before, after)
        }
        None => suggestion,
    };
    out.suggest(suggestion);
}

fn missing_error_handling(code: &str, out: &mut Emitter<'_>) {
    report_missing_error_handling(
        code,
        out,
        ERROR_HANDLING_MIN_LEN,
        "try/catch",
        (
            "const data = JSON.parse(input);",
            "try {\n  const data = JSON.parse(input);\n} catch (error) {\n  console.error('Error:', error);\n}",
        ),
    );
}

fn listener_leak(code: &str, out: &mut Emitter<'_>) {
    let added = ADD_LISTENER.find_iter(code).count();
    let removed = REMOVE_LISTENER.find_iter(code).count();
    if added > removed {
        out.issue(
            find_line_regex(code, &ADD_LISTENER),
            format!(
                "Potential memory leak: {} event listeners without corresponding removal",
                added - removed
            ),
        );
    }
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
        "Consider using modern JavaScript features (arrow functions, template literals, destructuring, async/await)",
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

    fn rules(findings: &Findings) -> Vec<&str> {
        findings.issues.iter().map(|i| i.rule.as_str()).collect()
    }

    #[test]
    fn test_var_and_console_log() {
        let code = "var total = 0;\nconsole.log(total);\n";
        let findings = run(code);
        let rules = rules(&findings);
        assert!(rules.contains(&"var-declaration"));
        assert!(rules.contains(&"console-log"));

        let var_issue = findings
            .issues
            .iter()
            .find(|i| i.rule == "var-declaration")
            .unwrap();
        assert_eq!(var_issue.category, Category::Modernization);
        assert_eq!(findings.suggestions[0].after, "const total = 0;");
    }

    #[test]
    fn test_missing_semicolons_counted_once() {
        let findings = run("let a = 1\nlet b = 2\n");
        let issue = findings
            .issues
            .iter()
            .find(|i| i.rule == "missing-semicolons")
            .unwrap();
        assert_eq!(issue.line, 1);
        assert!(issue.message.contains("(2 occurrences)"));
    }

    #[test]
    fn test_error_handling_threshold() {
        let short = "let a = JSON.parse(x);";
        assert!(!rules(&run(short)).contains(&"missing-error-handling"));

        let long = format!("{}\n", "let value = JSON.parse(input);\n".repeat(5));
        let findings = run(&long);
        assert!(rules(&findings).contains(&"missing-error-handling"));
    }

    #[test]
    fn test_listener_leak() {
        let code = "el.addEventListener('click', f);\nel.addEventListener('keyup', g);\nel.removeEventListener('click', f);";
        let findings = run(code);
        let leak = findings
            .issues
            .iter()
            .find(|i| i.rule == "listener-leak")
            .unwrap();
        assert!(leak.message.contains("1 event listeners"));
    }

    #[test]
    fn test_modern_code_gets_no_idiom_suggestion() {
        let code = "const load = async () => {\n  const { data } = await fetch(`/api/${id}`);\n  return [...data];\n};\n".repeat(2);
        let findings = run(&code);
        assert!(!findings
            .suggestions
            .iter()
            .any(|s| s.description.contains("modern JavaScript")));
    }
}
