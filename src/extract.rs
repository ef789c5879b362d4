//! Routine extraction: find function/method signatures and their bodies.
//!
//! Extraction is lexical. Signatures are matched with per-language regexes and
//! bodies are located by brace balancing or, for Python, by indentation.
//! A snippet with no recognizable routine yields an empty list, never an error.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::detect::lexical::{indent_width, line_of_offset};
use crate::language::Language;

lazy_static! {
    static ref JS_FUNCTION: Regex =
        Regex::new(r"\bfunction\s*\*?\s*(\w+)\s*\(([^)]*)\)").unwrap();
    static ref JS_ARROW: Regex = Regex::new(
        r"\b(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s+)?(?:\(([^)]*)\)|(\w+))\s*=>"
    )
    .unwrap();
    static ref PY_DEF: Regex = Regex::new(
        r"(?m)^([ \t]*)(?:async\s+)?def\s+(\w+)\s*\(([^)]*)\)\s*(?:->\s*([^:\n]+?))?\s*:"
    )
    .unwrap();
    static ref JAVA_METHOD: Regex = Regex::new(
        r"(?:public|private|protected)\s+(?:(?:static|final|synchronized|abstract)\s+)*([\w<>\[\],]+)\s+(\w+)\s*\(([^)]*)\)"
    )
    .unwrap();
    static ref PHP_FUNCTION: Regex = Regex::new(
        r"function\s+&?\s*(\w+)\s*\(([^)]*)\)(?:\s*:\s*\??([\w\\]+))?"
    )
    .unwrap();
    static ref CPP_FUNCTION: Regex = Regex::new(
        r"(?m)^[ \t]*(?:(?:static|inline|virtual|constexpr|explicit)\s+)*([\w:<>]+(?:\s*[*&]+\s*|\s+))(\w+)\s*\(([^)]*)\)\s*(?:const\s*)?(?:noexcept\s*)?(?:override\s*)?\{"
    )
    .unwrap();
    static ref CSHARP_METHOD: Regex = Regex::new(
        r"(?:public|private|protected|internal)\s+(?:(?:static|async|virtual|override|sealed|abstract)\s+)*([\w<>\[\]?,]+)\s+(\w+)\s*\(([^)]*)\)"
    )
    .unwrap();
    static ref IDENT: Regex = Regex::new(r"[A-Za-z_]\w*").unwrap();
}

/// Words that look like a return type or name but introduce statements.
const CPP_NON_ROUTINE: &[&str] = &[
    "if", "for", "while", "switch", "return", "catch", "else", "new", "delete", "throw", "case",
];

/// Parameter modifiers that are not part of the type.
const PARAM_MODIFIERS: &[&str] = &["final", "params", "ref", "out", "in", "this", "const"];

/// A routine parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Declared type, when the language or the code states one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
}

impl Parameter {
    fn new(name: impl Into<String>, type_hint: Option<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: type_hint.filter(|t| !t.is_empty()),
        }
    }
}

/// A routine found in a snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// Declared return type, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_kind: Option<String>,
    /// Body text without the enclosing delimiters.
    #[serde(skip)]
    pub body: String,
    /// 1-based line of the signature.
    pub line: usize,
}

impl Routine {
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Whether the body contains a `return` statement.
    pub fn returns_value(&self) -> bool {
        self.body.contains("return")
    }
}

/// All routines in the snippet, in source order.
pub fn extract_all(code: &str, language: Language) -> Vec<Routine> {
    match language {
        Language::JavaScript => javascript(code),
        Language::Python => python(code),
        Language::Java => typed_methods(code, &JAVA_METHOD),
        Language::Php => php(code),
        Language::Cpp => cpp(code),
        Language::CSharp => typed_methods(code, &CSHARP_METHOD),
    }
}

/// The first routine in the snippet, or `None` when nothing matches.
pub fn extract_first(code: &str, language: Language) -> Option<Routine> {
    extract_all(code, language).into_iter().next()
}

fn javascript(code: &str) -> Vec<Routine> {
    let mut found: Vec<(usize, Routine)> = Vec::new();

    for caps in JS_FUNCTION.captures_iter(code) {
        let whole = whole_match(&caps);
        found.push((
            whole.0,
            Routine {
                name: caps[1].to_string(),
                parameters: untyped_params(&caps[2]),
                return_kind: None,
                body: brace_body(code, whole.1),
                line: line_of_offset(code, whole.0),
            },
        ));
    }

    for caps in JS_ARROW.captures_iter(code) {
        let whole = whole_match(&caps);
        let params = match (caps.get(2), caps.get(3)) {
            (Some(list), _) => untyped_params(list.as_str()),
            (None, Some(single)) => vec![Parameter::new(single.as_str(), None)],
            (None, None) => Vec::new(),
        };
        found.push((
            whole.0,
            Routine {
                name: caps[1].to_string(),
                parameters: params,
                return_kind: None,
                body: arrow_body(code, whole.1),
                line: line_of_offset(code, whole.0),
            },
        ));
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, r)| r).collect()
}

fn python(code: &str) -> Vec<Routine> {
    PY_DEF
        .captures_iter(code)
        .map(|caps| {
            let whole = whole_match(&caps);
            let def_indent = indent_width(&caps[1]);
            let mut parameters = python_params(&caps[3]);
            if parameters
                .first()
                .map(|p| p.name == "self" || p.name == "cls")
                .unwrap_or(false)
            {
                parameters.remove(0);
            }
            Routine {
                name: caps[2].to_string(),
                parameters,
                return_kind: caps.get(4).map(|m| m.as_str().trim().to_string()),
                body: indented_body(code, whole.1, def_indent),
                line: line_of_offset(code, whole.0),
            }
        })
        .collect()
}

fn typed_methods(code: &str, re: &Regex) -> Vec<Routine> {
    re.captures_iter(code)
        .map(|caps| {
            let whole = whole_match(&caps);
            Routine {
                name: caps[2].to_string(),
                parameters: typed_params(&caps[3]),
                return_kind: Some(caps[1].trim().to_string()),
                body: brace_body(code, whole.1),
                line: line_of_offset(code, whole.0),
            }
        })
        .collect()
}

fn php(code: &str) -> Vec<Routine> {
    PHP_FUNCTION
        .captures_iter(code)
        .map(|caps| {
            let whole = whole_match(&caps);
            Routine {
                name: caps[1].to_string(),
                parameters: php_params(&caps[2]),
                return_kind: caps.get(3).map(|m| m.as_str().to_string()),
                body: brace_body(code, whole.1),
                line: line_of_offset(code, whole.0),
            }
        })
        .collect()
}

fn cpp(code: &str) -> Vec<Routine> {
    CPP_FUNCTION
        .captures_iter(code)
        .filter(|caps| {
            let return_type = caps[1].trim();
            !CPP_NON_ROUTINE.contains(&return_type) && !CPP_NON_ROUTINE.contains(&&caps[2])
        })
        .map(|caps| {
            let whole = whole_match(&caps);
            // The match ends just past the opening brace.
            let open = whole.1.saturating_sub(1);
            Routine {
                name: caps[2].to_string(),
                parameters: typed_params(&caps[3]),
                return_kind: Some(caps[1].trim().to_string()),
                body: brace_body(code, open),
                line: line_of_offset(code, whole.0),
            }
        })
        .collect()
}

fn whole_match(caps: &Captures<'_>) -> (usize, usize) {
    caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0))
}

/// Split a parameter list on commas outside of brackets and generics.
pub(crate) fn split_params(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;
    for (i, ch) in list.char_indices() {
        match ch {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => depth -= 1,
            ',' if depth <= 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Strip a `= default` suffix.
fn without_default(param: &str) -> &str {
    param.split('=').next().unwrap_or(param).trim()
}

fn untyped_params(list: &str) -> Vec<Parameter> {
    split_params(list)
        .into_iter()
        .filter_map(|p| {
            let p = without_default(p).trim_start_matches("...");
            IDENT.find(p).map(|m| Parameter::new(m.as_str(), None))
        })
        .collect()
}

fn python_params(list: &str) -> Vec<Parameter> {
    split_params(list)
        .into_iter()
        .filter_map(|p| {
            let p = without_default(p).trim_start_matches('*');
            let (name, annotation) = match p.split_once(':') {
                Some((n, a)) => (n.trim(), Some(a.trim().to_string())),
                None => (p.trim(), None),
            };
            if name.is_empty() || name == "/" {
                return None;
            }
            Some(Parameter::new(name, annotation))
        })
        .collect()
}

fn typed_params(list: &str) -> Vec<Parameter> {
    split_params(list)
        .into_iter()
        .filter_map(|p| {
            let p = without_default(p).trim_end_matches("[]");
            let names: Vec<&str> = IDENT.find_iter(p).map(|m| m.as_str()).collect();
            let name = *names.last()?;
            let name_start = p.rfind(name).unwrap_or(0);
            let type_part: Vec<&str> = p[..name_start]
                .split_whitespace()
                .filter(|t| !PARAM_MODIFIERS.contains(t))
                .collect();
            let type_hint = type_part
                .join(" ")
                .trim_end_matches(['&', '*'])
                .trim()
                .to_string();
            if type_hint.is_empty() && name == "void" {
                return None;
            }
            Some(Parameter::new(name, Some(type_hint)))
        })
        .collect()
}

fn php_params(list: &str) -> Vec<Parameter> {
    split_params(list)
        .into_iter()
        .filter_map(|p| {
            let p = without_default(p);
            let dollar = p.find('$')?;
            let name = IDENT.find(&p[dollar + 1..])?.as_str();
            let type_hint = p[..dollar]
                .split_whitespace()
                .filter(|t| !matches!(*t, "public" | "private" | "protected" | "readonly"))
                .last()
                .map(|t| t.trim_start_matches('?').trim_end_matches(['&', '.']).to_string());
            Some(Parameter::new(name, type_hint))
        })
        .collect()
}

/// Text between the first `{` at or after `from` and its matching `}`.
/// A `;` before any `{` means a declaration without a body.
fn brace_body(code: &str, from: usize) -> String {
    let rest = match code.get(from..) {
        Some(r) => r,
        None => return String::new(),
    };
    let open = match rest.find(['{', ';']) {
        Some(i) if rest.as_bytes()[i] == b'{' => i,
        _ => return String::new(),
    };

    let mut depth = 0usize;
    for (i, ch) in rest[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return rest[open + 1..open + i].to_string();
                }
            }
            _ => {}
        }
    }
    rest[open + 1..].to_string()
}

/// Body of an arrow function: a braced block, or the expression up to the
/// end of the statement.
fn arrow_body(code: &str, from: usize) -> String {
    let rest = code.get(from..).unwrap_or("");
    if rest.trim_start().starts_with('{') {
        return brace_body(code, from);
    }
    let end = rest.find([';', '\n']).unwrap_or(rest.len());
    // An expression body is an implicit return.
    format!("return {}", rest[..end].trim())
}

/// Lines after the signature that are indented deeper than it.
fn indented_body(code: &str, from: usize, def_indent: usize) -> String {
    let rest = code.get(from..).unwrap_or("");
    let mut lines = rest.split('\n');
    // Remainder of the signature line; a one-line body lives here.
    let inline = lines.next().unwrap_or("").trim();
    let mut body: Vec<&str> = Vec::new();
    if !inline.is_empty() {
        body.push(inline);
    }
    for line in lines {
        if line.trim().is_empty() {
            body.push(line);
            continue;
        }
        if indent_width(line) <= def_indent {
            break;
        }
        body.push(line);
    }
    body.join("\n").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_javascript_function_and_arrow() {
        let code = "const add = (a, b = 2) => a + b;\nfunction greet(name, ...rest) {\n  return `hi ${name}`;\n}\n";
        let routines = extract_all(code, Language::JavaScript);
        assert_eq!(routines.len(), 2);
        assert_eq!(routines[0].name, "add");
        assert_eq!(routines[0].parameter_names(), vec!["a", "b"]);
        assert_eq!(routines[0].body, "return a + b");
        assert_eq!(routines[1].name, "greet");
        assert_eq!(routines[1].parameter_names(), vec!["name", "rest"]);
        assert!(routines[1].returns_value());
        assert_eq!(routines[1].line, 2);
    }

    #[test]
    fn test_python_drops_self_and_reads_annotations() {
        let code = "class A:\n    def total(self, items: list, tax=0.2) -> float:\n        s = sum(items)\n        return s\n\n    def other(self):\n        pass\n";
        let routine = extract_first(code, Language::Python).unwrap();
        assert_eq!(routine.name, "total");
        assert_eq!(routine.parameter_names(), vec!["items", "tax"]);
        assert_eq!(routine.parameters[0].type_hint.as_deref(), Some("list"));
        assert_eq!(routine.return_kind.as_deref(), Some("float"));
        assert!(routine.body.contains("return s"));
        assert!(!routine.body.contains("def other"));
    }

    #[test]
    fn test_java_typed_parameters() {
        let code = "public class Calc {\n    public static int sum(final int a, Map<String, Integer> weights) {\n        return a;\n    }\n}";
        let routine = extract_first(code, Language::Java).unwrap();
        assert_eq!(routine.name, "sum");
        assert_eq!(routine.return_kind.as_deref(), Some("int"));
        assert_eq!(routine.parameters[0].type_hint.as_deref(), Some("int"));
        assert_eq!(
            routine.parameters[1].type_hint.as_deref(),
            Some("Map<String, Integer>")
        );
        assert_eq!(routine.body.trim(), "return a;");
    }

    #[test]
    fn test_php_parameters() {
        let code = "<?php\nfunction find(?int $userId, array $opts = []): ?array {\n    return null;\n}\n";
        let routine = extract_first(code, Language::Php).unwrap();
        assert_eq!(routine.parameter_names(), vec!["userId", "opts"]);
        assert_eq!(routine.parameters[0].type_hint.as_deref(), Some("int"));
        assert_eq!(routine.return_kind.as_deref(), Some("array"));
    }

    #[test]
    fn test_cpp_skips_control_statements() {
        let code = "int area(const Shape& s, int scale) {\n    if (scale > 0) {\n        return s.w * scale;\n    }\n    return 0;\n}\n";
        let routines = extract_all(code, Language::Cpp);
        assert_eq!(routines.len(), 1);
        assert_eq!(routines[0].name, "area");
        assert_eq!(routines[0].parameters[0].type_hint.as_deref(), Some("Shape"));
        assert!(routines[0].body.contains("return 0;"));
    }

    #[test]
    fn test_csharp_method() {
        let code = "public async Task<bool> IsValid(string email)\n{\n    return true;\n}";
        let routine = extract_first(code, Language::CSharp).unwrap();
        assert_eq!(routine.name, "IsValid");
        assert_eq!(routine.return_kind.as_deref(), Some("Task<bool>"));
        assert_eq!(routine.parameters[0].type_hint.as_deref(), Some("string"));
    }

    #[test]
    fn test_no_routine_is_explicit() {
        assert!(extract_first("x = 1\n", Language::Python).is_none());
        assert!(extract_first("", Language::Cpp).is_none());
    }

    #[test]
    fn test_split_params_respects_generics() {
        assert_eq!(
            split_params("Map<String, Integer> m, int x"),
            vec!["Map<String, Integer> m", "int x"]
        );
        assert!(split_params("  ").is_empty());
    }
}
