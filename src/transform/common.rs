//! Rewrite stages shared across languages.

use lazy_static::lazy_static;
use phf::phf_map;
use regex::{Captures, Regex};

use crate::detect::lexical::{
    close_paren_end, has_try, indent_width, is_block_header, is_braceless_control, leading_ws,
    needs_terminator, next_non_blank,
};

/// Common misspellings corrected as whole words.
static TYPOS: phf::Map<&'static str, &'static str> = phf_map! {
    "lenght" => "length",
    "funciton" => "function",
    "retrun" => "return",
    "ture" => "true",
    "flase" => "false",
    "widht" => "width",
    "heigth" => "height",
    "reciever" => "receiver",
    "recieve" => "receive",
    "seperate" => "separate",
    "occured" => "occurred",
    "improt" => "import",
    "pritn" => "print",
};

lazy_static! {
    static ref TYPO_WORD: Regex = {
        let mut words: Vec<&str> = TYPOS.keys().copied().collect();
        words.sort_unstable();
        Regex::new(&format!(r"\b(?:{})\b", words.join("|"))).unwrap()
    };
    static ref OPERATOR_ASSIGN: Regex = Regex::new(r"(\w+)([+\-*/]?=)([\w$]+)").unwrap();
    static ref COMMA_TIGHT: Regex = Regex::new(r",(\S)").unwrap();
    static ref TYPE_DECLARATION: Regex =
        Regex::new(r"\b(?:class|interface|namespace|struct|enum|record)\b").unwrap();
}

/// Minimum code length before an unguarded error-prone call gets wrapped.
pub const WRAP_MIN_LEN: usize = 200;

/// Whether a misspelling from the dictionary appears in the code.
pub fn has_typos(code: &str) -> bool {
    TYPO_WORD.is_match(code)
}

/// Replace dictionary misspellings.
pub fn fix_typos(code: &str) -> String {
    TYPO_WORD
        .replace_all(code, |caps: &Captures<'_>| {
            TYPOS.get(&caps[0]).copied().unwrap_or(&caps[0]).to_string()
        })
        .into_owned()
}

/// Append `;` to every statement line that lacks one.
pub fn add_terminators(code: &str) -> String {
    let lines: Vec<&str> = code.split('\n').collect();
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if needs_terminator(&lines, i) {
                format!("{};", line.trim_end())
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Re-indent lines using 1-3 spaces or tabs to the next multiple of four.
pub fn normalize_indentation(code: &str) -> String {
    code.split('\n')
        .map(|line| {
            let ws = leading_ws(line);
            if ws.is_empty() || line.trim().is_empty() {
                return line.to_string();
            }
            let width = indent_width(line);
            if width % 4 == 0 && !ws.contains('\t') {
                return line.to_string();
            }
            let normalized = width.div_ceil(4) * 4;
            format!("{}{}", " ".repeat(normalized), line.trim_start())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a line into alternating code and string-literal segments.
/// Returns `(is_literal, text)` pairs covering the whole line.
pub(crate) fn literal_segments(line: &str) -> Vec<(bool, &str)> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, ch) in line.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == q {
                    let end = i + ch.len_utf8();
                    segments.push((true, &line[start..end]));
                    start = end;
                    quote = None;
                }
            }
            None => {
                if ch == '"' || ch == '\'' || ch == '`' {
                    if start < i {
                        segments.push((false, &line[start..i]));
                    }
                    start = i;
                    quote = Some(ch);
                }
            }
        }
    }
    if start < line.len() {
        segments.push((quote.is_some(), &line[start..]));
    }
    segments
}

/// Apply `rewrite` to the code portions of every line, leaving string
/// literals untouched.
pub(crate) fn rewrite_outside_literals(code: &str, rewrite: impl Fn(&str) -> String) -> String {
    code.split('\n')
        .map(|line| {
            literal_segments(line)
                .into_iter()
                .map(|(literal, text)| {
                    if literal {
                        text.to_string()
                    } else {
                        rewrite(text)
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `a=b` to `a = b` (also `+=`, `-=`, `*=`, `/=`), outside string literals.
pub fn space_operators(code: &str) -> String {
    rewrite_outside_literals(code, |text| {
        OPERATOR_ASSIGN.replace_all(text, "$1 $2 $3").into_owned()
    })
}

/// `a,b` to `a, b`, outside string literals.
pub fn space_commas(code: &str) -> String {
    rewrite_outside_literals(code, |text| COMMA_TIGHT.replace_all(text, ", $1").into_owned())
}

/// Operator and comma spacing for brace-delimited languages.
pub fn space_all(code: &str) -> String {
    space_commas(&space_operators(code))
}

/// Number of `if`/`for`/`while` statements with unbraced bodies.
pub fn braceless_count(code: &str) -> usize {
    let lines: Vec<&str> = code.split('\n').collect();
    (0..lines.len())
        .filter(|&i| is_braceless_control(&lines, i))
        .count()
}

/// Wrap single-statement `if`/`for`/`while` bodies in braces.
///
/// A header whose body is itself a braceless header waits until the inner
/// one is braced, so passes repeat while they keep unblocking headers.
pub fn brace_control_bodies(code: &str) -> String {
    let mut text = code.to_string();
    let mut remaining = braceless_count(&text);
    while remaining > 0 {
        let next = brace_pass(&text);
        if next == text {
            break;
        }
        let left = braceless_count(&next);
        text = next;
        if left >= remaining {
            break;
        }
        remaining = left;
    }
    text
}

fn brace_pass(code: &str) -> String {
    let lines: Vec<&str> = code.split('\n').collect();
    let targets: Vec<usize> = (0..lines.len())
        .filter(|&i| is_braceless_control(&lines, i))
        .collect();
    let mut out: Vec<String> = lines.iter().map(|l| l.to_string()).collect();

    for &i in targets.iter().rev() {
        let line = lines[i];
        let Some(header_end) = close_paren_end(line) else {
            continue;
        };
        let header = line[..header_end].trim_end();
        let rest = line[header_end..].trim();
        if !rest.is_empty() {
            out[i] = format!("{} {{ {} }}", header, rest);
            continue;
        }
        let Some(body) = next_non_blank(&lines, i) else {
            continue;
        };
        if is_braceless_control(&lines, body) || lines[body].trim_end().ends_with('{') {
            continue;
        }
        out[i] = format!("{} {{", header);
        out.insert(body + 1, format!("{}}}", leading_ws(line)));
    }
    out.join("\n")
}

/// How an error-prone line gets wrapped. Receives the line's indentation and
/// the trimmed statement.
pub type WrapFn = fn(indent: &str, statement: &str) -> String;

/// Wrap the first line calling the first error-prone primitive found, when
/// the code has no exception handling and is long enough to warrant it.
pub fn wrap_first_error_prone(code: &str, primitives: &[&str], wrap: WrapFn) -> String {
    if has_try(code) || code.len() <= WRAP_MIN_LEN {
        return code.to_string();
    }
    let Some(primitive) = primitives.iter().find(|p| code.contains(*p)) else {
        return code.to_string();
    };

    let mut lines: Vec<String> = code.split('\n').map(str::to_string).collect();
    let target = lines.iter().position(|line| {
        let trimmed = line.trim();
        line.contains(primitive)
            && !trimmed.starts_with("//")
            && !trimmed.starts_with('#')
            && !trimmed.ends_with('{')
            && !trimmed.ends_with(':')
            && !is_block_header(trimmed)
    });
    if let Some(i) = target {
        let indent = leading_ws(&lines[i]).to_string();
        let statement = lines[i].trim().to_string();
        lines[i] = wrap(&indent, &statement);
    }
    lines.join("\n")
}

/// Index one past the last line of the statement group that follows
/// `lines[start]`: consecutive non-blank lines indented at least as far as
/// `start`, stopping at a dedent or a closing brace. Braces opened inside the
/// group must close inside it, otherwise `None`.
pub fn statement_group_end(lines: &[&str], start: usize) -> Option<usize> {
    let base = indent_width(lines[start]);
    let mut depth: i64 = 0;
    let mut end = start + 1;
    while end < lines.len() {
        let line = lines[end];
        let trimmed = line.trim();
        if depth == 0 && (trimmed.is_empty() || indent_width(line) < base || trimmed.starts_with('}')) {
            break;
        }
        depth += line.matches('{').count() as i64 - line.matches('}').count() as i64;
        if depth < 0 {
            return None;
        }
        end += 1;
    }
    (depth == 0).then_some(end)
}

/// Re-indent a line four columns deeper.
pub fn indent_more(line: &str) -> String {
    if line.trim().is_empty() {
        line.to_string()
    } else {
        format!("    {}", line)
    }
}

/// Whether `lines[idx]` sits inside a routine body rather than directly in a
/// class, namespace or similar declaration body. Top-level lines count as
/// routine bodies.
pub fn in_routine_body(lines: &[&str], idx: usize) -> bool {
    let mut balance: i64 = 0;
    for i in (0..idx).rev() {
        let line = lines[i];
        balance += line.matches('}').count() as i64 - line.matches('{').count() as i64;
        if balance < 0 {
            let mut header = line.trim();
            if header == "{" {
                header = next_non_blank_before(lines, i).map(|h| lines[h].trim()).unwrap_or("");
            }
            return !TYPE_DECLARATION.is_match(header);
        }
    }
    true
}

fn next_non_blank_before(lines: &[&str], idx: usize) -> Option<usize> {
    (0..idx).rev().find(|&i| !lines[i].trim().is_empty())
}

/// Insert `line` after the last line matching `anchor`, or at the top when
/// nothing matches.
pub fn insert_after_last(code: &str, anchor: impl Fn(&str) -> bool, line: &str) -> String {
    let mut lines: Vec<&str> = code.split('\n').collect();
    let at = lines
        .iter()
        .rposition(|l| anchor(l.trim()))
        .map(|i| i + 1)
        .unwrap_or(0);
    lines.insert(at, line);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typos_are_whole_words() {
        assert_eq!(fix_typos("arr.lenght > 0"), "arr.length > 0");
        assert_eq!(fix_typos("future capture"), "future capture");
        assert_eq!(fix_typos("x = ture"), "x = true");
    }

    #[test]
    fn test_add_terminators_is_idempotent() {
        let code = "let a = 1\nif (a)\n{\n  run()\n}\n";
        let once = add_terminators(code);
        assert_eq!(once, "let a = 1;\nif (a)\n{\n  run();\n}\n");
        assert_eq!(add_terminators(&once), once);
    }

    #[test]
    fn test_spacing_skips_string_literals() {
        let code = "url=base+\"?a=1,b=2\";f(a,b)";
        assert_eq!(space_all(code), "url = base+\"?a=1,b=2\";f(a, b)");
    }

    #[test]
    fn test_spacing_leaves_comparisons() {
        let code = "if (a==b && c<=d && e!=f) x+=1;";
        assert_eq!(space_operators(code), "if (a==b && c<=d && e!=f) x += 1;");
    }

    #[test]
    fn test_normalize_indentation() {
        let code = "def f():\n  x = 1\n\treturn x\n        deep()";
        assert_eq!(
            normalize_indentation(code),
            "def f():\n    x = 1\n    return x\n        deep()"
        );
    }

    #[test]
    fn test_literal_segments() {
        let segs = literal_segments(r#"a "b\"c" d 'e'"#);
        assert_eq!(
            segs,
            vec![
                (false, "a "),
                (true, r#""b\"c""#),
                (false, " d "),
                (true, "'e'"),
            ]
        );
    }

    #[test]
    fn test_brace_control_bodies() {
        let code = "if (ready)\n    start();\nwhile (x) step();\nfor (;;) {\n}";
        let braced = brace_control_bodies(code);
        assert_eq!(
            braced,
            "if (ready) {\n    start();\n}\nwhile (x) { step(); }\nfor (;;) {\n}"
        );
        assert_eq!(braceless_count(&braced), 0);
        assert_eq!(brace_control_bodies(&braced), braced);
    }

    #[test]
    fn test_nested_braceless_headers() {
        let code = "if (a)\n  for (i = 0; i < n; i++)\n    x();";
        let once = brace_control_bodies(code);
        assert_eq!(once, "if (a)\n  for (i = 0; i < n; i++) {\n    x();\n  }");
        let twice = brace_control_bodies(&once);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_inline_inner_body_unblocks_outer_header() {
        let code = "if (ready)\n    if (valid) run();";
        let braced = brace_control_bodies(code);
        assert_eq!(braced, "if (ready) {\n    if (valid) { run(); }\n}");
        assert_eq!(braceless_count(&braced), 0);
        assert_eq!(brace_control_bodies(&braced), braced);

        // The outer header ends up owning a block and is left as is.
        let deeper = "while (more)\n  if (x)\n    if (y) step();";
        let braced = brace_control_bodies(deeper);
        assert_eq!(braced, "while (more)\n  if (x) {\n    if (y) { step(); }\n  }");
        assert_eq!(brace_control_bodies(&braced), braced);
    }

    #[test]
    fn test_statement_group_end() {
        let lines = [
            "  Reader r = open();",
            "  r.read();",
            "  if (x) {",
            "    y();",
            "  }",
            "",
            "  after();",
        ];
        assert_eq!(statement_group_end(&lines, 0), Some(5));
        let unbalanced = ["a();", "if (x) {", "b();"];
        assert_eq!(statement_group_end(&unbalanced, 0), None);
    }

    #[test]
    fn test_in_routine_body() {
        let lines = [
            "class A {",
            "    List<String> names = new ArrayList<>();",
            "    void run() {",
            "        List<String> local = new ArrayList<>();",
            "    }",
            "}",
        ];
        assert!(!in_routine_body(&lines, 1));
        assert!(in_routine_body(&lines, 3));
        let allman = ["class A", "{", "    Foo f = new Foo();", "}"];
        assert!(!in_routine_body(&allman, 2));
        assert!(in_routine_body(&["Foo f = new Foo();"], 0));
    }

    #[test]
    fn test_insert_after_last() {
        let code = "import a;\nimport b;\n\nclass C {}";
        assert_eq!(
            insert_after_last(code, |l| l.starts_with("import "), "import c;"),
            "import a;\nimport b;\nimport c;\n\nclass C {}"
        );
        assert_eq!(
            insert_after_last("x();", |l| l.starts_with("import "), "import c;"),
            "import c;\nx();"
        );
    }

    fn wrap_js(indent: &str, statement: &str) -> String {
        format!("{i}try {{\n{i}    {s}\n{i}}} catch (error) {{}}", i = indent, s = statement)
    }

    #[test]
    fn test_wrap_first_error_prone() {
        let filler = "// padding\n".repeat(20);
        let code = format!("{}  const d = JSON.parse(raw);\n", filler);
        let wrapped = wrap_first_error_prone(&code, &["fetch(", "JSON.parse("], wrap_js);
        assert!(wrapped.contains("  try {\n      const d = JSON.parse(raw);\n  } catch (error) {}"));
        assert_eq!(
            wrap_first_error_prone(&wrapped, &["JSON.parse("], wrap_js),
            wrapped
        );
    }

    #[test]
    fn test_short_code_is_not_wrapped() {
        let code = "const d = JSON.parse(raw);";
        assert_eq!(wrap_first_error_prone(code, &["JSON.parse("], wrap_js), code);
    }
}
