use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::transform::common::{
    add_terminators, brace_control_bodies, space_all, wrap_first_error_prone,
};
use crate::transform::{markers, RewriteRule, Rewrites};

const ERROR_PRONE: &[&str] = &["fetch(", "JSON.parse(", "localStorage.", "new Promise("];

lazy_static! {
    static ref VAR_DECL: Regex = Regex::new(r"\bvar\s+([A-Za-z_$][\w$]*)(\s*=)?").unwrap();
    static ref ANONYMOUS_RETURN: Regex = Regex::new(
        r"\bfunction\s*\(([^()]*)\)\s*\{\s*return\s+([^;{}\n]+?);?\s*\}"
    )
    .unwrap();
    static ref CONCAT3: Regex = Regex::new(
        r#"(['"])([^'"`\\\n$]*)(['"])\s*\+\s*([A-Za-z_$][\w$.]*(?:\(\))?)\s*\+\s*(['"])([^'"`\\\n$]*)(['"])"#
    )
    .unwrap();
    static ref THEN_LINE: Regex = Regex::new(
        r"^(\s*)(return\s+)?(.+?)\.then\(\s*\(?\s*([A-Za-z_$][\w$]*)\s*\)?\s*=>\s*(.+?)\s*\)\s*;?\s*$"
    )
    .unwrap();
    static ref FUNCTION_KEYWORD: Regex = Regex::new(r"\bfunction\b").unwrap();
}

pub fn rewrites() -> Rewrites {
    Rewrites {
        layout: add_terminators,
        spacing: space_all,
        structural: vec![
            RewriteRule::new("var-to-const", var_to_const),
            RewriteRule::new("brace-control-bodies", brace_control_bodies),
            RewriteRule::new("wrap-error-prone", wrap_error_prone),
        ],
        enhance: vec![
            RewriteRule::new("arrow-functions", arrow_functions),
            RewriteRule::new("template-literals", template_literals),
            RewriteRule::new("async-await", async_await),
        ],
        fix_markers: vec![
            var_replaced,
            markers::terminators,
            markers::braces,
            try_added,
            markers::typos,
        ],
        enhance_markers: vec![awaited, templated, arrowed],
    }
}

fn try_added(before: &str, after: &str) -> Option<String> {
    markers::gained(before, after, "catch (error)", "Added error handling with try/catch blocks")
}

fn awaited(before: &str, after: &str) -> Option<String> {
    markers::gained(before, after, "await ", "Added async/await for better promise handling")
}

fn templated(before: &str, after: &str) -> Option<String> {
    markers::gained(before, after, "`", "Replaced string concatenation with template literals")
}

fn arrowed(before: &str, after: &str) -> Option<String> {
    markers::gained(before, after, "=>", "Replaced traditional functions with arrow functions")
}

fn var_replaced(before: &str, after: &str) -> Option<String> {
    (VAR_DECL.find_iter(after).count() < VAR_DECL.find_iter(before).count())
        .then(|| "Replaced 'var' with 'const' or 'let'".to_string())
}

/// Whether `name` is assigned, incremented or decremented anywhere in `rest`.
fn is_reassigned(rest: &str, name: &str) -> bool {
    let name = regex::escape(name);
    let pattern = format!(
        r"(?:^|[^\w$.]){n}\s*(?:[-+*/%]?=[^=>]|\+\+|--)|(?:\+\+|--)\s*{n}(?:[^\w$]|$)",
        n = name
    );
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(rest),
        Err(_) => true,
    }
}

/// `var` becomes `const` unless the variable is reassigned later or declared
/// without an initializer, in which case it becomes `let`.
fn var_to_const(code: &str) -> String {
    VAR_DECL
        .replace_all(code, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let end = caps.get(0).map(|m| m.end()).unwrap_or(code.len());
            let initialized = caps.get(2).is_some();
            let keyword = if initialized && !is_reassigned(&code[end..], &caps[1]) {
                "const"
            } else {
                "let"
            };
            format!("{}{}", keyword, &whole[3..])
        })
        .into_owned()
}

fn wrap_error_prone(code: &str) -> String {
    wrap_first_error_prone(code, ERROR_PRONE, |i, s| {
        format!(
            "{i}try {{\n{i}    {s}\n{i}}} catch (error) {{\n{i}    console.error('Error:', error);\n{i}}}",
        )
    })
}

/// `function (a) { return a * 2; }` to `(a) => a * 2`.
fn arrow_functions(code: &str) -> String {
    ANONYMOUS_RETURN
        .replace_all(code, |caps: &Captures<'_>| {
            let body = caps[2].trim();
            if body.contains("this") || body.contains("arguments") {
                return caps[0].to_string();
            }
            format!("({}) => {}", caps[1].trim(), body)
        })
        .into_owned()
}

/// `'Hello ' + name + '!'` to `` `Hello ${name}!` ``.
fn template_literals(code: &str) -> String {
    CONCAT3
        .replace_all(code, |caps: &Captures<'_>| {
            let escaped = caps
                .get(0)
                .map(|m| code[..m.start()].ends_with('\\'))
                .unwrap_or(false);
            if escaped || caps[1] != caps[3] || caps[5] != caps[7] {
                return caps[0].to_string();
            }
            format!("`{}${{{}}}{}`", &caps[2], &caps[4], &caps[6])
        })
        .into_owned()
}

fn balanced(text: &str) -> bool {
    let mut depth: i64 = 0;
    for ch in text.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// A single `.then(x => ...)` inside a `function` becomes an awaited
/// assignment, and the enclosing function is marked `async`.
fn async_await(code: &str) -> String {
    let mut lines: Vec<String> = code.split('\n').map(str::to_string).collect();

    for i in 0..lines.len() {
        if lines[i].contains("await") || lines[i].contains(".catch(") {
            continue;
        }
        let Some(caps) = THEN_LINE.captures(&lines[i]) else {
            continue;
        };
        let (indent, ret, promise, param, body) = (
            caps[1].to_string(),
            caps.get(2).is_some(),
            caps[3].trim().to_string(),
            caps[4].to_string(),
            caps[5].to_string(),
        );
        if promise.contains(".then(")
            || body.contains(".then(")
            || body.starts_with('{')
            || !balanced(&promise)
            || !balanced(&body)
        {
            continue;
        }
        let Some(owner) = (0..i).rev().find(|&j| FUNCTION_KEYWORD.is_match(&lines[j])) else {
            continue;
        };
        if !lines[owner].contains("async ") {
            lines[owner] = FUNCTION_KEYWORD
                .replace(&lines[owner], "async function")
                .into_owned();
        }
        let tail = if ret {
            format!("return {};", body)
        } else {
            format!("{};", body)
        };
        lines[i] = format!(
            "{indent}const {param} = await {promise};\n{indent}{tail}",
        );
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{run, Mode};

    #[test]
    fn test_var_to_const_or_let() {
        let code = "var total = 0;\nvar name = 'x';\nfor (var i = 0; i < 3; i++) {\n  total += i;\n}\nvar later;";
        let fixed = var_to_const(code);
        assert!(fixed.contains("let total = 0;"));
        assert!(fixed.contains("const name = 'x';"));
        assert!(fixed.contains("for (let i = 0;"));
        assert!(fixed.contains("let later;"));
        assert!(!fixed.contains("var "));
    }

    #[test]
    fn test_comparison_is_not_reassignment() {
        assert!(!is_reassigned(" = 1;\nif (x == 2) {}", "x"));
        assert!(is_reassigned(" = 1;\nx = 2;", "x"));
        assert!(!is_reassigned(" = 1;\nobj.x = 2;", "x"));
        assert!(is_reassigned(" = 1;\n$x++;", "$x"));
    }

    #[test]
    fn test_fix_pipeline() {
        let code = "var count = 0\nif (count > 1)\n  console.log(count)";
        let outcome = run(&rewrites(), code, Mode::Fix);
        assert_eq!(
            outcome.code,
            "const count = 0;\nif (count > 1) {\n  console.log(count);\n}"
        );
        assert!(outcome
            .improvements
            .contains(&"Replaced 'var' with 'const' or 'let'".to_string()));
        assert!(outcome
            .improvements
            .contains(&"Added 2 missing semicolons".to_string()));
        assert!(outcome
            .improvements
            .contains(&"Added braces to single-statement control bodies".to_string()));
    }

    #[test]
    fn test_arrow_functions() {
        let code = "const doubled = items.map(function (x) { return x * 2; });";
        assert_eq!(
            arrow_functions(code),
            "const doubled = items.map((x) => x * 2);"
        );
        let bound = "el.on(function () { return this.value; });";
        assert_eq!(arrow_functions(bound), bound);
    }

    #[test]
    fn test_template_literals() {
        assert_eq!(
            template_literals("const msg = 'Hello ' + name + '!';"),
            "const msg = `Hello ${name}!`;"
        );
        assert_eq!(
            template_literals("const s = 'a' + b + \"c\";"),
            "const s = `a${b}c`;"
        );
        let unclosed = "const s = 'it\\'s' + b + 'c';";
        assert_eq!(template_literals(unclosed), unclosed);
    }

    #[test]
    fn test_async_await() {
        let code = "function load(url) {\n  return fetch(url).then(res => res.json());\n}";
        let enhanced = async_await(code);
        assert_eq!(
            enhanced,
            "async function load(url) {\n  const res = await fetch(url);\n  return res.json();\n}"
        );
        assert_eq!(async_await(&enhanced), enhanced);

        let top_level = "fetch(url).then(res => res.json());";
        assert_eq!(async_await(top_level), top_level);
    }

    #[test]
    fn test_error_prone_call_is_wrapped() {
        let mut code = String::new();
        for i in 0..8 {
            code.push_str(&format!("const value{} = compute({});\n", i, i));
        }
        code.push_str("const data = JSON.parse(raw);\n");
        let outcome = run(&rewrites(), &code, Mode::Fix);
        assert!(outcome.code.contains(
            "try {\n    const data = JSON.parse(raw);\n} catch (error) {\n    console.error('Error:', error);\n}"
        ));
        assert!(outcome
            .improvements
            .contains(&"Added error handling with try/catch blocks".to_string()));

        let again = run(&rewrites(), &outcome.code, Mode::Fix);
        assert_eq!(again.code, outcome.code);
        assert!(again.improvements.is_empty());
    }

    #[test]
    fn test_enhance_markers() {
        let code = "function greet(name) {\n  return getUser(name).then(u => 'Hi ' + u.name + '!');\n}";
        let outcome = run(&rewrites(), code, Mode::Enhance);
        assert!(outcome.code.contains("async function greet(name)"));
        assert!(outcome.code.contains("const u = await getUser(name);"));
        assert!(outcome.code.contains("return `Hi ${u.name}!`;"));
        assert!(outcome
            .improvements
            .contains(&"Added async/await for better promise handling".to_string()));
        assert!(outcome
            .improvements
            .contains(&"Replaced string concatenation with template literals".to_string()));
    }
}
