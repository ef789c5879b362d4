use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::transform::common::{add_terminators, space_all, wrap_first_error_prone};
use crate::transform::{markers, RewriteRule, Rewrites};

const ERROR_PRONE: &[&str] = &["file_get_contents", "json_decode", "mysqli_query", "fopen"];

lazy_static! {
    static ref MYSQL_CALL: Regex = Regex::new(
        r"\bmysql_(connect|query|fetch_array|fetch_assoc|fetch_row|num_rows|error|close|select_db|real_escape_string)\s*\("
    )
    .unwrap();
    static ref MYSQL_PREFIX: Regex = Regex::new(r"\bmysql_\w+\s*\(").unwrap();
    static ref INTERPOLATED_QUERY: Regex = Regex::new(
        r#"^([ \t]*)\$(\w+)\s*=\s*"((?i:SELECT|UPDATE|INSERT|DELETE)\b[^"]*)"\s*;\s*$"#
    )
    .unwrap();
    static ref QUERY_VARIABLE: Regex = Regex::new(r"'?\{?\$(\w+)\}?'?").unwrap();
    static ref QUERY_CALL: Regex = Regex::new(
        r"^([ \t]*)(?:\$(\w+)\s*=\s*)?(?:mysqli_query\(\s*(?:\$(\w+)\s*,\s*)?\$(\w+)\s*\)|\$(\w+)->query\(\s*\$(\w+)\s*\))\s*;\s*$"
    )
    .unwrap();
    static ref ISSET_TERNARY: Regex = Regex::new(
        r"isset\(\s*(\$\w+(?:\[[^\]\n]*\])?)\s*\)\s*\?\s*(\$\w+(?:\[[^\]\n]*\])?)\s*:"
    )
    .unwrap();
}

pub fn rewrites() -> Rewrites {
    Rewrites {
        layout: add_terminators,
        spacing: space_all,
        structural: vec![
            RewriteRule::new("mysqli", mysql_to_mysqli),
            RewriteRule::new("prepared-statements", prepared_statements),
            RewriteRule::new("wrap-error-prone", wrap_error_prone),
        ],
        enhance: vec![
            RewriteRule::new("short-arrays", short_arrays),
            RewriteRule::new("null-coalescing", null_coalescing),
        ],
        fix_markers: vec![
            markers::terminators,
            mysql_replaced,
            prepared,
            try_added,
            markers::typos,
        ],
        enhance_markers: vec![short_arrays_used, coalesced],
    }
}

fn mysql_replaced(before: &str, after: &str) -> Option<String> {
    (MYSQL_PREFIX.find_iter(after).count() < MYSQL_PREFIX.find_iter(before).count())
        .then(|| "Replaced deprecated mysql_ functions with mysqli_".to_string())
}

fn prepared(before: &str, after: &str) -> Option<String> {
    markers::gained(
        before,
        after,
        "->prepare(",
        "Added SQL injection protection with prepared statements",
    )
}

fn try_added(before: &str, after: &str) -> Option<String> {
    markers::gained(
        before,
        after,
        "catch (Exception $e)",
        "Added error handling with try/catch blocks",
    )
}

fn short_arrays_used(before: &str, after: &str) -> Option<String> {
    markers::lost(
        before,
        after,
        "array(",
        "Replaced array() with short array syntax",
    )
}

fn coalesced(before: &str, after: &str) -> Option<String> {
    markers::gained(before, after, "??", "Used null coalescing operator")
}

fn mysql_to_mysqli(code: &str) -> String {
    MYSQL_CALL.replace_all(code, "mysqli_$1(").into_owned()
}

/// An interpolated SQL string later passed to a query call becomes a
/// prepared statement with bound parameters.
fn prepared_statements(code: &str) -> String {
    if code.contains("prepare") {
        return code.to_string();
    }
    let mut lines: Vec<String> = code.split('\n').map(str::to_string).collect();

    let Some((q_idx, q_caps)) = lines
        .iter()
        .enumerate()
        .find_map(|(i, l)| INTERPOLATED_QUERY.captures(l).map(|c| (i, c)))
    else {
        return code.to_string();
    };
    let query_var = q_caps[2].to_string();
    let sql = q_caps[3].to_string();
    let indent = q_caps[1].to_string();
    let params: Vec<String> = QUERY_VARIABLE
        .captures_iter(&sql)
        .map(|c| format!("${}", &c[1]))
        .collect();
    if params.is_empty() {
        return code.to_string();
    }
    let placeholder_sql = QUERY_VARIABLE.replace_all(&sql, "?").into_owned();

    let call = lines.iter().enumerate().skip(q_idx + 1).find_map(|(i, l)| {
        let caps = QUERY_CALL.captures(l)?;
        let passed = caps.get(4).or_else(|| caps.get(6))?.as_str();
        (passed == query_var).then(|| {
            let conn = caps
                .get(3)
                .or_else(|| caps.get(5))
                .map(|m| m.as_str())
                .unwrap_or("conn")
                .to_string();
            let result = caps.get(2).map(|m| m.as_str().to_string());
            (i, caps[1].to_string(), conn, result)
        })
    });
    let Some((call_idx, call_indent, conn, result)) = call else {
        return code.to_string();
    };

    lines[q_idx] = format!("{}${} = \"{}\";", indent, query_var, placeholder_sql);
    let mut statement = vec![
        format!("{}$stmt = ${}->prepare(${});", call_indent, conn, query_var),
        format!(
            "{}$stmt->bind_param(\"{}\", {});",
            call_indent,
            "s".repeat(params.len()),
            params.join(", ")
        ),
        format!("{}$stmt->execute();", call_indent),
    ];
    if let Some(result) = result {
        statement.push(format!("{}${} = $stmt->get_result();", call_indent, result));
    }
    let tail = lines.split_off(call_idx + 1);
    lines.pop();
    lines.extend(statement);
    lines.extend(tail);
    lines.join("\n")
}

fn wrap_error_prone(code: &str) -> String {
    wrap_first_error_prone(code, ERROR_PRONE, |i, s| {
        format!(
            "{i}try {{\n{i}    {s}\n{i}}} catch (Exception $e) {{\n{i}    echo 'Error: ' . $e->getMessage();\n{i}}}",
        )
    })
}

/// Byte offset of the `)` matching the `(` at `open`.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, ch) in text[open..].char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// `array(1, 2)` to `[1, 2]`, innermost calls included.
fn short_arrays(code: &str) -> String {
    let mut text = code.to_string();
    let mut from = 0;
    while let Some(found) = text[from..].find("array(") {
        let start = from + found;
        let open = start + "array".len();
        let preceded_by_name = text[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '>' | ':'));
        if preceded_by_name {
            from = open;
            continue;
        }
        let Some(close) = matching_paren(&text, open) else {
            break;
        };
        let inner = text[open + 1..close].to_string();
        text.replace_range(start..=close, &format!("[{}]", inner));
        from = start + 1;
    }
    text
}

/// `isset($x) ? $x : $d` to `$x ?? $d`.
fn null_coalescing(code: &str) -> String {
    ISSET_TERNARY
        .replace_all(code, |caps: &Captures<'_>| {
            if caps[1] != caps[2] {
                return caps[0].to_string();
            }
            format!("{} ??", &caps[1])
        })
        .into_owned()
}
