use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::detect::lexical::leading_ws;
use crate::transform::common::{
    add_terminators, brace_control_bodies, in_routine_body, indent_more, insert_after_last,
    space_all, statement_group_end, wrap_first_error_prone,
};
use crate::transform::{markers, RewriteRule, Rewrites};

const ERROR_PRONE: &[&str] = &[
    "new FileInputStream",
    "new BufferedReader",
    "Integer.parseInt",
    "Double.parseDouble",
];

lazy_static! {
    static ref STREAM_DECLARATION: Regex = Regex::new(
        r"^\s*(?:final\s+)?(?:FileInputStream|FileOutputStream|FileReader|FileWriter|BufferedReader|BufferedWriter)\s+(\w+)\s*=\s*new\s+.+;\s*$"
    )
    .unwrap();
    static ref TRY_WITH_RESOURCES: Regex = Regex::new(r"\btry\s*\(").unwrap();
    static ref EXPLICIT_LOCAL: Regex = Regex::new(
        r"^(\s*)(final\s+)?([A-Z]\w*)(<[^;=()]*>)?\s+(\w+)\s*=\s*new\s+([A-Z]\w*)(<[^;=()]*>)?\s*\("
    )
    .unwrap();
    static ref LOCAL_VAR: Regex = Regex::new(r"\bvar\s+\w+\s*=").unwrap();
    static ref FILTER_LOOP: Regex = Regex::new(
        r"(?m)^([ \t]*)for\s*\(\s*(?:final\s+)?[\w<>\[\], ]+?\s+(\w+)\s*:\s*([\w.()]+)\s*\)\s*\{\s*if\s*\(([^\n]+)\)\s*(\{)?\s*(\w+)\.add\(\s*(\w+)\s*\)\s*;\s*(\})?\s*\}[ \t]*$"
    )
    .unwrap();
}

pub fn rewrites() -> Rewrites {
    Rewrites {
        layout: add_terminators,
        spacing: space_all,
        structural: vec![
            RewriteRule::new("brace-control-bodies", brace_control_bodies),
            RewriteRule::new("try-with-resources", try_with_resources),
            RewriteRule::new("wrap-error-prone", wrap_error_prone),
        ],
        enhance: vec![
            RewriteRule::new("local-var", local_var),
            RewriteRule::new("filter-streams", filter_streams),
        ],
        fix_markers: vec![
            markers::terminators,
            markers::braces,
            resources_added,
            try_added,
            markers::typos,
        ],
        enhance_markers: vec![var_added, streams_added],
    }
}

fn resources_added(before: &str, after: &str) -> Option<String> {
    (TRY_WITH_RESOURCES.find_iter(after).count() > TRY_WITH_RESOURCES.find_iter(before).count())
        .then(|| "Added try-with-resources for stream handling".to_string())
}

fn try_added(before: &str, after: &str) -> Option<String> {
    markers::gained(
        before,
        after,
        "catch (Exception e)",
        "Added error handling with try/catch blocks",
    )
}

fn var_added(before: &str, after: &str) -> Option<String> {
    (LOCAL_VAR.find_iter(after).count() > LOCAL_VAR.find_iter(before).count())
        .then(|| "Used 'var' for local variable type inference".to_string())
}

fn streams_added(before: &str, after: &str) -> Option<String> {
    markers::gained(
        before,
        after,
        ".stream()",
        "Added stream operations for collection processing",
    )
}

fn add_import(code: &str, import: &str) -> String {
    if code.contains(import) {
        return code.to_string();
    }
    insert_after_last(
        code,
        |l| l.starts_with("import ") || l.starts_with("package "),
        import,
    )
}

/// Move the first stream declaration into a try-with-resources header that
/// owns the statements following it.
fn try_with_resources(code: &str) -> String {
    if TRY_WITH_RESOURCES.is_match(code) {
        return code.to_string();
    }
    let lines: Vec<&str> = code.split('\n').collect();
    let Some(start) = lines.iter().position(|l| STREAM_DECLARATION.is_match(l)) else {
        return code.to_string();
    };
    let Some(end) = statement_group_end(&lines, start) else {
        return code.to_string();
    };
    let Some(caps) = STREAM_DECLARATION.captures(lines[start]) else {
        return code.to_string();
    };
    let close_call = format!("{}.close();", &caps[1]);

    let indent = leading_ws(lines[start]);
    let resource = lines[start].trim().trim_end_matches(';').trim_end();
    let mut out: Vec<String> = lines[..start].iter().map(|l| l.to_string()).collect();
    out.push(format!("{}try ({}) {{", indent, resource));
    out.extend(
        lines[start + 1..end]
            .iter()
            .filter(|l| l.trim() != close_call)
            .map(|l| indent_more(l)),
    );
    out.push(format!("{}}} catch (IOException e) {{", indent));
    out.push(format!("{}    e.printStackTrace();", indent));
    out.push(format!("{}}}", indent));
    out.extend(lines[end..].iter().map(|l| l.to_string()));

    let wrapped = out.join("\n");
    if wrapped.contains("import ") {
        add_import(&wrapped, "import java.io.IOException;")
    } else {
        wrapped
    }
}

fn wrap_error_prone(code: &str) -> String {
    wrap_first_error_prone(code, ERROR_PRONE, |i, s| {
        format!(
            "{i}try {{\n{i}    {s}\n{i}}} catch (Exception e) {{\n{i}    e.printStackTrace();\n{i}}}",
        )
    })
}

/// `StringBuilder sb = new StringBuilder()` to `var sb = new StringBuilder()`
/// and `List<String> names = new ArrayList<>()` to
/// `var names = new ArrayList<String>()`, for locals only.
fn local_var(code: &str) -> String {
    let lines: Vec<&str> = code.split('\n').collect();
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if !in_routine_body(&lines, i) {
                return line.to_string();
            }
            EXPLICIT_LOCAL
                .replace(line, |caps: &Captures<'_>| {
                    let declared_args = caps.get(4).map(|m| m.as_str());
                    let created_args = caps.get(7).map(|m| m.as_str());
                    let final_kw = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                    let created = match (declared_args, created_args) {
                        _ if caps[3] == caps[6] && declared_args == created_args => {
                            format!("{}{}", &caps[6], created_args.unwrap_or(""))
                        }
                        (Some(args), Some("<>")) => format!("{}{}", &caps[6], args),
                        _ => return caps[0].to_string(),
                    };
                    format!("{}{}var {} = new {}(", &caps[1], final_kw, &caps[5], created)
                })
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A loop that only copies matching elements becomes `addAll` over a
/// filtered stream.
fn filter_streams(code: &str) -> String {
    let rewritten = FILTER_LOOP
        .replace_all(code, |caps: &Captures<'_>| {
            let braced_if = caps.get(5).is_some() == caps.get(8).is_some();
            if !braced_if || caps[2] != caps[7] {
                return caps[0].to_string();
            }
            format!(
                "{}{}.addAll({}.stream().filter({} -> {}).collect(Collectors.toList()));",
                &caps[1],
                &caps[6],
                &caps[3],
                &caps[2],
                caps[4].trim()
            )
        })
        .into_owned();
    if rewritten != code {
        add_import(&rewritten, "import java.util.stream.Collectors;")
    } else {
        rewritten
    }
}
