use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::detect::lexical::leading_ws;
use crate::transform::common::{
    add_terminators, in_routine_body, indent_more, insert_after_last, space_all,
    statement_group_end, wrap_first_error_prone,
};
use crate::transform::{markers, RewriteRule, Rewrites};

const ERROR_PRONE: &[&str] = &[
    "File.",
    "Convert.",
    "Parse(",
    "new StreamReader",
    "new StreamWriter",
];

lazy_static! {
    static ref DISPOSABLE_DECLARATION: Regex = Regex::new(
        r"^\s*(?:var|StreamReader|StreamWriter|FileStream)\s+\w+\s*=\s*new\s+(?:StreamReader|StreamWriter|FileStream)\s*\(.*\)\s*;\s*$"
    )
    .unwrap();
    static ref USING_BLOCK: Regex = Regex::new(r"\busing\s*\(").unwrap();
    static ref EXPLICIT_LOCAL: Regex = Regex::new(
        r"^(\s*)([A-Z]\w*(?:<[^;=()]*>)?)\s+(\w+)\s*=\s*new\s+([A-Z]\w*(?:<[^;=()]*>)?)\s*\("
    )
    .unwrap();
    static ref LOCAL_VAR: Regex = Regex::new(r"\bvar\s+\w+\s*=").unwrap();
    static ref FILTER_LOOP: Regex = Regex::new(
        r"(?m)^([ \t]*)foreach\s*\(\s*[\w<>\[\],? ]+?\s+(\w+)\s+in\s+([\w.()]+)\s*\)\s*\{\s*if\s*\(([^\n]+)\)\s*(\{)?\s*(\w+)\.Add\(\s*(\w+)\s*\)\s*;\s*(\})?\s*\}[ \t]*$"
    )
    .unwrap();
}

pub fn rewrites() -> Rewrites {
    Rewrites {
        layout: add_terminators,
        spacing: space_all,
        structural: vec![
            RewriteRule::new("using-blocks", using_blocks),
            RewriteRule::new("wrap-error-prone", wrap_error_prone),
        ],
        enhance: vec![
            RewriteRule::new("implicit-var", implicit_var),
            RewriteRule::new("linq-where", linq_where),
        ],
        fix_markers: vec![markers::terminators, using_added, try_added, markers::typos],
        enhance_markers: vec![var_added, linq_added],
    }
}

fn using_added(before: &str, after: &str) -> Option<String> {
    (USING_BLOCK.find_iter(after).count() > USING_BLOCK.find_iter(before).count())
        .then(|| "Improved resource management with using statements".to_string())
}

fn try_added(before: &str, after: &str) -> Option<String> {
    markers::gained(
        before,
        after,
        "catch (Exception ex)",
        "Added error handling with try/catch blocks",
    )
}

fn var_added(before: &str, after: &str) -> Option<String> {
    (LOCAL_VAR.find_iter(after).count() > LOCAL_VAR.find_iter(before).count())
        .then(|| "Used 'var' for implicit typing".to_string())
}

fn linq_added(before: &str, after: &str) -> Option<String> {
    markers::gained(before, after, ".Where(", "Added LINQ for collection processing")
}

/// Put the first reader, writer or file stream declaration in a `using`
/// block that owns the statements following it.
fn using_blocks(code: &str) -> String {
    if USING_BLOCK.is_match(code) {
        return code.to_string();
    }
    let lines: Vec<&str> = code.split('\n').collect();
    let Some(start) = lines.iter().position(|l| DISPOSABLE_DECLARATION.is_match(l)) else {
        return code.to_string();
    };
    let Some(end) = statement_group_end(&lines, start) else {
        return code.to_string();
    };

    let indent = leading_ws(lines[start]);
    let resource = lines[start].trim().trim_end_matches(';').trim_end();
    let mut out: Vec<String> = lines[..start].iter().map(|l| l.to_string()).collect();
    out.push(format!("{}using ({})", indent, resource));
    out.push(format!("{}{{", indent));
    out.extend(lines[start + 1..end].iter().map(|l| indent_more(l)));
    out.push(format!("{}}}", indent));
    out.extend(lines[end..].iter().map(|l| l.to_string()));
    out.join("\n")
}

fn wrap_error_prone(code: &str) -> String {
    wrap_first_error_prone(code, ERROR_PRONE, |i, s| {
        format!(
            "{i}try\n{i}{{\n{i}    {s}\n{i}}}\n{i}catch (Exception ex)\n{i}{{\n{i}    Console.WriteLine($\"Error: {{ex.Message}}\");\n{i}}}",
        )
    })
}

/// `List<int> xs = new List<int>()` to `var xs = new List<int>()` for locals
/// whose declared type repeats the constructed one.
fn implicit_var(code: &str) -> String {
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
                    if caps[2] != caps[4] {
                        return caps[0].to_string();
                    }
                    format!("{}var {} = new {}(", &caps[1], &caps[3], &caps[4])
                })
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A `foreach` that only copies matching elements becomes `AddRange` over a
/// `Where` query.
fn linq_where(code: &str) -> String {
    let rewritten = FILTER_LOOP
        .replace_all(code, |caps: &Captures<'_>| {
            let braced_if = caps.get(5).is_some() == caps.get(8).is_some();
            if !braced_if || caps[2] != caps[7] {
                return caps[0].to_string();
            }
            format!(
                "{}{}.AddRange({}.Where({} => {}));",
                &caps[1],
                &caps[6],
                &caps[3],
                &caps[2],
                caps[4].trim()
            )
        })
        .into_owned();
    if rewritten == code || rewritten.contains("using System.Linq;") {
        return rewritten;
    }
    insert_after_last(
        &rewritten,
        |l| l.starts_with("using ") && l.ends_with(';') && !l.contains('(') && !l.contains('='),
        "using System.Linq;",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{run, Mode};

    #[test]
    fn test_using_blocks() {
        let code = "    var reader = new StreamReader(path);\n    var text = reader.ReadToEnd();\n\n    Process(text);";
        let fixed = using_blocks(code);
        assert_eq!(
            fixed,
            "    using (var reader = new StreamReader(path))\n    {\n        var text = reader.ReadToEnd();\n    }\n\n    Process(text);"
        );
        assert_eq!(using_blocks(&fixed), fixed);
    }

    #[test]
    fn test_fix_does_not_wrap_using_header() {
        let mut code = String::from("public void Load(string path)\n{\n");
        code.push_str("    var reader = new StreamReader(path);\n");
        code.push_str("    var text = reader.ReadToEnd();\n");
        code.push_str("    Console.WriteLine(text.Length);\n");
        code.push_str("    Console.WriteLine(text.ToUpperInvariant());\n");
        code.push_str("    Console.WriteLine(text.Trim());\n}");
        let outcome = run(&rewrites(), &code, Mode::Fix);
        assert!(outcome
            .code
            .contains("    using (var reader = new StreamReader(path))\n    {\n"));
        assert!(!outcome.code.contains("try"));
        assert_eq!(
            outcome.improvements,
            vec!["Improved resource management with using statements".to_string()]
        );
    }

    #[test]
    fn test_wrap_is_allman() {
        let mut code = "// configuration loader used at startup by the service host\n".repeat(3);
        code.push_str("int port = int.Parse(value);\n");
        let wrapped = wrap_error_prone(&code);
        assert!(wrapped.contains(
            "try\n{\n    int port = int.Parse(value);\n}\ncatch (Exception ex)\n{\n    Console.WriteLine($\"Error: {ex.Message}\");\n}"
        ));
    }

    #[test]
    fn test_implicit_var() {
        let code = "class A\n{\n    List<int> ids = new List<int>();\n    void Run()\n    {\n        List<int> xs = new List<int>();\n        IList<int> ys = new List<int>();\n    }\n}";
        let enhanced = implicit_var(code);
        assert!(enhanced.contains("    List<int> ids = new List<int>();"));
        assert!(enhanced.contains("        var xs = new List<int>();"));
        assert!(enhanced.contains("        IList<int> ys = new List<int>();"));
    }

    #[test]
    fn test_linq_where() {
        let code = "using System;\n\nforeach (var user in users)\n{\n    if (user.IsActive)\n    {\n        active.Add(user);\n    }\n}";
        let enhanced = linq_where(code);
        assert_eq!(
            enhanced,
            "using System;\nusing System.Linq;\n\nactive.AddRange(users.Where(user => user.IsActive));"
        );
        let outcome = run(&rewrites(), code, Mode::Enhance);
        assert!(outcome
            .improvements
            .contains(&"Added LINQ for collection processing".to_string()));
    }
}
