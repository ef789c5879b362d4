use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::transform::common::{
    add_terminators, insert_after_last, rewrite_outside_literals, space_all,
    wrap_first_error_prone,
};
use crate::transform::{markers, RewriteRule, Rewrites};

const ERROR_PRONE: &[&str] = &["new ", "open(", "std::stoi", "std::stod"];

lazy_static! {
    static ref RAW_ALLOCATION: Regex = Regex::new(
        r"(?m)^([ \t]*)([\w:]+(?:<[^;=()]*>)?)\s*\*\s*(\w+)\s*=\s*new\s+([\w:]+(?:<[^;=()]*>)?)\s*(?:\(([^;]*)\))?\s*;"
    )
    .unwrap();
    static ref DELETE_STATEMENT: Regex = Regex::new(r"(?m)^([ \t]*)delete\s+(\w+)\s*;").unwrap();
    static ref SMART_POINTER: Regex = Regex::new(r"unique_ptr|shared_ptr").unwrap();
    static ref NULL_MACRO: Regex = Regex::new(r"\bNULL\b").unwrap();
    static ref TYPEDEF: Regex = Regex::new(r"(?m)^([ \t]*)typedef\s+([^;(){}]+?)\s+(\w+)\s*;").unwrap();
}

pub fn rewrites() -> Rewrites {
    Rewrites {
        layout: add_terminators,
        spacing: space_all,
        structural: vec![
            RewriteRule::new("smart-pointers", smart_pointers),
            RewriteRule::new("wrap-error-prone", wrap_error_prone),
        ],
        enhance: vec![
            RewriteRule::new("nullptr", nullptr),
            RewriteRule::new("using-alias", using_alias),
        ],
        fix_markers: vec![markers::terminators, smart_added, try_added, markers::typos],
        enhance_markers: vec![nullptr_used, aliases_used],
    }
}

fn smart_added(before: &str, after: &str) -> Option<String> {
    markers::gained(
        before,
        after,
        "std::make_unique",
        "Replaced raw pointers with smart pointers",
    )
}

fn try_added(before: &str, after: &str) -> Option<String> {
    markers::gained(
        before,
        after,
        "catch (const std::exception& e)",
        "Added error handling with try/catch blocks",
    )
}

fn nullptr_used(before: &str, after: &str) -> Option<String> {
    (NULL_MACRO.find_iter(after).count() < NULL_MACRO.find_iter(before).count())
        .then(|| "Replaced NULL with nullptr".to_string())
}

fn aliases_used(before: &str, after: &str) -> Option<String> {
    markers::lost(before, after, "typedef ", "Replaced typedef with using aliases")
}

/// `T* p = new U(args);` to `std::unique_ptr<T> p = std::make_unique<U>(args);`,
/// commenting out the now redundant `delete p;`.
fn smart_pointers(code: &str) -> String {
    if SMART_POINTER.is_match(code) {
        return code.to_string();
    }
    let mut converted: HashSet<String> = HashSet::new();
    let owned = RAW_ALLOCATION
        .replace_all(code, |caps: &Captures<'_>| {
            converted.insert(caps[3].to_string());
            format!(
                "{}std::unique_ptr<{}> {} = std::make_unique<{}>({});",
                &caps[1],
                &caps[2],
                &caps[3],
                &caps[4],
                caps.get(5).map(|m| m.as_str().trim()).unwrap_or("")
            )
        })
        .into_owned();
    if converted.is_empty() {
        return code.to_string();
    }

    let released = DELETE_STATEMENT
        .replace_all(&owned, |caps: &Captures<'_>| {
            if converted.contains(&caps[2]) {
                format!(
                    "{}// delete {}; // Automatic cleanup with smart pointer",
                    &caps[1], &caps[2]
                )
            } else {
                caps[0].to_string()
            }
        })
        .into_owned();

    if released.contains("#include <memory>") {
        released
    } else {
        insert_after_last(&released, |l| l.starts_with("#include"), "#include <memory>")
    }
}

fn wrap_error_prone(code: &str) -> String {
    wrap_first_error_prone(code, ERROR_PRONE, |i, s| {
        format!(
            "{i}try {{\n{i}    {s}\n{i}}} catch (const std::exception& e) {{\n{i}    std::cerr << \"Error: \" << e.what() << std::endl;\n{i}}}",
        )
    })
}

fn nullptr(code: &str) -> String {
    rewrite_outside_literals(code, |text| NULL_MACRO.replace_all(text, "nullptr").into_owned())
}

/// `typedef std::vector<int> Ints;` to `using Ints = std::vector<int>;`.
fn using_alias(code: &str) -> String {
    TYPEDEF
        .replace_all(code, "${1}using $3 = $2;")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{run, Mode};

    #[test]
    fn test_smart_pointers() {
        let code = "#include <iostream>\n\nvoid f() {\n    int* value = new int(10);\n    Widget* w = new Widget;\n    use(value, w);\n    delete value;\n    delete w;\n}";
        let fixed = smart_pointers(code);
        assert_eq!(
            fixed,
            "#include <iostream>\n#include <memory>\n\nvoid f() {\n    std::unique_ptr<int> value = std::make_unique<int>(10);\n    std::unique_ptr<Widget> w = std::make_unique<Widget>();\n    use(value, w);\n    // delete value; // Automatic cleanup with smart pointer\n    // delete w; // Automatic cleanup with smart pointer\n}"
        );
        assert_eq!(smart_pointers(&fixed), fixed);
    }

    #[test]
    fn test_array_allocation_is_left_alone() {
        let code = "int* xs = new int[10];";
        assert_eq!(smart_pointers(code), code);
    }

    #[test]
    fn test_fix_reports_smart_pointers() {
        let code = "int main() {\n    int* p = new int(5)\n    return *p;\n}";
        let outcome = run(&rewrites(), code, Mode::Fix);
        assert!(outcome
            .code
            .contains("std::unique_ptr<int> p = std::make_unique<int>(5);"));
        assert!(outcome.code.starts_with("#include <memory>\n"));
        assert!(outcome
            .improvements
            .contains(&"Replaced raw pointers with smart pointers".to_string()));
        assert!(outcome
            .improvements
            .contains(&"Added 1 missing semicolons".to_string()));
    }

    #[test]
    fn test_enhance() {
        let code = "typedef unsigned long Size;\nNode* head = NULL;\nconst char* s = \"NULL\";";
        let outcome = run(&rewrites(), code, Mode::Enhance);
        assert!(outcome.code.contains("using Size = unsigned long;"));
        assert!(outcome.code.contains("head = nullptr;"));
        assert!(outcome.code.contains("\"NULL\""));
        assert!(outcome
            .improvements
            .contains(&"Replaced NULL with nullptr".to_string()));
        assert!(outcome
            .improvements
            .contains(&"Replaced typedef with using aliases".to_string()));
    }
}
