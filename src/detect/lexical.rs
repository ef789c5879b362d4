//! Lexical helpers shared by detectors, the scorer and the rewriters.
//!
//! Everything here works on raw text. Nothing tries to understand the
//! grammar of the language, so results are estimates.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TRY_KEYWORD: Regex = Regex::new(r"\btry\b").unwrap();
    static ref COMMENT_MARKER: Regex = Regex::new(r"//|/\*|\*/").unwrap();
    static ref HEADER_ONLY: Regex = Regex::new(
        r"^(?:\}\s*)?(?:if|for|while|switch|else|do|try|catch|finally|foreach|function|class|interface|namespace|struct|enum|template)\b"
    )
    .unwrap();
    static ref USING_BLOCK: Regex = Regex::new(r"^using\s*\(").unwrap();
    static ref BRACELESS_CONTROL: Regex =
        Regex::new(r"^\s*(?:\}\s*else\s+)?(?:if|for|while)\s*\([^)]*\)[^{]*$").unwrap();
}

/// Line prefixes that never carry a statement needing a terminator.
const NON_STATEMENT_PREFIXES: &[&str] = &["//", "/*", "*", "#", "<?", "?>", "@", "["];

/// Line endings that mean the statement is complete or continues.
const CONTINUATION_ENDINGS: &[char] = &[
    ';', '{', '}', ',', '(', '[', ':', '\\', '+', '=', '&', '|', '.', '?', '<', '>',
];

/// Openers of a line that continues the previous one.
const CONTINUATION_OPENERS: &[&str] = &["{", ".", "?", ":", "+", "&&", "||", ")"];

/// 1-based line of the first occurrence of `needle`, or 1 if absent.
pub fn find_line(code: &str, needle: &str) -> usize {
    code.lines()
        .position(|l| l.contains(needle))
        .map(|i| i + 1)
        .unwrap_or(1)
}

/// 1-based line of the first regex match, or 1 if absent.
pub fn find_line_regex(code: &str, re: &Regex) -> usize {
    match re.find(code) {
        Some(m) => line_of_offset(code, m.start()),
        None => 1,
    }
}

/// 1-based line containing byte `offset`.
pub fn line_of_offset(code: &str, offset: usize) -> usize {
    let offset = offset.min(code.len());
    code.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Whether the code contains a `try` keyword anywhere.
pub fn has_try(code: &str) -> bool {
    TRY_KEYWORD.is_match(code)
}

/// Number of comment markers (`//`, `/*`, `*/`).
pub fn comment_markers(code: &str) -> usize {
    COMMENT_MARKER.find_iter(code).count()
}

/// Leading whitespace of a line.
pub fn leading_ws(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}

/// Indentation width, counting a tab as four columns.
pub fn indent_width(line: &str) -> usize {
    leading_ws(line)
        .chars()
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Index of the next non-blank line after `idx`.
pub fn next_non_blank(lines: &[&str], idx: usize) -> Option<usize> {
    (idx + 1..lines.len()).find(|&i| !lines[i].trim().is_empty())
}

/// Whether a trimmed line opens a block (`if (...)`, `using (...)`, a class
/// header and the like) rather than holding a plain statement.
pub fn is_block_header(trimmed: &str) -> bool {
    HEADER_ONLY.is_match(trimmed) || USING_BLOCK.is_match(trimmed)
}

/// Whether the statement on `lines[idx]` is missing its `;`.
///
/// Comment, preprocessor and markup lines are skipped, as are bare control
/// headers and lines whose continuation starts on the next line.
pub fn needs_terminator(lines: &[&str], idx: usize) -> bool {
    let trimmed = lines[idx].trim();
    if trimmed.is_empty() {
        return false;
    }
    if NON_STATEMENT_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
        return false;
    }
    if trimmed.ends_with("*/") {
        return false;
    }
    if let Some(last) = trimmed.chars().last() {
        if CONTINUATION_ENDINGS.contains(&last) {
            return false;
        }
    }
    if is_block_header(trimmed) {
        return false;
    }
    if let Some(next) = next_non_blank(lines, idx) {
        let next_trimmed = lines[next].trim_start();
        if CONTINUATION_OPENERS.iter().any(|p| next_trimmed.starts_with(p)) {
            return false;
        }
    }
    true
}

/// 1-based lines whose statements are missing a terminator.
pub fn missing_terminator_lines(code: &str) -> Vec<usize> {
    let lines: Vec<&str> = code.lines().collect();
    (0..lines.len())
        .filter(|&i| needs_terminator(&lines, i))
        .map(|i| i + 1)
        .collect()
}

/// Whether `lines[idx]` is an `if`/`for`/`while` whose body has no braces.
pub fn is_braceless_control(lines: &[&str], idx: usize) -> bool {
    if !BRACELESS_CONTROL.is_match(lines[idx]) {
        return false;
    }
    match next_non_blank(lines, idx) {
        Some(next) => !lines[next].trim_start().starts_with('{'),
        None => true,
    }
}

/// Byte offset just past the `)` closing the first `(` in `line`.
pub fn close_paren_end(line: &str) -> Option<usize> {
    let open = line.find('(')?;
    let mut depth = 0usize;
    for (i, ch) in line[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Most `{` on any single line, or indentation depth (width / 4, rounded
/// down) for indentation-delimited code.
pub fn max_nesting(code: &str, brace_delimited: bool) -> usize {
    if brace_delimited {
        return code
            .lines()
            .map(|l| l.matches('{').count())
            .max()
            .unwrap_or(0);
    }
    code.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_width(l) / 4)
        .max()
        .unwrap_or(0)
}

/// Split an identifier into lowercase words on `_`, `-`, `$` and camelCase
/// boundaries: `userId` gives `["user", "id"]`.
pub fn name_words(identifier: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in identifier.chars() {
        if ch == '_' || ch == '-' || ch == '$' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Number of lines, counting a trailing partial line.
pub fn line_count(code: &str) -> usize {
    code.split('\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_line() {
        let code = "a\nb\nconsole.log(x)\n";
        assert_eq!(find_line(code, "console.log"), 3);
        assert_eq!(find_line(code, "missing"), 1);
    }

    #[test]
    fn test_needs_terminator() {
        let code = "let x = 1\nif (x)\n{\n  foo()\n}\n// note\nbar();";
        assert_eq!(missing_terminator_lines(code), vec![1, 4]);
    }

    #[test]
    fn test_allman_headers_are_not_statements() {
        let code = "public void Run()\n{\n    Console.WriteLine(1);\n}";
        assert!(missing_terminator_lines(code).is_empty());
    }

    #[test]
    fn test_method_chain_continuation() {
        let code = "fetch(url)\n  .then(r => r.json());";
        assert!(missing_terminator_lines(code).is_empty());
    }

    #[test]
    fn test_max_nesting() {
        assert_eq!(max_nesting("a { b { c } } d { }", true), 3);
        assert_eq!(max_nesting("a {\n  b {\n    c {\n  }\n}\n}", true), 1);
        assert_eq!(max_nesting("", true), 0);
        assert_eq!(max_nesting("def f():\n    if x:\n        y()\n", false), 2);
    }

    #[test]
    fn test_name_words() {
        assert_eq!(name_words("userId"), vec!["user", "id"]);
        assert_eq!(name_words("is_active"), vec!["is", "active"]);
        assert_eq!(name_words("$total"), vec!["total"]);
        assert_eq!(name_words("width"), vec!["width"]);
    }

    #[test]
    fn test_braceless_control() {
        let lines = ["if (ok)", "    run();", "for (;;) {", "}", "while (x) step();"];
        assert!(is_braceless_control(&lines, 0));
        assert!(!is_braceless_control(&lines, 2));
        assert!(is_braceless_control(&lines, 4));
    }

    #[test]
    fn test_close_paren_end() {
        assert_eq!(close_paren_end("if (a(b)) c;"), Some(9));
        assert_eq!(close_paren_end("if (a"), None);
        assert_eq!(close_paren_end("none"), None);
    }

    #[test]
    fn test_has_try() {
        assert!(has_try("try {\n} catch (e) {}"));
        assert!(!has_try("retry(3)"));
    }

    #[test]
    fn test_line_of_offset() {
        let code = "one\ntwo\nthree";
        assert_eq!(line_of_offset(code, 0), 1);
        assert_eq!(line_of_offset(code, 5), 2);
        assert_eq!(line_of_offset(code, 100), 3);
    }
}
