//! Per-language detector catalogues.
//!
//! Each module exposes `detectors()` in registration order, the `idioms()`
//! counted for modernity, and the `structure()` regexes used by the
//! complexity estimate.

pub mod cpp;
pub mod csharp;
pub mod java;
pub mod javascript;
pub mod php;
pub mod python;

use regex::Regex;

use super::lexical::{find_line_regex, has_try, missing_terminator_lines};
use super::{idiom_total, Emitter, Idiom, Suggestion};

/// Minimum code length before a missing `try` is worth reporting.
pub(crate) const ERROR_HANDLING_MIN_LEN: usize = 200;

/// Minimum code length before missing modern idioms are worth suggesting.
pub(crate) const IDIOM_MIN_LEN: usize = 100;

/// Report all statements missing a `;` as a single counted issue.
pub(crate) fn report_missing_terminators(code: &str, out: &mut Emitter<'_>) {
    let lines = missing_terminator_lines(code);
    if let Some(&first) = lines.first() {
        out.issue(
            first,
            format!("Missing semicolons detected ({} occurrences)", lines.len()),
        );
    }
}

/// Report debug output statements that should go through a logger.
pub(crate) fn report_debug_output(code: &str, out: &mut Emitter<'_>, re: &Regex, what: &str) {
    let count = re.find_iter(code).count();
    if count > 0 {
        out.issue(
            find_line_regex(code, re),
            format!(
                "Found {} {} statements that should use logging in production",
                count, what
            ),
        );
    }
}

/// Report code with no exception handling at all.
pub(crate) fn report_missing_error_handling(
    code: &str,
    out: &mut Emitter<'_>,
    min_len: usize,
    construct: &str,
    example: (&str, &str),
) {
    if has_try(code) || code.len() <= min_len {
        return;
    }
    out.issue(1, "No exception handling found in code");
    out.suggest(
        Suggestion::new(format!(
            "Consider adding {} blocks for error handling",
            construct
        ))
        .with_snippets(example.0, example.1),
    );
}

/// Suggest modern idioms when none are used in a non-trivial snippet.
pub(crate) fn suggest_missing_idioms(
    code: &str,
    out: &mut Emitter<'_>,
    idioms: &[Idiom],
    message: &str,
) {
    if code.len() > IDIOM_MIN_LEN && idiom_total(idioms, code) == 0 {
        out.suggest(Suggestion::new(message));
    }
}
