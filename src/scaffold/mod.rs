//! Test scaffold generation.
//!
//! Finds the first routine in a snippet, guesses typical, edge-case and
//! missing values for its parameters from their names and declared types,
//! guesses what the result should look like, and renders three test cases in
//! the language's usual test framework. The output is an authoring aid: it
//! is always well-formed boilerplate, never a claim about correctness.

pub mod hints;
mod render;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detect::lexical::line_of_offset;
use crate::extract::{extract_all, extract_first, Routine};
use crate::language::Language;

pub use hints::{assertion_for, hint_for, AssertionShape, ValueHint};

use render::Case;

/// Class name used when a method's enclosing class is not in the snippet.
const DEFAULT_OWNER: &str = "MyClass";

lazy_static! {
    static ref CLASS_DECLARATION: Regex = Regex::new(r"\bclass\s+(\w+)").unwrap();
    static ref STATIC_MODIFIER: Regex = Regex::new(r"\bstatic\b").unwrap();
}

/// One generated test, as listed in an analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub code: String,
    pub description: String,
}

/// Everything a renderer needs for one routine.
#[derive(Debug, Clone)]
pub(crate) struct Plan {
    pub name: String,
    /// Enclosing class, for languages that call methods on an instance.
    pub owner: Option<String>,
    pub is_static: bool,
    pub return_kind: Option<String>,
    pub basic: Vec<String>,
    pub edge: Vec<String>,
    pub invalid: Vec<String>,
    pub shape: AssertionShape,
    /// Whether `shape` comes from the declared return type.
    pub declared: bool,
}

impl Plan {
    fn new(routine: &Routine, code: &str, language: Language) -> Self {
        let hinted: Vec<_> = routine
            .parameters
            .iter()
            .map(|p| (p, hint_for(p)))
            .collect();
        let values = |case: Case| -> Vec<String> {
            hinted
                .iter()
                .map(|(p, hint)| render::literal(p, *hint, language, case))
                .collect()
        };
        let shape = assertion_for(routine);

        Self {
            name: routine.name.clone(),
            owner: enclosing_class(code, routine.line, language),
            is_static: signature_line(code, routine.line)
                .is_some_and(|l| STATIC_MODIFIER.is_match(l)),
            return_kind: routine.return_kind.clone(),
            basic: values(Case::Basic),
            edge: values(Case::Edge),
            invalid: values(Case::Invalid),
            shape,
            declared: hints::declared_shape(routine.return_kind.as_deref()) == Some(shape),
        }
    }
}

fn signature_line(code: &str, line: usize) -> Option<&str> {
    code.lines().nth(line.saturating_sub(1))
}

/// Last class declared at or before `line`. Java and C# methods always have
/// one, so those fall back to a stand-in name.
fn enclosing_class(code: &str, line: usize, language: Language) -> Option<String> {
    if !matches!(language, Language::Java | Language::CSharp | Language::Php) {
        return None;
    }
    let found = CLASS_DECLARATION
        .captures_iter(code)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            (line_of_offset(code, m.start()) <= line).then(|| caps[1].to_string())
        })
        .last();
    match (found, language) {
        (Some(name), _) => Some(name),
        (None, Language::Php) => None,
        (None, _) => Some(DEFAULT_OWNER.to_string()),
    }
}

/// Render the scaffold for one extracted routine.
pub fn render_routine(routine: &Routine, code: &str, language: Language) -> String {
    render::render(language, &Plan::new(routine, code, language))
}

/// Scaffold for the first routine in `code`, or a placeholder scaffold when
/// none is found.
pub fn generate(code: &str, language: Language) -> String {
    match extract_first(code, language) {
        Some(routine) => {
            debug!(routine = %routine.name, %language, "rendering test scaffold");
            render_routine(&routine, code, language)
        }
        None => {
            debug!(%language, "no routine found, using placeholder scaffold");
            render::placeholder(language).to_string()
        }
    }
}

/// Like [`generate`], for a language identifier that may not be supported.
/// Unsupported languages get a framework-free placeholder.
pub fn generate_tests(code: &str, language: &str) -> String {
    match language.parse::<Language>() {
        Ok(language) => generate(code, language),
        Err(_) => render::generic_placeholder(language),
    }
}

/// One test case per extracted routine, in source order.
pub fn test_cases(code: &str, language: Language) -> Vec<TestCase> {
    extract_all(code, language)
        .iter()
        .map(|routine| TestCase {
            name: format!("Test {}()", routine.name),
            code: render_routine(routine, code, language),
            description: format!(
                "Basic {} test for the {} function",
                language.test_framework(),
                routine.name
            ),
        })
        .collect()
}
