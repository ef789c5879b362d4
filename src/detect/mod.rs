//! Detection rules and their shared building blocks.

mod detector;
pub mod languages;
pub mod lexical;
mod types;

pub use detector::{DetectFn, Detector, Emitter};
pub use types::*;

use regex::Regex;

/// A modern language idiom whose usage is counted.
#[derive(Debug, Clone, Copy)]
pub struct Idiom {
    pub name: &'static str,
    pub pattern: &'static Regex,
}

impl Idiom {
    pub fn count(&self, code: &str) -> usize {
        self.pattern.find_iter(code).count()
    }
}

/// Total usage of a set of idioms.
pub fn idiom_total(idioms: &[Idiom], code: &str) -> usize {
    idioms.iter().map(|i| i.count(code)).sum()
}

/// Regexes describing the coarse structure of a language: control flow
/// keywords, routine declarations and class declarations.
#[derive(Debug, Clone, Copy)]
pub struct Structure {
    pub control_keywords: &'static Regex,
    pub routines: &'static Regex,
    pub classes: &'static Regex,
}

impl Structure {
    pub fn control_count(&self, code: &str) -> usize {
        self.control_keywords.find_iter(code).count()
    }

    pub fn routine_count(&self, code: &str) -> usize {
        self.routines.find_iter(code).count()
    }

    pub fn class_count(&self, code: &str) -> usize {
        self.classes.find_iter(code).count()
    }
}
