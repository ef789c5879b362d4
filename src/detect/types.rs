//! Core types for detection results.

use serde::{Deserialize, Serialize};

/// Severity levels for issues, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Error and critical findings carry heavier score penalties.
    pub fn is_severe(&self) -> bool {
        matches!(self, Severity::Error | Severity::Critical)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Issue categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Readability,
    Security,
    Performance,
    Robustness,
    Style,
    Documentation,
    Resource,
    Modernization,
    Syntax,
}

/// Score dimension an issue category counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Readability,
    Security,
    Performance,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Readability => "readability",
            Category::Security => "security",
            Category::Performance => "performance",
            Category::Robustness => "robustness",
            Category::Style => "style",
            Category::Documentation => "documentation",
            Category::Resource => "resource",
            Category::Modernization => "modernization",
            Category::Syntax => "syntax",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "readability" => Some(Category::Readability),
            "security" => Some(Category::Security),
            "performance" => Some(Category::Performance),
            "robustness" => Some(Category::Robustness),
            "style" => Some(Category::Style),
            "documentation" => Some(Category::Documentation),
            "resource" => Some(Category::Resource),
            "modernization" => Some(Category::Modernization),
            "syntax" => Some(Category::Syntax),
            _ => None,
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Category::Security | Category::Robustness => Dimension::Security,
            Category::Performance | Category::Resource => Dimension::Performance,
            Category::Readability
            | Category::Style
            | Category::Documentation
            | Category::Syntax
            | Category::Modernization => Dimension::Readability,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single detected issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Identifier of the detector that produced the issue.
    pub rule: String,
    /// 1-based line, best effort.
    pub line: usize,
    pub message: String,
    pub severity: Severity,
    pub category: Category,
}

impl Issue {
    /// Create a unique key for this issue (for deduplication/comparison).
    pub fn key(&self) -> String {
        format!("{}|{}|{}", self.rule, self.line, self.message)
    }
}

/// A proposed change, optionally with a before/after snippet pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub description: String,
    #[serde(rename = "originalCode", default, skip_serializing_if = "String::is_empty")]
    pub before: String,
    #[serde(rename = "improvedCode", default, skip_serializing_if = "String::is_empty")]
    pub after: String,
}

impl Suggestion {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            before: String::new(),
            after: String::new(),
        }
    }

    pub fn with_snippets(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.before = before.into();
        self.after = after.into();
        self
    }
}

/// Issues and suggestions produced by one or more detectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Findings {
    pub issues: Vec<Issue>,
    pub suggestions: Vec<Suggestion>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another set of findings into this one, preserving order.
    pub fn merge(&mut self, other: Findings) {
        self.issues.extend(other.issues);
        self.suggestions.extend(other.suggestions);
    }

    /// Number of error or critical issues.
    pub fn severe_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity.is_severe()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty() && self.suggestions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Error);
        assert!(Severity::Warning > Severity::Info);
        assert!(Severity::Error.is_severe());
        assert!(!Severity::Warning.is_severe());
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("CRITICAL".parse::<Severity>(), Ok(Severity::Critical));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_category_dimensions() {
        assert_eq!(Category::Robustness.dimension(), Dimension::Security);
        assert_eq!(Category::Resource.dimension(), Dimension::Performance);
        assert_eq!(Category::Style.dimension(), Dimension::Readability);
        assert_eq!(Category::parse("syntax"), Some(Category::Syntax));
        assert_eq!(Category::parse("debug"), None);
    }

    #[test]
    fn test_suggestion_json_shape() {
        let s = Suggestion::new("Use const").with_snippets("var x = 1;", "const x = 1;");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["originalCode"], "var x = 1;");
        assert_eq!(json["improvedCode"], "const x = 1;");

        let bare = serde_json::to_value(Suggestion::new("Add tests")).unwrap();
        assert!(bare.get("originalCode").is_none());
    }
}
