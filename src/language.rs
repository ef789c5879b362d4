//! Supported source languages.

use serde::{Deserialize, Serialize};

/// A language the engine has rules for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Python,
    Java,
    Php,
    Cpp,
    #[serde(rename = "csharp")]
    CSharp,
}

impl Language {
    /// All supported languages, in registry order.
    pub const ALL: [Language; 6] = [
        Language::JavaScript,
        Language::Python,
        Language::Java,
        Language::Php,
        Language::Cpp,
        Language::CSharp,
    ];

    /// Canonical identifier, as accepted by `FromStr` and emitted in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Php => "php",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::Php => "PHP",
            Language::Cpp => "C++",
            Language::CSharp => "C#",
        }
    }

    /// Test framework the scaffold generator renders for.
    pub fn test_framework(&self) -> &'static str {
        match self {
            Language::JavaScript => "Jest",
            Language::Python => "unittest",
            Language::Java => "JUnit",
            Language::Php => "PHPUnit",
            Language::Cpp => "GoogleTest",
            Language::CSharp => "xUnit",
        }
    }

    /// Whether statements end with `;` and blocks are delimited by braces.
    pub fn is_brace_delimited(&self) -> bool {
        !matches!(self, Language::Python)
    }

    /// Determine the language from a file extension (without dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "php" => Some(Language::Php),
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "h" => Some(Language::Cpp),
            "cs" => Some(Language::CSharp),
            _ => None,
        }
    }

    /// File extensions handled for this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::Python => &["py"],
            Language::Java => &["java"],
            Language::Php => &["php"],
            Language::Cpp => &["cpp", "cc", "cxx", "hpp", "hh", "h"],
            Language::CSharp => &["cs"],
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned for language identifiers outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0}")]
pub struct UnsupportedLanguage(pub String);

impl std::str::FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "javascript" | "js" => Ok(Language::JavaScript),
            "python" | "py" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "php" => Ok(Language::Php),
            "cpp" | "c++" | "cxx" => Ok(Language::Cpp),
            "csharp" | "cs" | "c#" => Ok(Language::CSharp),
            _ => Err(UnsupportedLanguage(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("JavaScript".parse::<Language>(), Ok(Language::JavaScript));
        assert_eq!("c++".parse::<Language>(), Ok(Language::Cpp));
        assert_eq!("C#".parse::<Language>(), Ok(Language::CSharp));
        assert_eq!(" py ".parse::<Language>(), Ok(Language::Python));
    }

    #[test]
    fn test_unknown_language_is_distinct_error() {
        let err = "cobol".parse::<Language>().unwrap_err();
        assert_eq!(err, UnsupportedLanguage("cobol".to_string()));
        assert_eq!(err.to_string(), "unsupported language: cobol");
    }

    #[test]
    fn test_identifier_round_trip() {
        for lang in Language::ALL {
            assert_eq!(lang.as_str().parse::<Language>(), Ok(lang));
        }
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("tsx"), None);
        assert_eq!(Language::from_extension("HPP"), Some(Language::Cpp));
        assert_eq!(Language::from_extension("cs"), Some(Language::CSharp));
    }

    #[test]
    fn test_serde_identifier() {
        let json = serde_json::to_string(&Language::CSharp).unwrap();
        assert_eq!(json, "\"csharp\"");
    }
}
