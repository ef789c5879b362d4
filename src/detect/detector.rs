//! Detector definitions and the emitter they report through.

use super::{Category, Findings, Issue, Severity, Suggestion};

/// Signature of a detector body. Detectors read the source text and report
/// through the emitter; they never see other detectors' output.
pub type DetectFn = fn(&str, &mut Emitter<'_>);

/// A named, tagged detection rule.
#[derive(Clone, Copy)]
pub struct Detector {
    pub id: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub run: DetectFn,
}

impl Detector {
    pub const fn new(
        id: &'static str,
        category: Category,
        severity: Severity,
        run: DetectFn,
    ) -> Self {
        Self {
            id,
            category,
            severity,
            run,
        }
    }

    /// Run this detector over `code`, collecting its findings.
    ///
    /// Panics propagate; isolation is the caller's job.
    pub fn detect(&self, code: &str) -> Findings {
        let mut emitter = Emitter::new(self);
        (self.run)(code, &mut emitter);
        emitter.into_findings()
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("severity", &self.severity)
            .finish()
    }
}

/// Collects findings for one detector run, stamping each issue with the
/// detector's identity and tags.
pub struct Emitter<'a> {
    detector: &'a Detector,
    findings: Findings,
}

impl<'a> Emitter<'a> {
    fn new(detector: &'a Detector) -> Self {
        Self {
            detector,
            findings: Findings::new(),
        }
    }

    /// Report an issue at a 1-based line.
    pub fn issue(&mut self, line: usize, message: impl Into<String>) {
        self.findings.issues.push(Issue {
            rule: self.detector.id.to_string(),
            line: line.max(1),
            message: message.into(),
            severity: self.detector.severity,
            category: self.detector.category,
        });
    }

    /// Report a suggestion, with or without an accompanying issue.
    pub fn suggest(&mut self, suggestion: Suggestion) {
        self.findings.suggestions.push(suggestion);
    }

    fn into_findings(self) -> Findings {
        self.findings
    }
}
