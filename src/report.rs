//! Output formatting for codecritic results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: the result objects as they are serialized everywhere else

use std::fmt::Write as _;

use colored::*;
use serde::{Deserialize, Serialize};

use crate::analyzer::AnalysisResult;
use crate::detect::Severity;
use crate::history::HistoryRecord;
use crate::transform::{Mode, TransformOutcome};

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    #[default]
    Pretty,
    Json,
}

/// Analysis of one input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: String,
    pub result: AnalysisResult,
}

/// Print any result as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Analysis
// =============================================================================

pub fn write_analysis_pretty(reports: &[FileReport]) {
    print!("{}", render_header());
    for report in reports {
        print!("{}", render_analysis(&report.path, &report.result));
    }
    if reports.len() > 1 {
        print!("{}", render_totals(reports));
    }
}

fn render_header() -> String {
    format!(
        "\n  {} v{}\n\n",
        "codecritic".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    )
}

/// Pretty rendering of one analysis.
pub fn render_analysis(path: &str, result: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {}{}", "File:     ".dimmed(), path.blue());
    let _ = writeln!(out, "  {}{}", "Language: ".dimmed(), result.language);
    let _ = writeln!(out);

    if let Some(warning) = &result.warning {
        let _ = writeln!(out, "  {} {}", "!".yellow().bold(), warning.yellow());
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "  {}", result.summary);
    let _ = writeln!(
        out,
        "  Quality: {}/10  Complexity: {}/10",
        colored_estimate(result.quality),
        format!("{:.1}", result.complexity).dimmed()
    );
    let _ = writeln!(out);

    let metrics = &result.metrics;
    let _ = writeln!(out, "  {}:", "Scores".bold());
    for (label, value) in [
        ("readability", metrics.readability),
        ("security", metrics.security),
        ("performance", metrics.performance),
        ("overall", metrics.overall),
    ] {
        let _ = writeln!(out, "    {:<12} {}", label, colored_score(value));
    }
    let _ = writeln!(out);

    if !result.issues.is_empty() {
        let _ = writeln!(out, "  {} ({}):", "Issues".bold(), result.issues.len());
        let _ = writeln!(out);
        for issue in &result.issues {
            let _ = writeln!(
                out,
                "    {}   {:<22}{}",
                severity_tag(&issue.severity),
                issue.rule.dimmed(),
                format!("line {} [{}]", issue.line, issue.category).dimmed()
            );
            let _ = writeln!(out, "            {}", issue.message);
            let _ = writeln!(out);
        }
    }

    if !result.suggestions.is_empty() {
        let _ = writeln!(out, "  {} ({}):", "Suggestions".bold(), result.suggestions.len());
        for suggestion in &result.suggestions {
            let _ = writeln!(out, "    - {}", suggestion.description);
            if !suggestion.before.is_empty() {
                let _ = writeln!(out, "        {} {}", "-".red(), suggestion.before.red());
                let _ = writeln!(out, "        {} {}", "+".green(), suggestion.after.green());
            }
        }
        let _ = writeln!(out);
    }

    if !result.test_cases.is_empty() {
        let names: Vec<&str> = result.test_cases.iter().map(|t| t.name.as_str()).collect();
        let _ = writeln!(
            out,
            "  {} ({}): {}",
            "Test scaffolds".bold(),
            names.len(),
            names.join(", ").dimmed()
        );
        let _ = writeln!(out);
    }

    if let Some(ai) = &result.ai_analysis {
        let _ = writeln!(
            out,
            "  {}: {:.2}/10 (confidence {:.2})",
            "Classifier".bold(),
            ai.quality_score,
            ai.confidence
        );
        for note in &ai.suggestions {
            let _ = writeln!(out, "    - {}", note.dimmed());
        }
        let _ = writeln!(out);
    }
    out
}

fn render_totals(reports: &[FileReport]) -> String {
    let issues: usize = reports.iter().map(|r| r.result.issues.len()).sum();
    let partial = reports.iter().filter(|r| r.result.partial).count();
    let mean = reports.iter().map(|r| r.result.metrics.overall).sum::<f64>() / reports.len() as f64;
    let mut out = format!(
        "  {} {} files, {} issues, mean overall score {}",
        "Total:".bold(),
        reports.len(),
        issues,
        colored_score(mean)
    );
    if partial > 0 {
        let _ = write!(out, "  {}", format!("({} partial)", partial).yellow());
    }
    out.push_str("\n\n");
    out
}

fn severity_tag(severity: &Severity) -> ColoredString {
    match severity {
        Severity::Critical => "CRIT ".red().bold(),
        Severity::Error => "ERROR".red(),
        Severity::Warning => "WARN ".yellow(),
        Severity::Info => "INFO ".blue(),
    }
}

fn colored_score(score: f64) -> ColoredString {
    let text = format!("{:.2}", score);
    match score {
        s if s >= 85.0 => text.green().bold(),
        s if s >= 70.0 => text.green(),
        s if s >= 50.0 => text.yellow(),
        _ => text.red(),
    }
}

fn colored_estimate(estimate: f64) -> ColoredString {
    let text = format!("{:.1}", estimate);
    match estimate {
        e if e >= 8.0 => text.green(),
        e if e >= 5.0 => text.yellow(),
        _ => text.red(),
    }
}

// =============================================================================
// Transformations and history
// =============================================================================

/// Pretty rendering of a fix or enhance run: what changed, then the code.
pub fn render_transform(path: &str, mode: Mode, outcome: &TransformOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {} {}", format!("{}:", mode.as_str()).bold(), path.blue());
    if outcome.improvements.is_empty() {
        let _ = writeln!(out, "    {}", "no changes".dimmed());
    } else {
        for improvement in &outcome.improvements {
            let _ = writeln!(out, "    {} {}", "✓".green(), improvement);
        }
        let _ = writeln!(
            out,
            "    {}",
            format!("{} line(s) changed", outcome.changed_lines).dimmed()
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", outcome.code);
    out
}

/// One line per stored analysis.
pub fn render_history(records: &[HistoryRecord]) -> String {
    if records.is_empty() {
        return format!("  {}\n", "no history".dimmed());
    }
    let mut out = String::new();
    for record in records {
        let marker = if record.result.partial {
            " (partial)".yellow()
        } else {
            "".normal()
        };
        let _ = writeln!(
            out,
            "  {}  {:<10} {:<12} {} issues, overall {}{}",
            record.id.dimmed(),
            record.user_id,
            record.language,
            record.result.issues.len(),
            colored_score(record.result.metrics.overall),
            marker
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_render_degraded_analysis() {
        plain();
        let result = AnalysisResult::timed_out(Language::Java);
        let text = render_analysis("Main.java", &result);
        assert!(text.contains("File:     Main.java"));
        assert!(text.contains("Analysis is taking longer than expected"));
        assert!(text.contains("analysis-timeout"));
        assert!(text.contains("overall      50.00"));
    }

    #[test]
    fn test_render_transform() {
        plain();
        let outcome = TransformOutcome {
            code: "const x = 1;".to_string(),
            improvements: vec!["Added missing semicolons".to_string()],
            changed_lines: 1,
        };
        let text = render_transform("a.js", Mode::Fix, &outcome);
        assert!(text.contains("fix: a.js"));
        assert!(text.contains("✓ Added missing semicolons"));
        assert!(text.ends_with("const x = 1;\n"));

        let text = render_transform("a.js", Mode::Enhance, &TransformOutcome::unchanged("x"));
        assert!(text.contains("no changes"));
    }

    #[test]
    fn test_render_totals() {
        plain();
        let reports = vec![
            FileReport {
                path: "a.py".to_string(),
                result: AnalysisResult::timed_out(Language::Python),
            },
            FileReport {
                path: "b.py".to_string(),
                result: AnalysisResult::failed(Language::Python),
            },
        ];
        let text = render_totals(&reports);
        assert!(text.contains("2 files, 2 issues, mean overall score 50.00"));
        assert!(text.contains("(2 partial)"));
    }

    #[test]
    fn test_render_empty_history() {
        plain();
        assert!(render_history(&[]).contains("no history"));
    }
}
