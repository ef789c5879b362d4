//! Command-line interface for codecritic.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use globset::GlobSet;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::analyzer::{AnalysisResult, EngineError};
use crate::config::Config;
use crate::history::History;
use crate::language::Language;
use crate::orchestrator::Engine;
use crate::report::{self, FileReport, Format};
use crate::transform::Mode;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Path argument meaning standard input.
const STDIN_PATH: &str = "-";

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", "vendor", "target", "build", "dist", "__pycache__"];

/// Heuristic code review: detect issues, score quality, scaffold tests and
/// rewrite code in JavaScript, Python, Java, PHP, C++ and C#.
#[derive(Parser)]
#[command(name = "codecritic")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect issues and score a file, a directory or stdin
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),
    /// Generate a test scaffold for the first routine in a file
    Tests(SourceArgs),
    /// Apply corrective rewrites
    Fix(TransformArgs),
    /// Apply corrective then modernizing rewrites
    Enhance(TransformArgs),
    /// List stored analyses
    History(HistoryArgs),
}

/// A single source: a file, or `-` for stdin.
#[derive(Args)]
pub struct SourceArgs {
    /// File to read, or - for stdin
    pub path: PathBuf,

    /// Source language (default: from the file extension)
    #[arg(short, long)]
    pub language: Option<String>,
}

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// File or directory to analyze, or - for stdin
    pub path: PathBuf,

    /// Source language (default: from the file extension)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
    pub format: Format,

    /// Submitter recorded in the history
    #[arg(short, long)]
    pub user: Option<String>,

    /// Per-file deadline in seconds (overrides the config file)
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Do not record this run in the history
    #[arg(long)]
    pub no_history: bool,
}

/// Arguments for the fix and enhance commands.
#[derive(Args)]
pub struct TransformArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
    pub format: Format,

    /// Rewrite the file in place instead of printing
    #[arg(short, long)]
    pub write: bool,
}

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    /// Only show analyses by this submitter
    #[arg(short, long)]
    pub user: Option<String>,

    /// Number of records to show
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
    pub format: Format,
}

/// Log filter for a `-v` count.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Dispatch a parsed command line.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    let cwd = std::env::current_dir()?;
    let config = match Config::load(cli.config.as_deref(), &cwd) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: invalid config: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match &cli.command {
        Commands::Analyze(args) => run_analyze(args, &config),
        Commands::Tests(args) => run_tests(args),
        Commands::Fix(args) => run_transform(args, Mode::Fix),
        Commands::Enhance(args) => run_transform(args, Mode::Enhance),
        Commands::History(args) => run_history(args, &config),
    }
}

/// Build the engine described by `config`.
pub fn build_engine(config: &Config, timeout: Duration, record_history: bool) -> Engine {
    let mut engine = Engine::default().with_timeout(timeout);

    if config.classifier.enabled {
        match classifier_from_config(config) {
            Ok(classifier) => {
                engine = engine
                    .with_classifier(classifier)
                    .with_classifier_budget(Duration::from_millis(config.classifier.timeout_ms));
            }
            Err(e) => warn!(error = %e, "quality classifier unavailable, continuing without it"),
        }
    }

    if record_history {
        if let Some(history) = config.history_store() {
            debug!(path = %history.path().display(), "recording history");
            engine = engine.with_history(Arc::new(history));
        }
    }
    engine
}

#[cfg(feature = "http-classifier")]
fn classifier_from_config(
    config: &Config,
) -> anyhow::Result<Arc<dyn crate::classifier::QualityClassifier>> {
    let settings = &config.classifier;
    let endpoint = settings
        .endpoint
        .as_deref()
        .context("classifier.endpoint is not set")?;
    let classifier = crate::classifier::HttpClassifier::new(
        endpoint,
        settings.max_tokens,
        Duration::from_millis(settings.timeout_ms),
    )?;
    Ok(Arc::new(classifier))
}

#[cfg(not(feature = "http-classifier"))]
fn classifier_from_config(
    _config: &Config,
) -> anyhow::Result<Arc<dyn crate::classifier::QualityClassifier>> {
    anyhow::bail!("built without the http-classifier feature")
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_PATH
}

/// Language from `--language`, else from the file extension.
fn resolve_language(path: &Path, explicit: Option<&str>) -> anyhow::Result<String> {
    if let Some(language) = explicit {
        return Ok(language.to_string());
    }
    if is_stdin(path) {
        anyhow::bail!("--language is required when reading from stdin");
    }
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    Language::from_extension(ext)
        .map(|l| l.as_str().to_string())
        .with_context(|| format!("cannot tell the language of {}, pass --language", path.display()))
}

/// Read a file, or stdin for `-`.
fn read_source(path: &Path) -> anyhow::Result<String> {
    if is_stdin(path) {
        let mut code = String::new();
        std::io::stdin()
            .read_to_string(&mut code)
            .context("failed to read stdin")?;
        return Ok(code);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Collect analyzable files under `root`.
pub fn collect_files(root: &Path, excluded: &GlobSet) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            // Skip hidden and dependency directories
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if excluded.is_match(relative) {
            debug!(path = %relative.display(), "excluded by config");
            continue;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if Language::from_extension(ext).is_some() {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Exit code for a set of analyses.
pub fn exit_code(results: &[&AnalysisResult]) -> i32 {
    if results.iter().any(|r| r.has_severe_issues()) {
        EXIT_FAILED
    } else {
        EXIT_SUCCESS
    }
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs, config: &Config) -> anyhow::Result<i32> {
    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.timeout());
    let engine = build_engine(config, timeout, !args.no_history);
    let user = args.user.as_deref();

    let reports = if !is_stdin(&args.path) && args.path.is_dir() {
        let excluded = config.excluded_matcher()?;
        let files = collect_files(&args.path, &excluded)?;
        if files.is_empty() {
            eprintln!("Warning: no files to analyze");
            return Ok(EXIT_SUCCESS);
        }
        analyze_files(&engine, &files, args.language.as_deref(), user, args.format)?
    } else {
        let language = match resolve_language(&args.path, args.language.as_deref()) {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                return Ok(EXIT_ERROR);
            }
        };
        let code = match read_source(&args.path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                return Ok(EXIT_ERROR);
            }
        };
        match engine.analyze_blocking(&code, &language, user) {
            Ok(result) => vec![FileReport {
                path: args.path.to_string_lossy().to_string(),
                result,
            }],
            Err(e) => {
                match e.downcast_ref::<EngineError>() {
                    Some(engine_error) => eprintln!("Error: {}", engine_error),
                    None => eprintln!("Error: {:#}", e),
                }
                return Ok(EXIT_ERROR);
            }
        }
    };

    match args.format {
        Format::Json if reports.len() == 1 => report::write_json(&reports[0].result)?,
        Format::Json => report::write_json(&reports)?,
        Format::Pretty => report::write_analysis_pretty(&reports),
    }

    let results: Vec<&AnalysisResult> = reports.iter().map(|r| &r.result).collect();
    Ok(exit_code(&results))
}

/// Analyze many files in parallel on one runtime.
fn analyze_files(
    engine: &Engine,
    files: &[PathBuf],
    language: Option<&str>,
    user: Option<&str>,
    format: Format,
) -> anyhow::Result<Vec<FileReport>> {
    let runtime = tokio::runtime::Runtime::new()?;
    let handle = runtime.handle().clone();

    let progress = if format == Format::Pretty {
        ProgressBar::new(files.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_style(
        ProgressStyle::with_template("  {bar:30.cyan/blue} {pos}/{len} {wide_msg}")?
            .progress_chars("=> "),
    );

    let reports: Vec<FileReport> = files
        .par_iter()
        .filter_map(|path| {
            progress.set_message(path.display().to_string());
            let analyzed = resolve_language(path, language).and_then(|language| {
                let code = read_source(path)?;
                Ok(handle.block_on(engine.analyze(&code, &language, user))?)
            });
            progress.inc(1);
            match analyzed {
                Ok(result) => Some(FileReport {
                    path: path.to_string_lossy().to_string(),
                    result,
                }),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping file");
                    None
                }
            }
        })
        .collect();

    progress.finish_and_clear();
    runtime.shutdown_background();
    Ok(reports)
}

/// Run the tests command.
pub fn run_tests(args: &SourceArgs) -> anyhow::Result<i32> {
    let (code, language) = match load_source(args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };
    println!("{}", Engine::default().generate_tests(&code, &language));
    Ok(EXIT_SUCCESS)
}

/// Run the fix or enhance command.
pub fn run_transform(args: &TransformArgs, mode: Mode) -> anyhow::Result<i32> {
    let (code, language) = match load_source(&args.source) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let engine = Engine::default();
    let outcome = match mode {
        Mode::Fix => engine.fix(&code, &language),
        Mode::Enhance => engine.enhance(&code, &language),
    };

    if args.write {
        if is_stdin(&args.source.path) {
            eprintln!("Error: --write needs a file path");
            return Ok(EXIT_ERROR);
        }
        if outcome.code != code {
            std::fs::write(&args.source.path, &outcome.code).with_context(|| {
                format!("failed to write {}", args.source.path.display())
            })?;
        }
    }

    match args.format {
        Format::Json => report::write_json(&outcome)?,
        Format::Pretty if args.write => {
            for improvement in &outcome.improvements {
                println!("{}", improvement);
            }
        }
        Format::Pretty => print!(
            "{}",
            report::render_transform(&args.source.path.to_string_lossy(), mode, &outcome)
        ),
    }
    Ok(EXIT_SUCCESS)
}

fn load_source(args: &SourceArgs) -> anyhow::Result<(String, String)> {
    let language = resolve_language(&args.path, args.language.as_deref())?;
    let code = read_source(&args.path)?;
    Ok((code, language))
}

/// Run the history command.
pub fn run_history(args: &HistoryArgs, config: &Config) -> anyhow::Result<i32> {
    let Some(location) = config.history_location() else {
        eprintln!("Error: no history location, set history.path in the config");
        return Ok(EXIT_ERROR);
    };
    let records = History::new(location).recent(args.user.as_deref(), args.limit)?;
    match args.format {
        Format::Json => report::write_json(&records)?,
        Format::Pretty => print!("{}", report::render_history(&records)),
    }
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["codecritic", "-vv", "analyze", "src", "-f", "json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.format, Format::Json);
                assert_eq!(args.path, PathBuf::from("src"));
            }
            _ => panic!("expected analyze"),
        }

        let cli = Cli::try_parse_from(["codecritic", "fix", "-", "-l", "python", "--write"]).unwrap();
        assert!(matches!(cli.command, Commands::Fix(ref a) if a.write && a.source.language.as_deref() == Some("python")));

        assert!(Cli::try_parse_from(["codecritic", "analyze", "x", "-f", "sarif"]).is_err());
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(0), "warn");
        assert_eq!(log_filter(1), "debug");
        assert_eq!(log_filter(5), "trace");
    }

    #[test]
    fn test_resolve_language() {
        assert_eq!(resolve_language(Path::new("a.py"), None).unwrap(), "python");
        assert_eq!(resolve_language(Path::new("a.txt"), Some("cpp")).unwrap(), "cpp");
        assert!(resolve_language(Path::new("-"), None).is_err());
        assert!(resolve_language(Path::new("README"), None).is_err());
    }

    #[test]
    fn test_collect_files_skips_hidden_and_excluded() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join("generated")).unwrap();
        fs::write(root.join("src/app.js"), "let x = 1;").unwrap();
        fs::write(root.join("src/notes.md"), "# notes").unwrap();
        fs::write(root.join(".git/hook.py"), "x = 1").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "x").unwrap();
        fs::write(root.join("generated/out.py"), "x = 1").unwrap();

        let config = Config::from_yaml("excluded_paths: ['generated/**']").unwrap();
        let files = collect_files(root, &config.excluded_matcher().unwrap()).unwrap();
        assert_eq!(files, vec![root.join("src/app.js")]);
    }

    #[test]
    fn test_exit_code() {
        let partial = AnalysisResult::timed_out(Language::Php);
        assert_eq!(exit_code(&[&partial]), EXIT_SUCCESS);
        let mut severe = partial.clone();
        severe.issues[0].severity = crate::detect::Severity::Critical;
        assert_eq!(exit_code(&[&partial, &severe]), EXIT_FAILED);
    }

    #[test]
    fn test_build_engine_uses_config() {
        let dir = TempDir::new().unwrap();
        let yaml = format!(
            "history:\n  enabled: true\n  path: {}\n",
            dir.path().join("h.jsonl").display()
        );
        let config = Config::from_yaml(&yaml).unwrap();
        let engine = build_engine(&config, Duration::from_secs(3), true);
        assert_eq!(engine.timeout(), Duration::from_secs(3));
        engine.analyze_blocking("x = 1\n", "python", Some("ada")).unwrap();
        let records = History::new(dir.path().join("h.jsonl")).recent(None, 5).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_id, "ada");
    }
}
