//! Integration tests for the command-line surface over a small project tree.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use codecritic::cli::{self, Cli, Commands, EXIT_ERROR, EXIT_FAILED, EXIT_SUCCESS};
use codecritic::config::Config;
use codecritic::history::History;
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

#[test]
fn test_project_config_is_discovered() {
    let project = testdata_path().join("project");
    let config = Config::load(None, &project).unwrap();
    assert_eq!(config.timeout_secs, 5);
    assert_eq!(config.excluded_paths, vec!["generated/**".to_string()]);
    assert!(config.history_store().is_none());
}

#[test]
fn test_collect_files_honors_exclusions() {
    let project = testdata_path().join("project");
    let config = Config::load(None, &project).unwrap();
    let files = cli::collect_files(&project, &config.excluded_matcher().unwrap()).unwrap();

    let relative: Vec<String> = files
        .iter()
        .map(|p| {
            p.strip_prefix(&project)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    assert_eq!(relative, vec!["src/app.js", "src/util.py"]);
}

#[test]
fn test_analyze_exit_codes() {
    let leak = testdata_path().join("leak.cpp");
    let cli = Cli::try_parse_from([
        "codecritic",
        "analyze",
        leak.to_str().unwrap(),
        "--format",
        "json",
        "--no-history",
    ])
    .unwrap();
    let Commands::Analyze(args) = &cli.command else {
        panic!("expected analyze");
    };
    assert_eq!(
        cli::run_analyze(args, &Config::default()).unwrap(),
        EXIT_FAILED
    );

    let dir = TempDir::new().unwrap();
    let source = dir.path().join("snippet.rb");
    fs::write(&source, "puts 1").unwrap();
    let cli = Cli::try_parse_from(["codecritic", "analyze", source.to_str().unwrap()]).unwrap();
    let Commands::Analyze(args) = &cli.command else {
        panic!("expected analyze");
    };
    assert_eq!(
        cli::run_analyze(args, &Config::default()).unwrap(),
        EXIT_ERROR
    );
}

#[test]
fn test_fix_writes_in_place() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("app.js");
    fs::write(&source, "const total = 1\nconsole.log(total)\n").unwrap();

    let cli = Cli::try_parse_from(["codecritic", "fix", source.to_str().unwrap(), "--write"]).unwrap();
    let Commands::Fix(args) = &cli.command else {
        panic!("expected fix");
    };
    assert_eq!(
        cli::run_transform(args, codecritic::Mode::Fix).unwrap(),
        EXIT_SUCCESS
    );

    let fixed = fs::read_to_string(&source).unwrap();
    assert!(fixed.contains("const total = 1;"));
    assert!(fixed.contains("console.log(total);"));
}

#[test]
fn test_analyze_records_history_when_enabled() {
    let dir = TempDir::new().unwrap();
    let history_path = dir.path().join("history.jsonl");
    let config = Config::from_yaml(&format!(
        "history:\n  enabled: true\n  path: {}\n",
        history_path.display()
    ))
    .unwrap();

    let source = testdata_path().join("inventory.py");
    let cli = Cli::try_parse_from([
        "codecritic",
        "analyze",
        source.to_str().unwrap(),
        "--user",
        "ada",
        "--format",
        "json",
    ])
    .unwrap();
    let Commands::Analyze(args) = &cli.command else {
        panic!("expected analyze");
    };
    cli::run_analyze(args, &config).unwrap();

    let records = History::new(&history_path).recent(Some("ada"), 5).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].language, "python");
}
