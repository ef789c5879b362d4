//! codecritic CLI entry point.

use clap::Parser;
use codecritic::cli::{self, Cli, EXIT_ERROR};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable overriding the `-v` log level.
const LOG_ENV: &str = "CODECRITIC_LOG";

fn main() {
    let cli = Cli::parse();

    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| cli::log_filter(cli.verbose).to_string());
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));
    tracing_subscriber::registry().with(stderr_layer).init();

    let exit_code = match cli::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
