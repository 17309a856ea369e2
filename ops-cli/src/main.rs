use clap::Parser;
use colored::*;
use logger_redacted::LoggerConfig;
use ops_cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logger = LoggerConfig {
        log_level: if cli.verbose { "debug" } else { "warn" }.to_string(),
        ..LoggerConfig::default()
    };
    if let Err(e) = logger_redacted::init(&logger) {
        eprintln!("{} {}", "warning:".yellow(), e);
    }

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
