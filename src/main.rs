//! Sales Insights - command-line front end.
//!
//! Loads one sales export, runs the insight engine and prints the bundle as
//! JSON on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use sales_insights::logging::{init_logging, LogFormat};
use sales_insights::{Config, InsightEngine, TableLoader};

#[derive(Debug, Parser)]
#[command(name = "sales-insights", version, about = "Derive insights from a sales export")]
struct Cli {
    /// CSV, XLSX or XLS file to analyze.
    file: PathBuf,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Log output format (logs go to stderr).
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether the engine produced a success bundle.
fn run(cli: &Cli) -> Result<bool> {
    let config = Config::from_env()?;
    init_logging(cli.log_format, &config.log_filter)?;

    let loader = TableLoader::from_config(&config);
    let bundle = InsightEngine::analyze_file(&cli.file, &loader);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&bundle)
    } else {
        serde_json::to_string(&bundle)
    }
    .context("failed to serialize insight bundle")?;
    println!("{json}");

    Ok(bundle.is_success())
}
