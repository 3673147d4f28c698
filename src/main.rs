use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use csv_report_analyzer::{Analyzer, ColumnConfig, ProcessorError, ReportConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "csv-report-analyzer", version, about = "Aggregate CSV data into reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// One-dimensional report: print a single value
    Scalar {
        #[arg(long)]
        csv: PathBuf,
        /// JSON column config
        #[arg(long)]
        config: PathBuf,
    },
    /// Two-dimensional report: print per-group records as JSON
    Chart {
        #[arg(long)]
        csv: PathBuf,
        /// JSON report config
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
}

fn run(cli: Cli) -> Result<String, ProcessorError> {
    match cli.command {
        Command::Scalar { csv, config } => {
            let config = ColumnConfig::from_path(&config)?;
            Analyzer::load_csv(&csv)?.analyze_one_dimensional(&config)
        }
        Command::Chart {
            csv,
            config,
            pretty,
        } => {
            let config = ReportConfig::from_path(&config)?;
            let records = Analyzer::load_csv(&csv)?.analyze_two_dimensional(&config)?;
            let json = if pretty {
                serde_json::to_string_pretty(&records)?
            } else {
                serde_json::to_string(&records)?
            };
            Ok(json)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
