use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

mod archive;
mod browser;
mod catalog;
mod config;
mod crypto;
mod error;
mod items;
mod output;
mod pipeline;
mod report;
mod run;
mod snapshot;

use config::{OutputFormat, RunConfig};

#[derive(Parser)]
#[command(name = "browser-data-export")]
#[command(about = "Export passwords/cookies/history/bookmarks from local browser profiles")]
#[command(version)]
struct Cli {
    /// Browser to export: "all" or one supported name (see --help output of -b)
    #[arg(short = 'b', long, default_value = "all")]
    browser: String,

    /// Export directory for per-item result files
    #[arg(long = "results-dir", alias = "dir", default_value = "results")]
    results_dir: PathBuf,

    /// Output format: csv, json or console
    #[arg(short = 'f', long, default_value = "csv")]
    format: String,

    /// Custom profile directory (chrome://version shows the active one);
    /// bypasses default profile discovery
    #[arg(short = 'p', long = "profile-dir-path")]
    profile_dir_path: Option<PathBuf>,

    /// Custom key material file, used instead of the platform key store
    #[arg(short = 'k', long = "key-file-path")]
    key_file_path: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, alias = "vv")]
    verbose: bool,

    /// Compress the export directory into one archive after the run
    #[arg(long, alias = "cc")]
    compress: bool,

    /// Aggregate every extracted item into one JSON report line on stdout
    #[arg(long = "all-in-one", alias = "one")]
    all_in_one: bool,
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr: in combined-report mode stdout must carry exactly
    // one line, the report itself.
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::ERROR
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let format = match OutputFormat::parse(&cli.format) {
        Some(format) => format,
        None => {
            warn!("unknown format {:?}, falling back to csv", cli.format);
            OutputFormat::Csv
        }
    };

    let cfg = RunConfig::new(
        cli.browser,
        cli.results_dir,
        format,
        cli.all_in_one,
        cli.compress,
        cli.profile_dir_path,
        cli.key_file_path,
    );

    // Stage, selection and key errors are logged inside; a run never turns
    // partial failure into a non-zero exit.
    run::execute(&cfg);
}
