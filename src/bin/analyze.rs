use clap::Parser;
use csvbench::analyze::{load_results, render_analysis};
use csvbench::observability::{init_logging, LogFormat};
use miette::Result;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "csvbench-analyze")]
#[command(version)]
#[command(about = "Compare runtimes recorded in a csvbench results log", long_about = None)]
struct Cli {
    /// Results log written by csvbench
    #[arg(value_name = "RESULTS_FILE")]
    results: PathBuf,

    /// Silence all logs
    #[arg(short, long)]
    quiet: bool,

    /// Log format (text or json)
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(false, cli.quiet, cli.log_format);

    let results = load_results(&cli.results)?;
    info!("Loaded {} result rows from {:?}", results.len(), cli.results);

    print!("{}", render_analysis(&results));
    Ok(())
}
