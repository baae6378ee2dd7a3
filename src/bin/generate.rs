use clap::Parser;
use csvbench::generate::generate_csv;
use csvbench::observability::{init_logging, LogFormat};
use csvbench::BenchError;
use indicatif::{ProgressBar, ProgressStyle};
use miette::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "csvbench-gen")]
#[command(version)]
#[command(about = "Generate a random CSV fixture for csvbench", long_about = None)]
struct Cli {
    /// File to write
    #[arg(value_name = "OUTPUT_FILE")]
    output: PathBuf,

    /// Total rows, header included
    #[arg(value_name = "ROWS")]
    rows: u64,

    /// Columns per row
    #[arg(value_name = "COLUMNS")]
    columns: usize,

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

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(cli.rows)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40}] {pos}/{len} rows {msg}")
            .map_err(|e| BenchError::Unknown(e.into()))?
            .progress_chars("#>-"),
    );

    let mut rng = rand::thread_rng();
    generate_csv(&cli.output, cli.rows, cli.columns, &mut rng, &pb)?;
    Ok(())
}
