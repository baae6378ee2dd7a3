use clap::Parser;
use csvbench::observability::{init_logging, LogFormat};
use csvbench::{BenchConfig, ProcessSampler};
use miette::Result;
use std::path::PathBuf;
use uuid::Uuid;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Parser)]
#[command(name = "csvbench")]
#[command(version)]
#[command(about = "Benchmark reading a CSV file in bulk versus record by record", long_about = None)]
struct Cli {
    /// Delimited file to benchmark
    #[arg(value_name = "INPUT_FILE")]
    input: PathBuf,

    /// Results log to append to (created if absent)
    #[arg(value_name = "RESULTS_FILE")]
    results: PathBuf,

    /// Runtime label for the results log (defaults to "Rust <rustc version>")
    #[arg(long)]
    label: Option<String>,

    /// Increase logging verbosity (Info -> Debug)
    #[arg(short, long)]
    verbose: bool,

    /// Silence all logs
    #[arg(short, long)]
    quiet: bool,

    /// Log format (text or json)
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet, cli.log_format);

    let run_id = Uuid::new_v4();
    let _span = tracing::info_span!("root", run_id = %run_id).entered();

    let config = BenchConfig::new(cli.input, cli.results).with_runtime_label(cli.label);
    csvbench::execute_benchmark(&config, &ProcessSampler::new())?;

    Ok(())
}
