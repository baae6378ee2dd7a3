use crate::config::{BenchConfig, RUNS};
use crate::errors::BenchResult;
use crate::metadata::{self, FileMetadata};
use crate::observability::{Measurement, ResourceSampler};
use crate::report::{BenchmarkReport, BenchmarkResult};
use crate::strategy::ReadStrategy;
use std::path::Path;
use tracing::{debug, info};

pub struct BenchmarkRunner<'a, S: ResourceSampler + ?Sized> {
    sampler: &'a S,
    runs: usize,
}

impl<'a, S: ResourceSampler + ?Sized> BenchmarkRunner<'a, S> {
    pub fn new(sampler: &'a S) -> Self {
        Self {
            sampler,
            runs: RUNS,
        }
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Runs `strategy` back to back, each run reopening the file, and returns
    /// every individual measurement. The first (cold) run is included.
    pub fn measure_runs(
        &self,
        strategy: ReadStrategy,
        path: &Path,
    ) -> BenchResult<Vec<Measurement>> {
        let mut measurements = Vec::with_capacity(self.runs);
        for run in 1..=self.runs {
            println!("  {} run {}/{}", strategy, run, self.runs);
            let measurement = strategy.measure(self.sampler, path)?;
            debug!(
                method = strategy.method_name(),
                run,
                duration_ms = measurement.duration_ms(),
                memory_delta_bytes = measurement.memory_delta_bytes,
                cpu_delta_secs = measurement.cpu_delta_secs,
                "Run finished"
            );
            measurements.push(measurement);
        }
        Ok(measurements)
    }

    pub fn run_strategy(&self, strategy: ReadStrategy, path: &Path) -> BenchResult<BenchmarkResult> {
        let measurements = self.measure_runs(strategy, path)?;
        BenchmarkResult::from_measurements(strategy, &measurements)
    }

    /// Runs every strategy in order: bulk load first, then streaming.
    pub fn run_all(&self, path: &Path) -> BenchResult<Vec<BenchmarkResult>> {
        println!("\nRunning benchmarks ({} runs)...", self.runs);
        ReadStrategy::ALL
            .iter()
            .map(|&strategy| self.run_strategy(strategy, path))
            .collect()
    }
}

/// Scan metadata, benchmark both strategies, print the summary and append
/// the results. Any failure aborts the run before the results log is touched.
pub fn execute_benchmark<S>(config: &BenchConfig, sampler: &S) -> BenchResult<BenchmarkReport>
where
    S: ResourceSampler + ?Sized,
{
    info!("Benchmarking {:?}", config.input);

    let metadata: FileMetadata = metadata::scan(&config.input)?;
    println!("{}", metadata.machine_line());

    let runner = BenchmarkRunner::new(sampler);
    let results = runner.run_all(&config.input)?;

    let report = BenchmarkReport {
        runtime_label: config.runtime_label.clone(),
        file_name: config.input_base_name(),
        metadata,
        results,
    };
    println!("\n{}", report);

    report.append_to(&config.results)?;
    info!("Benchmark completed successfully.");
    Ok(report)
}
