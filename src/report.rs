use crate::errors::{BenchError, BenchResult};
use crate::metadata::FileMetadata;
use crate::observability::Measurement;
use crate::strategy::ReadStrategy;
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::info;

/// Per-strategy averages over all runs.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    pub strategy: ReadStrategy,
    pub avg_time_ms: f64,
    pub avg_memory_mb: f64,
    /// Mean CPU-seconds x100, see [`Measurement::cpu_scaled`].
    pub avg_cpu: f64,
}

impl BenchmarkResult {
    /// Arithmetic mean of each quantity, independently. No outlier trimming.
    pub fn from_measurements(
        strategy: ReadStrategy,
        measurements: &[Measurement],
    ) -> BenchResult<Self> {
        if measurements.is_empty() {
            return Err(BenchError::BenchmarkError(format!(
                "no measurements recorded for {}",
                strategy.method_name()
            )));
        }
        let n = measurements.len() as f64;
        let mean = |f: fn(&Measurement) -> f64| measurements.iter().map(f).sum::<f64>() / n;

        Ok(Self {
            strategy,
            avg_time_ms: mean(Measurement::duration_ms),
            avg_memory_mb: mean(Measurement::memory_delta_mb),
            avg_cpu: mean(Measurement::cpu_scaled),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    pub runtime_label: String,
    pub file_name: String,
    pub metadata: FileMetadata,
    pub results: Vec<BenchmarkResult>,
}

impl BenchmarkReport {
    pub fn rows(&self) -> impl Iterator<Item = ResultRow> + '_ {
        self.results.iter().map(move |result| ResultRow {
            runtime_label: self.runtime_label.clone(),
            method: result.strategy.method_name(),
            file_name: self.file_name.clone(),
            rows: self.metadata.rows,
            columns: self.metadata.columns,
            file_size_mb: format!("{:.2}", self.metadata.size_mb()),
            duration_ms: format!("{:.2}", result.avg_time_ms),
            memory_mb: format!("{:.2}", result.avg_memory_mb),
            cpu: format!("{:.1}", result.avg_cpu),
        })
    }

    /// Appends one row per strategy to `path`, creating it if absent. Existing
    /// rows are never rewritten.
    pub fn append_to<P: AsRef<Path>>(&self, path: P) -> BenchResult<()> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| BenchError::results(path, e))?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        for row in self.rows() {
            writer
                .serialize(&row)
                .map_err(|e| BenchError::results(path, e))?;
        }
        writer.flush().map_err(|e| BenchError::results(path, e))?;

        info!(
            "Appended {} result rows to {:?}",
            self.results.len(),
            path
        );
        Ok(())
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rust CSV Benchmarks ({}):", self.runtime_label)?;
        writeln!(f, "File: {}", self.file_name)?;
        writeln!(f, "File size: {:.2} MB", self.metadata.size_mb())?;
        writeln!(f, "Row count: {}", self.metadata.rows)?;
        writeln!(f, "Column count: {}", self.metadata.columns)?;
        for result in &self.results {
            writeln!(
                f,
                "Reading {}: {:.2} ms (Memory: {:.2} MB, CPU: {:.1}%)",
                result.strategy.to_string().to_lowercase(),
                result.avg_time_ms,
                result.avg_memory_mb,
                result.avg_cpu
            )?;
        }
        Ok(())
    }
}

/// One line of the results log. Field order is fixed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub runtime_label: String,
    pub method: &'static str,
    pub file_name: String,
    pub rows: u64,
    pub columns: usize,
    pub file_size_mb: String,
    pub duration_ms: String,
    pub memory_mb: String,
    pub cpu: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn sample_report() -> BenchmarkReport {
        BenchmarkReport {
            runtime_label: "Rust 1.80.0".to_string(),
            file_name: "data.csv".to_string(),
            metadata: FileMetadata {
                rows: 101,
                columns: 5,
                size_bytes: 1024 * 1024,
            },
            results: vec![
                BenchmarkResult {
                    strategy: ReadStrategy::EntireFile,
                    avg_time_ms: 12.346,
                    avg_memory_mb: 3.5,
                    avg_cpu: 1.26,
                },
                BenchmarkResult {
                    strategy: ReadStrategy::LineByLine,
                    avg_time_ms: 8.0,
                    avg_memory_mb: -0.25,
                    avg_cpu: 0.8,
                },
            ],
        }
    }

    fn measurement(micros: u64, memory: i64, cpu: f64) -> Measurement {
        Measurement {
            duration: Duration::from_micros(micros),
            memory_delta_bytes: memory,
            cpu_delta_secs: cpu,
        }
    }

    #[test]
    fn test_average_is_arithmetic_mean() -> BenchResult<()> {
        let runs = [
            measurement(1500, 1024 * 1024, 0.5),
            measurement(2000, 2 * 1024 * 1024, 0.25),
            measurement(4000, -1024 * 1024, 0.75),
        ];
        let result = BenchmarkResult::from_measurements(ReadStrategy::EntireFile, &runs)?;

        let expected_time = (runs[0].duration_ms() + runs[1].duration_ms() + runs[2].duration_ms()) / 3.0;
        let expected_memory =
            (runs[0].memory_delta_mb() + runs[1].memory_delta_mb() + runs[2].memory_delta_mb()) / 3.0;
        let expected_cpu = (runs[0].cpu_scaled() + runs[1].cpu_scaled() + runs[2].cpu_scaled()) / 3.0;
        assert_eq!(result.avg_time_ms, expected_time);
        assert_eq!(result.avg_memory_mb, expected_memory);
        assert_eq!(result.avg_cpu, expected_cpu);
        Ok(())
    }

    #[test]
    fn test_average_of_nothing_is_an_error() {
        assert!(matches!(
            BenchmarkResult::from_measurements(ReadStrategy::LineByLine, &[]),
            Err(BenchError::BenchmarkError(_))
        ));
    }

    #[test]
    fn test_summary_block() {
        let summary = sample_report().to_string();
        let expected = "\
Rust CSV Benchmarks (Rust 1.80.0):
File: data.csv
File size: 1.00 MB
Row count: 101
Column count: 5
Reading entire file: 12.35 ms (Memory: 3.50 MB, CPU: 1.3%)
Reading line by line: 8.00 ms (Memory: -0.25 MB, CPU: 0.8%)
";
        assert_eq!(summary, expected);
    }

    #[test]
    fn test_append_is_additive() -> BenchResult<()> {
        let dir = tempdir()?;
        let path = dir.path().join("results.csv");
        fs::write(&path, "Go 1.22,entire_file,data.csv,101,5,1.00,4.00,2.00,0.9\n")?;

        let report = sample_report();
        report.append_to(&path)?;
        report.append_to(&path)?;

        let content = fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Go 1.22,entire_file,data.csv,101,5,1.00,4.00,2.00,0.9");
        assert_eq!(lines[1], "Rust 1.80.0,entire_file,data.csv,101,5,1.00,12.35,3.50,1.3");
        assert_eq!(lines[2], "Rust 1.80.0,line_by_line,data.csv,101,5,1.00,8.00,-0.25,0.8");
        assert_eq!(lines[3], lines[1]);
        assert_eq!(lines[4], lines[2]);
        Ok(())
    }

    #[test]
    fn test_append_quotes_label_with_comma() -> BenchResult<()> {
        let dir = tempdir()?;
        let path = dir.path().join("results.csv");
        let mut report = sample_report();
        report.runtime_label = "Rust 1.80.0, lto".to_string();
        report.append_to(&path)?;

        let content = fs::read_to_string(&path)?;
        assert!(content.starts_with("\"Rust 1.80.0, lto\",entire_file,"));
        Ok(())
    }
}
