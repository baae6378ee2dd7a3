//! Cross-run comparison of an accumulated results log.
//!
//! The log may hold rows from any number of runtimes and input files. Rows
//! are grouped by input file name, then compared per read method with the
//! fastest runtime as the baseline.

use crate::errors::{BenchError, BenchResult};
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// First field of the optional header row some logs carry.
const HEADER_MARKER: &str = "language";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggedResult {
    pub language: String,
    pub method: String,
    pub filename: String,
    pub rows: u64,
    pub columns: u64,
    pub file_size_mb: f64,
    pub duration_ms: f64,
    pub memory_mb: f64,
    pub cpu_percent: f64,
}

pub fn load_results<P: AsRef<Path>>(path: P) -> BenchResult<Vec<LoggedResult>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| BenchError::input(path, e))?;

    let mut results = Vec::new();
    let mut record = StringRecord::new();
    let mut line = 0usize;
    while reader
        .read_record(&mut record)
        .map_err(|e| BenchError::input(path, e))?
    {
        line += 1;
        if line == 1 && record.get(0) == Some(HEADER_MARKER) {
            continue;
        }
        let result = record
            .deserialize::<LoggedResult>(None)
            .map_err(|e| BenchError::AnalysisError(format!("row {}: {}", line, e)))?;
        results.push(result);
    }
    Ok(results)
}

/// Groups by `key` keeping first-seen order.
fn group_by<'a, K, F>(rows: &[&'a LoggedResult], key: F) -> Vec<(K, Vec<&'a LoggedResult>)>
where
    K: PartialEq,
    F: Fn(&LoggedResult) -> K,
{
    let mut groups: Vec<(K, Vec<&'a LoggedResult>)> = Vec::new();
    for &row in rows {
        let k = key(row);
        match groups.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, members)) => members.push(row),
            None => groups.push((k, vec![row])),
        }
    }
    groups
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Shortest round-trip form that always keeps a fractional part (`2.0`,
/// `0.32`), the notation existing analysis reports use.
fn float_repr(value: f64) -> String {
    format!("{:?}", value)
}

/// Human-readable comparison of a results log, grouped by input file.
pub struct Analysis<'a>(pub &'a [LoggedResult]);

impl fmt::Display for Analysis<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let all: Vec<&LoggedResult> = self.0.iter().collect();
        let languages: Vec<String> = group_by(&all, |r| r.language.clone())
            .into_iter()
            .map(|(language, _)| language)
            .collect();

        for (filename, rows) in group_by(&all, |r| r.filename.clone()) {
            write_file_statistics(f, &filename, &rows, &languages)?;
            write_performance_comparison(f, &rows)?;
        }
        Ok(())
    }
}

pub fn render_analysis(results: &[LoggedResult]) -> String {
    Analysis(results).to_string()
}

fn write_file_statistics(
    f: &mut fmt::Formatter<'_>,
    filename: &str,
    rows: &[&LoggedResult],
    languages: &[String],
) -> fmt::Result {
    let first = rows[0];
    writeln!(f, "\n===== Overall Statistics =======")?;
    writeln!(f, "\nFile: {}", filename)?;
    writeln!(f, "Size: {}MB", float_repr(round2(first.file_size_mb)))?;
    writeln!(f, "Rows: {}", first.rows)?;
    writeln!(f, "Columns: {}", first.columns)?;

    for language in languages {
        let lang_rows: Vec<&&LoggedResult> =
            rows.iter().filter(|r| &r.language == language).collect();
        if lang_rows.is_empty() {
            continue;
        }
        writeln!(f, "\n{} Statistics:", language)?;
        for row in lang_rows {
            writeln!(f, "  {}:", row.method)?;
            writeln!(f, "    Duration: {:.2}ms", row.duration_ms)?;
            writeln!(f, "    Memory: {:.2}MB", row.memory_mb)?;
            writeln!(f, "    CPU: {:.1}%", row.cpu_percent)?;
        }
    }
    Ok(())
}

fn write_performance_comparison(f: &mut fmt::Formatter<'_>, rows: &[&LoggedResult]) -> fmt::Result {
    writeln!(f, "\n==== Performance Comparison ====")?;

    for (method, mut method_rows) in group_by(rows, |r| r.method.clone()) {
        writeln!(f, "\n{}:", capitalize(&method))?;

        method_rows.sort_by(|a, b| a.duration_ms.total_cmp(&b.duration_ms));
        let fastest_duration = method_rows[0].duration_ms;

        for (rank, row) in method_rows.iter().enumerate() {
            let comparison = if rank == 0 {
                "Fastest".to_string()
            } else if fastest_duration > 0.0 {
                format!(
                    "{}x slower",
                    float_repr(round2(row.duration_ms / fastest_duration))
                )
            } else {
                "slower".to_string()
            };
            writeln!(f, "  {}: {:.2}ms ({})", row.language, row.duration_ms, comparison)?;
            writeln!(f, "    Memory: {:.2}MB", row.memory_mb)?;
            writeln!(f, "    CPU: {:.1}%", row.cpu_percent)?;
        }
    }
    Ok(())
}
