use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum BenchError {
    #[error("Cannot read input file {}: {source}", .path.display())]
    #[diagnostic(
        code("CSVBENCH-001"),
        help("Check that the input file exists, is readable and is a well-formed delimited file.")
    )]
    Input {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Input file {} is empty: no header row to count columns from", .path.display())]
    #[diagnostic(
        code("CSVBENCH-002"),
        help("The input must contain at least a header row.")
    )]
    EmptyInput { path: PathBuf },

    #[error("Cannot append results to {}: {source}", .path.display())]
    #[diagnostic(
        code("CSVBENCH-003"),
        help("Check that the results path is writable.")
    )]
    Results {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error: {0}")]
    #[diagnostic(code("CSVBENCH-004"), help("Check file paths and permissions."))]
    IoError(#[from] std::io::Error),

    #[error("Resource sampling failed: {0}")]
    #[diagnostic(
        code("CSVBENCH-005"),
        help("Memory and CPU introspection is only available on unix targets using jemalloc.")
    )]
    SamplerError(String),

    #[error("Benchmark error: {0}")]
    #[diagnostic(code("CSVBENCH-006"))]
    BenchmarkError(String),

    #[error("Malformed results log: {0}")]
    #[diagnostic(
        code("CSVBENCH-007"),
        help("Each results row must carry 9 fields: label, method, file, rows, columns, size, time, memory, cpu.")
    )]
    AnalysisError(String),

    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code("CSVBENCH-008"),
        help("Rows and columns must both be at least 1.")
    )]
    InvalidArgument(String),

    #[error(transparent)]
    #[diagnostic(code("CSVBENCH-000"))]
    Unknown(#[from] anyhow::Error),
}

impl BenchError {
    pub(crate) fn input(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
        BenchError::Input {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn results(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
        BenchError::Results {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type BenchResult<T> = Result<T, BenchError>;
