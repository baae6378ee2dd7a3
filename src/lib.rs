//! Bulk-load versus streaming CSV read benchmarks.
//!
//! A run scans the input once for its shape, then reads it [`config::RUNS`]
//! times with each [`strategy::ReadStrategy`], measuring wall time, allocated
//! memory and process CPU time. Averages are printed and appended to a
//! results log for comparison across runs and runtimes.

pub mod analyze;
pub mod config;
pub mod errors;
pub mod generate;
pub mod io;
pub mod metadata;
pub mod observability;
pub mod report;
pub mod runner;
pub mod strategy;

pub use config::BenchConfig;
pub use errors::{BenchError, BenchResult};
pub use observability::{Measurement, ProcessSampler, ResourceSampler};
pub use report::{BenchmarkReport, BenchmarkResult};
pub use runner::execute_benchmark;
