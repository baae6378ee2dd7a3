use std::path::{Path, PathBuf};

/// Repetitions per read strategy. Both strategies always use the same count
/// so their averages stay comparable.
pub const RUNS: usize = 3;

/// Version of the compiler that built this binary, captured by `build.rs`.
pub const RUSTC_VERSION: &str = env!("CSVBENCH_RUSTC_VERSION");

/// Label recorded in the first column of every results row.
pub fn default_runtime_label() -> String {
    format!("Rust {}", RUSTC_VERSION)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub input: PathBuf,
    pub results: PathBuf,
    pub runtime_label: String,
}

impl BenchConfig {
    pub fn new(input: impl Into<PathBuf>, results: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            results: results.into(),
            runtime_label: default_runtime_label(),
        }
    }

    pub fn with_runtime_label(mut self, label: Option<String>) -> Self {
        if let Some(label) = label {
            self.runtime_label = label;
        }
        self
    }

    /// Final path component of the input, as written to the results log.
    pub fn input_base_name(&self) -> String {
        base_name(&self.input)
    }
}

pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
