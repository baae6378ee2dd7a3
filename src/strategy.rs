use crate::errors::BenchResult;
use crate::io;
use crate::observability::{measure, Measurement, ResourceSampler};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStrategy {
    /// Load every record into memory at once.
    EntireFile,
    /// Read and discard one record at a time.
    LineByLine,
}

impl ReadStrategy {
    pub const ALL: [ReadStrategy; 2] = [ReadStrategy::EntireFile, ReadStrategy::LineByLine];

    /// Method name stored in the results log. Downstream consumers match on
    /// these literals.
    pub fn method_name(self) -> &'static str {
        match self {
            ReadStrategy::EntireFile => "entire_file",
            ReadStrategy::LineByLine => "line_by_line",
        }
    }

    /// Executes the strategy once against `path` and measures it.
    pub fn measure<S>(self, sampler: &S, path: &Path) -> BenchResult<Measurement>
    where
        S: ResourceSampler + ?Sized,
    {
        match self {
            ReadStrategy::EntireFile => measure(sampler, || io::read_entire_file(path)),
            ReadStrategy::LineByLine => measure(sampler, || io::read_line_by_line(path)),
        }
    }
}

impl fmt::Display for ReadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadStrategy::EntireFile => write!(f, "Entire file"),
            ReadStrategy::LineByLine => write!(f, "Line by line"),
        }
    }
}
