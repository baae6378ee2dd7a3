//! Single-pass scan of the input file: row count, column count and size.

use crate::errors::{BenchError, BenchResult};
use crate::io;
use csv::StringRecord;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FileMetadata {
    /// Records in the file, header included.
    pub rows: u64,
    /// Fields in the first record.
    pub columns: usize,
    pub size_bytes: u64,
}

impl FileMetadata {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB
    }

    /// `METADATA:<rows>,<columns>,<size_mb>` for callers scraping stdout.
    pub fn machine_line(&self) -> String {
        format!("METADATA:{},{},{:.2}", self.rows, self.columns, self.size_mb())
    }
}

pub fn scan<P: AsRef<Path>>(path: P) -> BenchResult<FileMetadata> {
    let path = path.as_ref();
    info!("Scanning metadata of {:?}", path);

    let mut reader = io::open_reader(path)?;
    let mut record = StringRecord::new();

    if !reader
        .read_record(&mut record)
        .map_err(|e| BenchError::input(path, e))?
    {
        return Err(BenchError::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    let columns = record.len();
    let mut rows = 1u64;

    while reader
        .read_record(&mut record)
        .map_err(|e| BenchError::input(path, e))?
    {
        rows += 1;
    }

    let size_bytes = fs::metadata(path)
        .map_err(|e| BenchError::input(path, e))?
        .len();

    let metadata = FileMetadata {
        rows,
        columns,
        size_bytes,
    };
    debug!(?metadata, "Metadata scan complete");
    Ok(metadata)
}
