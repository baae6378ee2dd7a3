use crate::errors::{BenchError, BenchResult};
use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::hint::black_box;
use std::path::Path;

/// Opens `path` as comma-delimited records. The header row is returned as an
/// ordinary record and every row must have as many fields as the first one.
pub fn open_reader<P: AsRef<Path>>(path: P) -> BenchResult<Reader<File>> {
    let path = path.as_ref();
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_path(path)
        .map_err(|e| BenchError::input(path, e))
}

/// Loads every record of the file into memory with a single collect.
pub fn read_entire_file<P: AsRef<Path>>(path: P) -> BenchResult<Vec<StringRecord>> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;
    reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| BenchError::input(path, e))
}

/// Reads the file one record at a time, reusing a single record buffer and
/// keeping nothing. Returns the number of records seen.
pub fn read_line_by_line<P: AsRef<Path>>(path: P) -> BenchResult<u64> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;
    let mut record = StringRecord::new();
    let mut count = 0u64;
    while reader
        .read_record(&mut record)
        .map_err(|e| BenchError::input(path, e))?
    {
        black_box(&record);
        count += 1;
    }
    Ok(count)
}
