use crate::errors::{BenchError, BenchResult};
use indicatif::ProgressBar;
use rand::RngCore;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

const FIELD_BYTES: usize = 16;

/// Writes a benchmark fixture: a header `1,2,..,columns` followed by
/// `rows - 1` rows of random 32-character hex fields. `rows` counts the
/// header, matching what the metadata scan reports.
pub fn generate_csv<P, R>(
    path: P,
    rows: u64,
    columns: usize,
    rng: &mut R,
    progress: &ProgressBar,
) -> BenchResult<()>
where
    P: AsRef<Path>,
    R: RngCore + ?Sized,
{
    if rows == 0 || columns == 0 {
        return Err(BenchError::InvalidArgument(format!(
            "rows and columns must both be at least 1 (got {} rows, {} columns)",
            rows, columns
        )));
    }
    let path = path.as_ref();
    info!("Generating {} rows x {} columns into {:?}", rows, columns, path);

    let mut out = BufWriter::new(File::create(path)?);
    let header: Vec<String> = (1..=columns).map(|c| c.to_string()).collect();
    writeln!(out, "{}", header.join(","))?;
    progress.inc(1);

    let mut bytes = [0u8; FIELD_BYTES];
    let mut line = String::with_capacity(columns * (FIELD_BYTES * 2 + 1));
    for _ in 1..rows {
        line.clear();
        for c in 0..columns {
            if c > 0 {
                line.push(',');
            }
            rng.fill_bytes(&mut bytes);
            for b in bytes {
                let _ = write!(line, "{:02x}", b);
            }
        }
        writeln!(out, "{}", line)?;
        progress.inc(1);
    }
    out.flush()?;
    progress.finish_with_message("done");
    Ok(())
}
