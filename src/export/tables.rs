//! CSV export of sample histories
//!
//! One header row with the record's field names, then one row per sample in
//! index order. The header is written even for an empty history.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::normalize::NormalizedPair;
use crate::error::{Result, ResultExt};
use crate::types::{AccelSample, PotSample, SampleHistory};

pub const ACCEL_HEADER: [&str; 4] = ["Sample Number", "X Data", "Y Data", "Z Data"];
pub const POT_HEADER: [&str; 2] = ["Sample Number", "Potentiometer Data"];
pub const COMBINED_HEADER: [&str; 3] = ["Sample Number", "Potentiometer", "Accelerometer"];

/// Write a header then every row to `writer`
pub fn write_rows<'a, T, W, I>(writer: W, header: &[&str], rows: I) -> Result<()>
where
    T: Serialize + 'a,
    W: Write,
    I: IntoIterator<Item = &'a T>,
{
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv.write_record(header)?;
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

fn write_file<'a, T, I>(path: &Path, header: &[&str], rows: I) -> Result<()>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    write_rows(std::io::BufWriter::new(file), header, rows)
        .with_context(|| format!("Failed to write {:?}", path))?;
    tracing::debug!("Wrote {:?}", path);
    Ok(())
}

pub fn write_accel_csv(path: impl AsRef<Path>, history: &SampleHistory<AccelSample>) -> Result<()> {
    write_file(path.as_ref(), &ACCEL_HEADER, history)
}

pub fn write_pot_csv(path: impl AsRef<Path>, history: &SampleHistory<PotSample>) -> Result<()> {
    write_file(path.as_ref(), &POT_HEADER, history)
}

pub fn write_combined_csv(path: impl AsRef<Path>, pairs: &[NormalizedPair]) -> Result<()> {
    write_file(path.as_ref(), &COMBINED_HEADER, pairs)
}
