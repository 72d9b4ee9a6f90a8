//! Writing captures to disk
//!
//! A finished [`CaptureReport`] becomes a directory of files named by
//! [`ExportConfig`]:
//!
//! - accelerometer and potentiometer CSVs, one row per sample
//! - a combined CSV of both streams, min-max normalised and index-aligned
//! - the raw capture, when one is available
//! - a JSON [`CaptureSummary`]

mod normalize;
mod summary;
mod tables;

pub use normalize::{normalize, normalized_pairs, NormalizedPair, ZERO_RANGE_DIVISOR};
pub use summary::CaptureSummary;
pub use tables::{
    write_accel_csv, write_combined_csv, write_pot_csv, write_rows, ACCEL_HEADER,
    COMBINED_HEADER, POT_HEADER,
};

use std::path::{Path, PathBuf};

use crate::config::ExportConfig;
use crate::error::{HsError, Result, ResultExt};
use crate::session::CaptureReport;

/// Create `dir`, refusing to reuse a non-empty one unless `force` is set
pub fn prepare_output_dir(dir: impl AsRef<Path>, force: bool) -> Result<()> {
    let dir = dir.as_ref();

    if dir.exists() {
        if !dir.is_dir() {
            return Err(HsError::Config(format!(
                "Output path {:?} exists and is not a directory",
                dir
            )));
        }
        let occupied = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to inspect {:?}", dir))?
            .next()
            .is_some();
        if occupied && !force {
            return Err(HsError::Config(format!(
                "Output directory {:?} is not empty (use --force to overwrite)",
                dir
            )));
        }
        if occupied {
            tracing::warn!("Overwriting files in {:?}", dir);
        }
        return Ok(());
    }

    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    Ok(())
}

/// Writes every export file for a report into one directory
#[derive(Debug, Clone)]
pub struct ReportExporter {
    dir: PathBuf,
    files: ExportConfig,
}

impl ReportExporter {
    pub fn new(dir: impl Into<PathBuf>, files: ExportConfig) -> Self {
        Self {
            dir: dir.into(),
            files,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the CSVs and summary, plus `raw` when given
    ///
    /// Returns the paths written, in write order.
    pub fn export(
        &self,
        report: &CaptureReport,
        summary: &CaptureSummary,
        raw: Option<&[u8]>,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let path = self.dir.join(&self.files.accel_file);
        write_accel_csv(&path, &report.accel)?;
        written.push(path);

        let path = self.dir.join(&self.files.pot_file);
        write_pot_csv(&path, &report.pot)?;
        written.push(path);

        let path = self.dir.join(&self.files.combined_file);
        write_combined_csv(&path, &normalized_pairs(report))?;
        written.push(path);

        if let Some(raw) = raw {
            let path = self.dir.join(&self.files.raw_file);
            std::fs::write(&path, raw).with_context(|| format!("Failed to write {:?}", path))?;
            written.push(path);
        }

        let path = self.dir.join(&self.files.summary_file);
        summary.save(&path)?;
        written.push(path);

        tracing::info!(
            "Exported {} accelerometer and {} potentiometer samples to {:?}",
            report.accel.len(),
            report.pot.len(),
            self.dir
        );
        Ok(written)
    }
}
