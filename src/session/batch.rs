//! Batch ingestion of recorded captures
//!
//! Runs the framer, decoder and accumulator over a complete buffer in one
//! synchronous pass, then reconciles. Re-running on the same bytes always
//! gives the same report.

use std::io::Read;
use std::path::Path;

use crate::error::{Result, ResultExt};
use crate::protocol::split_frames;

use super::accumulator::SampleAccumulator;
use super::types::CaptureReport;

/// One-shot decoder for a fully available byte stream
pub struct BatchIngest;

impl BatchIngest {
    /// Decode an in-memory capture
    pub fn run(bytes: &[u8]) -> CaptureReport {
        let mut accumulator = SampleAccumulator::new();
        let mut frames = split_frames(bytes);

        for frame in frames.by_ref() {
            accumulator.ingest(&frame);
        }

        let trailing_bytes = frames.pending().len();
        if trailing_bytes > 0 {
            tracing::debug!(
                "Ignoring {} unterminated bytes at end of capture",
                trailing_bytes
            );
        }

        let report = accumulator.finish(trailing_bytes);
        tracing::info!(
            "Ingested {} frames: {} accel, {} pot, {} unrecognized, {} malformed",
            report.stats.frames,
            report.accel.len(),
            report.pot.len(),
            report.stats.unrecognized,
            report.stats.malformed
        );
        report
    }

    /// Decode everything a reader yields
    pub fn from_reader<R: Read>(mut reader: R) -> Result<CaptureReport> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::run(&bytes))
    }

    /// Decode a capture file
    pub fn from_file(path: impl AsRef<Path>) -> Result<CaptureReport> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read capture {:?}", path))?;
        tracing::debug!("Read {} bytes from {:?}", bytes.len(), path);
        Ok(Self::run(&bytes))
    }
}
