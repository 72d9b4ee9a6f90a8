//! Sample accumulation
//!
//! The accumulator is the single place where decoded records become indexed
//! samples. Both the batch path and the live reader thread drive it, so a
//! recorded capture and the same bytes read from a device always produce
//! identical histories.

use crate::protocol::{decode_frame, Decoded, RawFrame, Record};
use crate::types::{AccelSample, PotSample, SampleHistory, VersionInfo};

use super::reconcile::reconcile;
use super::types::{CaptureReport, FrameStats};

/// What a decoded record changed in the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Accel(AccelSample),
    Pot(PotSample),
    Version(VersionInfo),
}

/// Result of pushing one frame through decode + accumulate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOutcome {
    pub decoded: Decoded,
    pub applied: Option<Applied>,
}

/// Per-stream counters and histories for one run
#[derive(Debug, Clone, Default)]
pub struct SampleAccumulator {
    accel_count: u64,
    pot_count: u64,
    accel: SampleHistory<AccelSample>,
    pot: SampleHistory<PotSample>,
    version: Option<VersionInfo>,
    stats: FrameStats,
}

impl SampleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a frame, count it, and apply it if it carries a record
    pub fn ingest(&mut self, frame: &RawFrame) -> FrameOutcome {
        let decoded = decode_frame(frame);
        self.stats.record(&decoded);

        if let Decoded::Unrecognized(rejection) = &decoded {
            if rejection.is_malformed() {
                tracing::debug!("Dropping malformed frame {:?}: {}", frame, rejection);
            } else {
                tracing::trace!("Ignoring frame {:?}: {}", frame, rejection);
            }
        }

        let applied = self.apply(&decoded);
        FrameOutcome { decoded, applied }
    }

    /// Apply an already decoded frame; unrecognized frames change nothing
    pub fn apply(&mut self, decoded: &Decoded) -> Option<Applied> {
        decoded.record().map(|record| self.apply_record(*record))
    }

    /// Apply one record, assigning the next index of its stream
    pub fn apply_record(&mut self, record: Record) -> Applied {
        match record {
            Record::Accel { x, y, z } => {
                let sample = AccelSample {
                    index: self.accel_count,
                    x,
                    y,
                    z,
                };
                self.accel.push(sample);
                self.accel_count += 1;
                Applied::Accel(sample)
            }
            Record::Pot { value } => {
                let sample = PotSample {
                    index: self.pot_count,
                    value,
                };
                self.pot.push(sample);
                self.pot_count += 1;
                Applied::Pot(sample)
            }
            Record::Version(version) => {
                self.version = Some(version);
                Applied::Version(version)
            }
        }
    }

    /// Accelerometer samples decoded so far
    pub fn accel_count(&self) -> u64 {
        self.accel_count
    }

    /// Potentiometer samples decoded so far
    pub fn pot_count(&self) -> u64 {
        self.pot_count
    }

    pub fn accel(&self) -> &SampleHistory<AccelSample> {
        &self.accel
    }

    pub fn pot(&self) -> &SampleHistory<PotSample> {
        &self.pot
    }

    /// Latest version report, if any arrived
    pub fn version(&self) -> Option<VersionInfo> {
        self.version
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Freeze the run without reconciling
    pub fn into_histories(self) -> (SampleHistory<AccelSample>, SampleHistory<PotSample>) {
        (self.accel, self.pot)
    }

    /// Freeze the run: reconcile both histories and hand them over
    pub fn finish(self, trailing_bytes: usize) -> CaptureReport {
        let mut accel = self.accel;
        let mut pot = self.pot;
        let reconciliation = reconcile(&mut accel, &mut pot);

        CaptureReport {
            accel,
            pot,
            version: self.version,
            stats: self.stats,
            reconciliation,
            trailing_bytes,
        }
    }
}
