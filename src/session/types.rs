//! Session data types

use serde::{Deserialize, Serialize};

use crate::protocol::Decoded;
use crate::types::{AccelSample, PotSample, SampleHistory, VersionInfo};

use super::reconcile::Reconciliation;

/// Lifecycle of a live session
///
/// `Stopped` is terminal; a new session is needed to read again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Created, source not opened yet
    #[default]
    Idle,
    /// Reader thread is consuming the source
    Running,
    /// Reader thread has exited; state is frozen
    Stopped,
}

impl SessionState {
    /// Check if the reader thread is active
    pub fn is_running(&self) -> bool {
        matches!(self, SessionState::Running)
    }

    /// Check if the session has finished
    pub fn is_stopped(&self) -> bool {
        matches!(self, SessionState::Stopped)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Running => "Running",
            SessionState::Stopped => "Stopped",
        }
    }
}

/// Per-run frame counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameStats {
    /// Every frame seen, decoded or not
    pub frames: u64,
    pub accel_frames: u64,
    pub pot_frames: u64,
    pub version_frames: u64,
    /// Empty frames and unknown tags
    pub unrecognized: u64,
    /// Known tag with a bad body
    pub malformed: u64,
}

impl FrameStats {
    /// Count one decode outcome
    pub fn record(&mut self, decoded: &Decoded) {
        use crate::protocol::Record;

        self.frames += 1;
        match decoded {
            Decoded::Record(Record::Accel { .. }) => self.accel_frames += 1,
            Decoded::Record(Record::Pot { .. }) => self.pot_frames += 1,
            Decoded::Record(Record::Version(_)) => self.version_frames += 1,
            Decoded::Unrecognized(rejection) if rejection.is_malformed() => self.malformed += 1,
            Decoded::Unrecognized(_) => self.unrecognized += 1,
        }
    }

    /// Frames that produced a record
    pub fn recognized(&self) -> u64 {
        self.accel_frames + self.pot_frames + self.version_frames
    }
}

/// Final, reconciled output of a run (batch or live)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureReport {
    pub accel: SampleHistory<AccelSample>,
    pub pot: SampleHistory<PotSample>,
    /// Last version report seen, if any
    pub version: Option<VersionInfo>,
    pub stats: FrameStats,
    pub reconciliation: Reconciliation,
    /// Unterminated bytes left at the end of the source
    pub trailing_bytes: usize,
}

impl CaptureReport {
    /// Index-aligned (accelerometer, potentiometer) pairs
    pub fn paired(&self) -> impl Iterator<Item = (&AccelSample, &PotSample)> {
        self.accel.iter().zip(self.pot.iter())
    }

    /// Number of aligned pairs
    pub fn pair_count(&self) -> usize {
        self.accel.len().min(self.pot.len())
    }
}
