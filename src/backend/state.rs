//! Shared state between the reader thread and the session owner
//!
//! Everything the reader mutates lives in one [`SharedState`] behind one
//! mutex. The reader applies a whole chunk of frames per lock, and readers
//! only ever get clones, so a consumer can never see x of one frame next to
//! y of another.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::session::{Applied, FrameStats, SampleAccumulator, SessionState};
use crate::types::{AccelSample, PotSample, VersionInfo};

/// Most recent decoded value per field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LatestValues {
    /// Every frame received, decoded or not
    pub frames: u64,
    pub version: Option<VersionInfo>,
    pub pot: Option<PotSample>,
    pub accel: Option<AccelSample>,
}

impl LatestValues {
    /// Record cycles seen; each cycle carries one accel and one pot frame
    pub fn record_number(&self) -> u64 {
        self.frames / 2
    }

    pub(crate) fn update(&mut self, applied: &Applied) {
        match applied {
            Applied::Accel(sample) => self.accel = Some(*sample),
            Applied::Pot(sample) => self.pot = Some(*sample),
            Applied::Version(version) => self.version = Some(*version),
        }
    }
}

/// Which way a raw log line travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Frame received from the device
    Rx,
    /// Command sent to the device
    Tx,
}

/// One line of the raw frame log
///
/// Holds the frame exactly as received, delimiter excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawLogEntry {
    pub direction: Direction,
    pub bytes: Vec<u8>,
}

impl RawLogEntry {
    /// Frame text for display; invalid UTF-8 is replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl fmt::Display for RawLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Rx => write!(f, "{}", self.text()),
            Direction::Tx => write!(f, "> {}", self.text()),
        }
    }
}

/// Point-in-time copy of a live session for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveSnapshot {
    pub state: SessionState,
    pub latest: LatestValues,
    pub stats: FrameStats,
    pub accel_count: u64,
    pub pot_count: u64,
    pub raw_log_len: usize,
    pub dropped_events: u64,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct SharedState {
    pub state: SessionState,
    pub accumulator: SampleAccumulator,
    pub latest: LatestValues,
    pub raw_log: Vec<RawLogEntry>,
    pub trailing_bytes: usize,
    pub dropped_events: u64,
    pub last_error: Option<String>,
}

impl SharedState {
    pub fn snapshot(&self) -> LiveSnapshot {
        LiveSnapshot {
            state: self.state,
            latest: self.latest,
            stats: *self.accumulator.stats(),
            accel_count: self.accumulator.accel_count(),
            pot_count: self.accumulator.pot_count(),
            raw_log_len: self.raw_log.len(),
            dropped_events: self.dropped_events,
            last_error: self.last_error.clone(),
        }
    }

    pub fn push_log(&mut self, direction: Direction, bytes: Vec<u8>) {
        self.raw_log.push(RawLogEntry { direction, bytes });
    }
}

pub(crate) type Shared = Arc<Mutex<SharedState>>;

/// Lock the shared state; a panicked holder leaves data that is still usable
pub(crate) fn lock(shared: &Shared) -> MutexGuard<'_, SharedState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
