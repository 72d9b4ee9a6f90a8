//! Replay of recorded captures through the live path
//!
//! [`ReplaySource`] hands a capture to the reader thread in fixed-size
//! chunks, optionally pacing them, so a recording can be watched in the
//! monitor exactly as if the device were attached.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::source::{ByteSource, ReadStatus};
use crate::error::{Result, ResultExt};

/// Pause used when a held-open replay has nothing left to give
const IDLE_POLL: Duration = Duration::from_millis(1);

/// Byte source backed by an in-memory capture
#[derive(Debug)]
pub struct ReplaySource {
    name: String,
    data: Vec<u8>,
    position: usize,
    chunk_size: usize,
    interval: Duration,
    hold_open: bool,
    written: Arc<Mutex<Vec<u8>>>,
}

impl ReplaySource {
    /// Replay `data` as fast as the reader asks for it
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: "replay".to_string(),
            data: data.into(),
            position: 0,
            chunk_size: 64,
            interval: Duration::ZERO,
            hold_open: false,
            written: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replay a capture file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data =
            std::fs::read(path).with_context(|| format!("Failed to read capture {:?}", path))?;
        Ok(Self::new(data).with_name(path.display().to_string()))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Bytes delivered per read (at least one)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Delay before each chunk, to mimic device pacing
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Report idle instead of closed once the data runs out
    pub fn hold_open(mut self, hold_open: bool) -> Self {
        self.hold_open = hold_open;
        self
    }

    /// Handle to everything written to this source
    pub fn written(&self) -> Arc<Mutex<Vec<u8>>> {
        self.written.clone()
    }

    /// Bytes not yet delivered
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

impl ByteSource for ReplaySource {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        if self.remaining() == 0 {
            if self.hold_open {
                std::thread::sleep(self.interval.max(IDLE_POLL));
                return Ok(ReadStatus::Idle);
            }
            return Ok(ReadStatus::Closed);
        }

        if !self.interval.is_zero() {
            std::thread::sleep(self.interval);
        }

        let n = self.chunk_size.min(buf.len()).min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
        self.position += n;
        Ok(ReadStatus::Data(n))
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(data);
        Ok(())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}
