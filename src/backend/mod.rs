//! Live session backend
//!
//! This module runs the device reader on a dedicated thread so the consumer
//! (a terminal monitor, a capture timer, a UI) never blocks on serial I/O.
//!
//! # Architecture
//!
//! - [`LiveSession`] - Owner-side handle: lifecycle, snapshots, raw log, commands
//! - [`LiveWorker`] - The reader loop; sole writer of the shared state
//! - [`LiveCommand`] - Messages from the owner to the reader (send, stop)
//! - [`LiveEvent`] - Notifications from the reader, in frame order
//! - [`ByteSource`] - Transport seam: [`SerialSource`] or [`ReplaySource`]
//!
//! # Lifecycle
//!
//! ```text
//! Idle --start--> Running --stop / source closed / transport error--> Stopped
//! ```
//!
//! A stopped session cannot be restarted; create a new one.
//!
//! # Example
//!
//! ```ignore
//! use hs_telemetry::backend::LiveSession;
//! use hs_telemetry::config::AppConfig;
//! use hs_telemetry::protocol::DeviceCommand;
//!
//! let config = AppConfig::default();
//! let mut session = LiveSession::new(&config);
//! session.start_serial()?;
//! session.send_command(DeviceCommand::GetVersion)?;
//!
//! for event in session.drain_events() {
//!     // react to new frames
//! }
//! let snapshot = session.snapshot();
//! println!("pot = {:?}", snapshot.latest.pot);
//!
//! let report = session.finish()?;
//! ```

pub mod replay;
pub mod serial;
pub mod source;
pub mod state;
pub mod worker;

pub use replay::ReplaySource;
pub use serial::{list_ports, resolve_port, PortListing, SerialSource};
pub use source::{BoxedSource, ByteSource, ReadStatus};
pub use state::{Direction, LatestValues, LiveSnapshot, RawLogEntry};
pub use worker::LiveWorker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::config::AppConfig;
use crate::error::{HsError, Result};
use crate::protocol::DeviceCommand;
use crate::session::{CaptureReport, FrameOutcome, SessionState};
use crate::types::{AccelSample, PotSample, SampleHistory};
use state::{lock, Shared, SharedState};

/// Message sent from the session owner to the reader thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveCommand {
    /// Write a command frame to the device
    Send(DeviceCommand),
    /// Stop reading
    Stop,
}

/// Message sent from the reader thread to the session owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    /// A frame arrived; `number` counts every frame this session
    Frame { number: u64, outcome: FrameOutcome },
    /// A device command was written
    CommandSent(DeviceCommand),
    /// A device command could not be written
    CommandFailed {
        command: DeviceCommand,
        error: String,
    },
    /// The transport failed while running
    TransportError(String),
    /// The reader has exited
    Stopped,
}

/// A live connection to a byte source with background decoding
pub struct LiveSession {
    config: AppConfig,
    shared: Shared,
    running: Arc<AtomicBool>,
    command_tx: Option<Sender<LiveCommand>>,
    event_tx: Sender<LiveEvent>,
    event_rx: Receiver<LiveEvent>,
    handle: Option<JoinHandle<()>>,
    source_name: Option<String>,
}

impl LiveSession {
    /// Create an idle session
    pub fn new(config: &AppConfig) -> Self {
        // Bounded so a stalled consumer cannot grow memory; drops are counted
        let (event_tx, event_rx) = bounded(config.live.event_queue_capacity.max(1));

        Self {
            config: config.clone(),
            shared: Arc::new(Mutex::new(SharedState::default())),
            running: Arc::new(AtomicBool::new(false)),
            command_tx: None,
            event_tx,
            event_rx,
            handle: None,
            source_name: None,
        }
    }

    /// Open the configured serial port and start reading
    ///
    /// An open failure leaves the session idle.
    pub fn start_serial(&mut self) -> Result<()> {
        self.ensure_idle()?;
        let source = SerialSource::open_configured(&self.config.serial)?;
        self.start(Box::new(source))
    }

    /// Start reading from an already opened source
    pub fn start(&mut self, source: BoxedSource) -> Result<()> {
        self.ensure_idle()?;

        let (command_tx, command_rx) = bounded(self.config.live.command_queue_capacity.max(1));
        let name = source.describe();
        let worker = LiveWorker::new(
            source,
            self.shared.clone(),
            self.running.clone(),
            command_rx,
            self.event_tx.clone(),
            self.config.serial.read_chunk_size,
        );

        lock(&self.shared).state = SessionState::Running;
        self.running.store(true, Ordering::SeqCst);

        let handle = std::thread::Builder::new()
            .name("hs-reader".to_string())
            .spawn(move || worker.run())
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                lock(&self.shared).state = SessionState::Idle;
                HsError::Session(format!("Failed to spawn reader thread: {}", e))
            })?;

        tracing::info!("Live session started on {}", name);
        self.command_tx = Some(command_tx);
        self.handle = Some(handle);
        self.source_name = Some(name);
        Ok(())
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.state() {
            SessionState::Idle => Ok(()),
            SessionState::Running => Err(HsError::Session("Session already running".into())),
            SessionState::Stopped => Err(HsError::Session(
                "Session has stopped; create a new one".into(),
            )),
        }
    }

    /// Stop the reader and wait for it to exit
    ///
    /// Returns within about one read timeout. Decoded history is kept.
    pub fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(tx) = &self.command_tx {
            // The reader may already be gone; the flag alone is enough then
            let _ = tx.try_send(LiveCommand::Stop);
        }

        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| HsError::Session("Reader thread panicked".into()))?;
            tracing::info!("Live session stopped");
        }

        lock(&self.shared).state = SessionState::Stopped;
        Ok(())
    }

    /// Wait until the reader exits on its own (source closed or failed)
    ///
    /// Returns `false` if it is still running after `timeout`.
    pub fn wait_for_stop(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.state().is_stopped() {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        true
    }

    /// Queue a command frame for the device
    pub fn send_command(&self, command: DeviceCommand) -> Result<()> {
        if !self.state().is_running() {
            return Err(HsError::Session(format!(
                "Cannot send {} command: session is not running",
                command
            )));
        }
        let tx = self
            .command_tx
            .as_ref()
            .ok_or_else(|| HsError::Session("Session has no reader".into()))?;
        tx.send(LiveCommand::Send(command))
            .map_err(|_| HsError::Channel("Reader is no longer accepting commands".into()))
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        lock(&self.shared).state
    }

    /// Transport failure that ended the session, if any
    pub fn last_error(&self) -> Option<String> {
        lock(&self.shared).last_error.clone()
    }

    /// Name of the source being read, once started
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Consistent copy of the latest values and counters
    pub fn snapshot(&self) -> LiveSnapshot {
        lock(&self.shared).snapshot()
    }

    /// Raw log entries from `offset` onward
    pub fn raw_log_since(&self, offset: usize) -> Vec<RawLogEntry> {
        let shared = lock(&self.shared);
        shared.raw_log.get(offset..).map(<[_]>::to_vec).unwrap_or_default()
    }

    /// Copy of both histories as accumulated so far (not reconciled)
    pub fn histories(&self) -> (SampleHistory<AccelSample>, SampleHistory<PotSample>) {
        let shared = lock(&self.shared);
        (
            shared.accumulator.accel().clone(),
            shared.accumulator.pot().clone(),
        )
    }

    /// Event receiver
    pub fn events(&self) -> &Receiver<LiveEvent> {
        &self.event_rx
    }

    /// Receive all pending events
    pub fn drain_events(&self) -> Vec<LiveEvent> {
        self.event_rx.try_iter().collect()
    }

    /// Stop, reconcile, and hand over the run's histories
    pub fn finish(mut self) -> Result<CaptureReport> {
        self.stop()?;
        let mut shared = lock(&self.shared);
        let accumulator = std::mem::take(&mut shared.accumulator);
        let trailing = shared.trailing_bytes;
        drop(shared);
        Ok(accumulator.finish(trailing))
    }

    /// Received frames, byte for byte, as a capture that
    /// [`crate::session::BatchIngest`] can re-read
    pub fn raw_capture(&self) -> Vec<u8> {
        let shared = lock(&self.shared);
        let mut bytes = Vec::new();
        for entry in shared.raw_log.iter().filter(|e| e.direction == Direction::Rx) {
            bytes.extend_from_slice(&entry.bytes);
            bytes.push(crate::protocol::FRAME_DELIMITER);
        }
        bytes
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        if self.handle.is_some() {
            if let Err(e) = self.stop() {
                tracing::warn!("Failed to stop live session on drop: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Record;

    const FRAMES: &[u8] = b"~HSVI,1,0,A,5\r~HSAC,1A,2B,3C\r~HSRD,FF\r~HSAC,1,2,3\r";

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.serial.read_chunk_size = 8;
        config
    }

    #[test]
    fn test_session_lifecycle() {
        let config = test_config();
        let mut session = LiveSession::new(&config);
        assert_eq!(session.state(), SessionState::Idle);

        session
            .start(Box::new(ReplaySource::new(FRAMES.to_vec()).hold_open(true)))
            .unwrap();
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.source_name(), Some("replay"));

        session.stop().unwrap();
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[test]
    fn test_cannot_restart() {
        let mut session = LiveSession::new(&test_config());
        session.start(Box::new(ReplaySource::new(Vec::new()))).unwrap();
        session.stop().unwrap();

        let err = session
            .start(Box::new(ReplaySource::new(Vec::new())))
            .unwrap_err();
        assert!(matches!(err, HsError::Session(_)));
    }

    #[test]
    fn test_cannot_start_twice() {
        let mut session = LiveSession::new(&test_config());
        session
            .start(Box::new(ReplaySource::new(Vec::new()).hold_open(true)))
            .unwrap();
        assert!(session
            .start(Box::new(ReplaySource::new(Vec::new())))
            .is_err());
        session.stop().unwrap();
    }

    #[test]
    fn test_source_closure_stops_session() {
        let mut session = LiveSession::new(&test_config());
        session.start(Box::new(ReplaySource::new(FRAMES.to_vec()))).unwrap();

        assert!(session.wait_for_stop(Duration::from_secs(5)));
        assert_eq!(session.state(), SessionState::Stopped);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.latest.frames, 4);
        assert_eq!(snapshot.accel_count, 2);
        assert_eq!(snapshot.pot_count, 1);

        let events = session.drain_events();
        let records: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                LiveEvent::Frame { outcome, .. } => outcome.decoded.record().copied(),
                _ => None,
            })
            .collect();
        assert_eq!(records.len(), 4);
        assert!(matches!(records[0], Record::Version(_)));
        assert!(matches!(events.last(), Some(LiveEvent::Stopped)));
    }

    #[test]
    fn test_send_command_requires_running() {
        let session = LiveSession::new(&test_config());
        assert!(session.send_command(DeviceCommand::GetVersion).is_err());
    }

    #[test]
    fn test_finish_reconciles() {
        let mut session = LiveSession::new(&test_config());
        session.start(Box::new(ReplaySource::new(FRAMES.to_vec()))).unwrap();
        assert!(session.wait_for_stop(Duration::from_secs(5)));

        let report = session.finish().unwrap();
        assert_eq!(report.accel.len(), 1);
        assert_eq!(report.pot.len(), 1);
        assert_eq!(report.version.map(|v| v.to_string()).as_deref(), Some("1.0.10.5"));
    }

    #[test]
    fn test_raw_capture_reingests() {
        let mut session = LiveSession::new(&test_config());
        session.start(Box::new(ReplaySource::new(FRAMES.to_vec()))).unwrap();
        assert!(session.wait_for_stop(Duration::from_secs(5)));

        assert_eq!(session.raw_capture(), FRAMES.to_vec());
    }

    #[test]
    fn test_raw_capture_keeps_invalid_utf8_bytes() {
        let capture = b"~HSRD,1\r\xFF\xFE\r~HSRD,2\r".to_vec();
        let mut session = LiveSession::new(&test_config());
        session.start(Box::new(ReplaySource::new(capture.clone()))).unwrap();
        assert!(session.wait_for_stop(Duration::from_secs(5)));

        let raw = session.raw_capture();
        assert_eq!(raw, capture);

        let live = session.finish().unwrap();
        let replayed = crate::session::BatchIngest::run(&raw);
        assert_eq!(replayed.stats.malformed, 1);
        assert_eq!(replayed, live);
    }
}
