//! Reader Thread Implementation
//!
//! This module contains the loop that runs on the live session's dedicated
//! thread. It owns the byte source and is the only writer of the shared
//! session state.
//!
//! # Responsibilities
//!
//! - **Command processing**: writes device commands and honours stop requests
//! - **Framing and decoding**: pushes each read chunk through the framer and
//!   the accumulator
//! - **Publishing**: updates the raw log and latest values, then emits
//!   [`LiveEvent`]s in frame order
//! - **Error handling**: a transport failure ends the session; one that
//!   arrives after stop was requested is swallowed
//!
//! # Stop Latency
//!
//! Every read is bounded by the source's timeout, and the running flag is
//! checked between reads, so a stop completes within one read interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use super::source::{BoxedSource, ReadStatus};
use super::state::{lock, Direction, Shared};
use super::{LiveCommand, LiveEvent};
use crate::protocol::{ByteFramer, DeviceCommand};
use crate::session::SessionState;

/// The reader loop for one live session
pub struct LiveWorker {
    source: BoxedSource,
    framer: ByteFramer,
    shared: Shared,
    running: Arc<AtomicBool>,
    command_rx: Receiver<LiveCommand>,
    event_tx: Sender<LiveEvent>,
    buffer: Vec<u8>,
}

impl LiveWorker {
    pub(crate) fn new(
        source: BoxedSource,
        shared: Shared,
        running: Arc<AtomicBool>,
        command_rx: Receiver<LiveCommand>,
        event_tx: Sender<LiveEvent>,
        read_chunk_size: usize,
    ) -> Self {
        Self {
            source,
            framer: ByteFramer::new(),
            shared,
            running,
            command_rx,
            event_tx,
            buffer: vec![0u8; read_chunk_size.max(1)],
        }
    }

    /// Run until stopped or the source ends
    pub fn run(mut self) {
        tracing::info!("Reader started on {}", self.source.describe());

        while self.running.load(Ordering::SeqCst) {
            self.process_commands();
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            match self.source.read(&mut self.buffer) {
                Ok(ReadStatus::Data(n)) => self.handle_bytes(n),
                Ok(ReadStatus::Idle) => {}
                Ok(ReadStatus::Closed) => {
                    tracing::info!("Source {} closed", self.source.describe());
                    break;
                }
                Err(e) => {
                    if !self.running.load(Ordering::SeqCst) {
                        tracing::debug!("Ignoring read error after stop: {}", e);
                    } else {
                        tracing::error!("Reader failed: {}", e);
                        let message = e.to_string();
                        lock(&self.shared).last_error = Some(message.clone());
                        self.publish(LiveEvent::TransportError(message));
                    }
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        self.finalize();
    }

    /// Process pending commands from the session owner
    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(LiveCommand::Send(cmd)) => self.send_device_command(cmd),
                Ok(LiveCommand::Stop) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    fn send_device_command(&mut self, cmd: DeviceCommand) {
        lock(&self.shared).push_log(Direction::Tx, cmd.text().as_bytes().to_vec());

        match self.source.write(cmd.as_bytes()) {
            Ok(()) => {
                tracing::info!("Sent {} command", cmd);
                self.publish(LiveEvent::CommandSent(cmd));
            }
            Err(e) => {
                tracing::warn!("Failed to send {} command: {}", cmd, e);
                self.publish(LiveEvent::CommandFailed {
                    command: cmd,
                    error: e.to_string(),
                });
            }
        }
    }

    /// Frame a chunk and apply every completed frame under one lock
    fn handle_bytes(&mut self, n: usize) {
        let frames = self.framer.push(&self.buffer[..n]);
        if frames.is_empty() {
            return;
        }

        let mut events = Vec::with_capacity(frames.len());
        {
            let mut shared = lock(&self.shared);
            for frame in frames {
                shared.push_log(Direction::Rx, frame.as_bytes().to_vec());
                shared.latest.frames += 1;

                let outcome = shared.accumulator.ingest(&frame);
                if let Some(applied) = &outcome.applied {
                    shared.latest.update(applied);
                }

                events.push(LiveEvent::Frame {
                    number: shared.latest.frames,
                    outcome,
                });
            }
        }

        for event in events {
            self.publish(event);
        }
    }

    /// Send an event without blocking; the shared state stays authoritative
    fn publish(&self, event: LiveEvent) {
        if self.event_tx.try_send(event).is_err() {
            lock(&self.shared).dropped_events += 1;
        }
    }

    fn finalize(&mut self) {
        let trailing = self.framer.pending().len();
        {
            let mut shared = lock(&self.shared);
            shared.state = SessionState::Stopped;
            shared.trailing_bytes = trailing;
        }
        if trailing > 0 {
            tracing::debug!("Reader stopped with {} unterminated bytes", trailing);
        }

        self.publish(LiveEvent::Stopped);
        tracing::info!("Reader stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::source::MockByteSource;
    use crate::backend::state::SharedState;
    use crate::error::HsError;
    use crossbeam_channel::bounded;
    use std::sync::Mutex;

    fn create_test_worker(
        source: BoxedSource,
    ) -> (
        LiveWorker,
        Shared,
        Sender<LiveCommand>,
        Receiver<LiveEvent>,
    ) {
        let shared: Shared = Arc::new(Mutex::new(SharedState {
            state: SessionState::Running,
            ..Default::default()
        }));
        let (cmd_tx, cmd_rx) = bounded(16);
        let (event_tx, event_rx) = bounded(64);
        let running = Arc::new(AtomicBool::new(true));
        let worker = LiveWorker::new(source, shared.clone(), running, cmd_rx, event_tx, 32);
        (worker, shared, cmd_tx, event_rx)
    }

    fn scripted(chunks: Vec<&'static [u8]>) -> MockByteSource {
        let mut source = MockByteSource::new();
        let mut chunks = chunks.into_iter();
        source.expect_read().returning(move |buf| match chunks.next() {
            Some(chunk) => {
                buf[..chunk.len()].copy_from_slice(chunk);
                Ok(ReadStatus::Data(chunk.len()))
            }
            None => Ok(ReadStatus::Closed),
        });
        source.expect_describe().return_const("mock".to_string());
        source
    }

    #[test]
    fn test_frames_update_shared_state() {
        let source = scripted(vec![b"~HSAC,1A,2B,3C\r~HS", b"RD,FF\r~HSVI,1,0,A,5\r~HSA"]);
        let (worker, shared, _cmd_tx, event_rx) = create_test_worker(Box::new(source));

        worker.run();

        let state = lock(&shared);
        assert_eq!(state.state, SessionState::Stopped);
        assert_eq!(state.latest.frames, 3);
        assert_eq!(state.latest.accel.map(|a| (a.x, a.y, a.z)), Some((26, 43, 60)));
        assert_eq!(state.latest.pot.map(|p| p.value), Some(255));
        assert_eq!(state.latest.version.map(|v| v.to_string()).as_deref(), Some("1.0.10.5"));
        assert_eq!(state.raw_log.len(), 3);
        assert_eq!(state.trailing_bytes, 4);
        drop(state);

        let events: Vec<_> = event_rx.try_iter().collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], LiveEvent::Frame { number: 1, .. }));
        assert!(matches!(events.last(), Some(LiveEvent::Stopped)));
    }

    #[test]
    fn test_unrecognized_frames_still_logged() {
        let source = scripted(vec![b"\r~NOPE\r~HSAC,ZZ,1,2\r"]);
        let (worker, shared, _cmd_tx, _event_rx) = create_test_worker(Box::new(source));

        worker.run();

        let state = lock(&shared);
        assert_eq!(state.raw_log.len(), 3);
        assert_eq!(state.raw_log[1].bytes, b"~NOPE");
        assert_eq!(state.accumulator.accel_count(), 0);
        assert_eq!(state.latest.frames, 3);
        assert_eq!(state.latest.accel, None);
    }

    #[test]
    fn test_transport_error_is_surfaced() {
        let mut source = MockByteSource::new();
        source
            .expect_read()
            .returning(|_| Err(HsError::Transport("device unplugged".to_string())));
        source.expect_describe().return_const("mock".to_string());
        let (worker, shared, _cmd_tx, event_rx) = create_test_worker(Box::new(source));

        worker.run();

        let state = lock(&shared);
        assert_eq!(state.state, SessionState::Stopped);
        assert!(state
            .last_error
            .as_deref()
            .is_some_and(|e| e.contains("device unplugged")));
        drop(state);

        let events: Vec<_> = event_rx.try_iter().collect();
        assert!(matches!(events[0], LiveEvent::TransportError(_)));
    }

    #[test]
    fn test_read_error_after_stop_is_swallowed() {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let mut source = MockByteSource::new();
        source.expect_read().returning(move |_| {
            flag.store(false, Ordering::SeqCst);
            Err(HsError::Transport("port closed".to_string()))
        });
        source.expect_describe().return_const("mock".to_string());

        let shared: Shared = Arc::new(Mutex::new(SharedState::default()));
        let (_cmd_tx, cmd_rx) = bounded(1);
        let (event_tx, event_rx) = bounded(8);
        LiveWorker::new(Box::new(source), shared.clone(), running, cmd_rx, event_tx, 8).run();

        assert_eq!(lock(&shared).last_error, None);
        let events: Vec<_> = event_rx.try_iter().collect();
        assert!(matches!(events.as_slice(), [LiveEvent::Stopped]));
    }

    #[test]
    fn test_commands_are_written_and_logged() {
        let mut source = MockByteSource::new();
        source
            .expect_write()
            .withf(|data: &[u8]| data == b"~SHRB,REBOOT\r")
            .times(1)
            .returning(|_| Ok(()));
        source.expect_read().returning(|_| Ok(ReadStatus::Closed));
        source.expect_describe().return_const("mock".to_string());
        let (worker, shared, cmd_tx, event_rx) = create_test_worker(Box::new(source));

        cmd_tx.send(LiveCommand::Send(DeviceCommand::Reboot)).unwrap();
        worker.run();

        let state = lock(&shared);
        assert_eq!(state.raw_log.len(), 1);
        assert_eq!(state.raw_log[0].direction, Direction::Tx);
        assert_eq!(state.raw_log[0].bytes, b"~SHRB,REBOOT");
        drop(state);

        let events: Vec<_> = event_rx.try_iter().collect();
        assert!(matches!(events[0], LiveEvent::CommandSent(DeviceCommand::Reboot)));
    }

    #[test]
    fn test_stop_command_ends_loop_before_reading() {
        let mut source = MockByteSource::new();
        source.expect_read().never();
        source.expect_describe().return_const("mock".to_string());
        let (worker, shared, cmd_tx, _event_rx) = create_test_worker(Box::new(source));

        cmd_tx.send(LiveCommand::Stop).unwrap();
        worker.run();

        assert_eq!(lock(&shared).state, SessionState::Stopped);
    }

    #[test]
    fn test_full_event_queue_counts_drops() {
        let source = scripted(vec![b"~HSRD,1\r~HSRD,2\r~HSRD,3\r"]);
        let shared: Shared = Arc::new(Mutex::new(SharedState::default()));
        let (_cmd_tx, cmd_rx) = bounded(1);
        let (event_tx, event_rx) = bounded(1);
        let running = Arc::new(AtomicBool::new(true));
        LiveWorker::new(Box::new(source), shared.clone(), running, cmd_rx, event_tx, 64).run();

        let state = lock(&shared);
        assert_eq!(state.accumulator.pot_count(), 3);
        assert_eq!(state.dropped_events, 3);
        assert_eq!(event_rx.len(), 1);
    }
}
