//! Sample accumulation, reconciliation and batch ingestion
//!
//! This module turns decoded frames into indexed sample histories. It is
//! shared by the live reader thread ([`crate::backend`]) and the offline
//! [`BatchIngest`] path so both produce the same histories from the same
//! bytes.
//!
//! # Flow
//!
//! ```text
//! RawFrame -> SampleAccumulator::ingest -> histories -> reconcile -> CaptureReport
//! ```

pub mod accumulator;
pub mod batch;
pub mod reconcile;
pub mod types;

pub use accumulator::{Applied, FrameOutcome, SampleAccumulator};
pub use batch::BatchIngest;
pub use reconcile::{reconcile, Reconciliation};
pub use types::{CaptureReport, FrameStats, SessionState};
