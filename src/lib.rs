//! # HS-Telemetry: ~HS serial protocol decoder and capture tool
//!
//! Decodes the carriage-return delimited text protocol spoken by the HS
//! sensor board, which streams accelerometer (`~HSAC`), potentiometer
//! (`~HSRD`) and firmware version (`~HSVI`) frames with hex-encoded fields.
//! The same decoding pipeline serves both offline files and a live serial
//! connection.
//!
//! ## Architecture
//!
//! - **Protocol**: byte framing, frame decoding and outbound device commands
//! - **Session**: per-stream sample accumulation, batch ingest and
//!   end-of-run reconciliation of the two streams
//! - **Backend**: the live reader thread, its shared state and the serial /
//!   replay transports
//! - **Export**: CSV, normalised combined CSV, raw capture and JSON summary
//!
//! ## Configuration
//!
//! Settings are read from `config.toml` in the platform configuration
//! directory under `dev.hs-telemetry`:
//!
//! - **Linux**: `~/.config/dev.hs-telemetry/`
//! - **macOS**: `~/Library/Application Support/dev.hs-telemetry/`
//! - **Windows**: `%APPDATA%\dev.hs-telemetry\`
//!
//! ## Example
//!
//! ```no_run
//! use hs_telemetry::{BatchIngest, CaptureSummary, ReportExporter, AppConfig};
//!
//! fn main() -> hs_telemetry::Result<()> {
//!     let config = AppConfig::default();
//!     let report = BatchIngest::from_file("capture.txt")?;
//!
//!     let summary = CaptureSummary::new(&report, "capture.txt");
//!     ReportExporter::new("out", config.export).export(&report, &summary, None)?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod protocol;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use backend::{LiveEvent, LiveSession, ReplaySource, SerialSource};
pub use config::AppConfig;
pub use error::{HsError, Result};
pub use export::{CaptureSummary, ReportExporter};
pub use protocol::{decode_frame, ByteFramer, Decoded, DeviceCommand, RawFrame, Record};
pub use session::{BatchIngest, CaptureReport, SampleAccumulator};
pub use types::{AccelSample, PotSample, SampleHistory, VersionInfo};
