//! Configuration module for hs-telemetry
//!
//! This module handles application configuration:
//! - Serial transport settings (port, baud rate, read timeout)
//! - Live session queue sizes
//! - Capture and export defaults
//! - Logging filter and optional log file
//!
//! Every field has a default, so an empty or partial TOML file is valid.
//!
//! # Config Location
//!
//! The default config file lives in the platform config directory under
//! `dev.hs-telemetry`:
//! - **Linux**: `~/.config/dev.hs-telemetry/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.hs-telemetry/config.toml`
//! - **Windows**: `%APPDATA%\dev.hs-telemetry\config.toml`
//!
//! # Example
//!
//! ```toml
//! [serial]
//! port = "usbserial"
//! read_timeout_ms = 20
//!
//! [capture]
//! save_raw = false
//! ```

use crate::error::{HsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for config directories
pub const APP_ID: &str = "dev.hs-telemetry";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Device baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default serial read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10;

/// Default size of a single serial read
pub const DEFAULT_READ_CHUNK_SIZE: usize = 256;

/// Default capacity of the live event queue
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 10_000;

/// Get the application config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

// ==================== App Config ====================

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Serial transport configuration
    #[serde(default)]
    pub serial: SerialConfig,

    /// Live session configuration
    #[serde(default)]
    pub live: LiveConfig,

    /// Timed capture configuration
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Export file names
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file path
    pub fn default_path() -> Option<PathBuf> {
        config_dir().map(|p| p.join(CONFIG_FILE))
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HsError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            HsError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load a config file if it exists, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }

        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save config as TOML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    HsError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| HsError::Serialization(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| HsError::Config(format!("Failed to write config file: {}", e)))
    }

    /// Reject values the reader loop cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.serial.baud_rate == 0 {
            return Err(HsError::Config("serial.baud_rate must be positive".into()));
        }
        if self.serial.read_chunk_size == 0 {
            return Err(HsError::Config(
                "serial.read_chunk_size must be positive".into(),
            ));
        }
        if self.serial.read_timeout_ms == 0 {
            return Err(HsError::Config(
                "serial.read_timeout_ms must be positive".into(),
            ));
        }
        if self.live.event_queue_capacity == 0 || self.live.command_queue_capacity == 0 {
            return Err(HsError::Config("live queue capacities must be positive".into()));
        }
        Ok(())
    }
}

// ==================== Serial Config ====================

/// Serial transport configuration
///
/// Data bits, parity and stop bits are fixed at 8N1 by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Port path or a substring of it (e.g. "usbserial", "COM3")
    #[serde(default)]
    pub port: Option<String>,

    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Upper bound on a single read; also bounds how long stop takes
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Bytes requested per read
    #[serde(default = "default_read_chunk_size")]
    pub read_chunk_size: usize,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

fn default_read_chunk_size() -> usize {
    DEFAULT_READ_CHUNK_SIZE
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

impl SerialConfig {
    /// Read timeout as a Duration
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Copy with a different port
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }
}

// ==================== Live Config ====================

/// Live session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveConfig {
    /// Capacity of the event queue to the consumer; events past it are dropped
    #[serde(default = "default_event_queue_capacity")]
    pub event_queue_capacity: usize,

    /// Capacity of the command queue to the reader thread
    #[serde(default = "default_command_queue_capacity")]
    pub command_queue_capacity: usize,
}

fn default_event_queue_capacity() -> usize {
    DEFAULT_EVENT_QUEUE_CAPACITY
}

fn default_command_queue_capacity() -> usize {
    64
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            command_queue_capacity: default_command_queue_capacity(),
        }
    }
}

// ==================== Capture Config ====================

/// Capture output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Write the raw frame log next to the exports
    #[serde(default = "default_true")]
    pub save_raw: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            save_raw: true,
        }
    }
}

// ==================== Export Config ====================

/// Output file names inside the export directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub accel_file: String,
    pub pot_file: String,
    /// Normalized, index-aligned pairs of both streams
    pub combined_file: String,
    pub raw_file: String,
    pub summary_file: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            accel_file: "accel.csv".to_string(),
            pot_file: "pot.csv".to_string(),
            combined_file: "both.csv".to_string(),
            raw_file: "raw.txt".to_string(),
            summary_file: "session.json".to_string(),
        }
    }
}

// ==================== Logging Config ====================

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default)]
    pub filter: Option<String>,

    /// Also write logs to this file
    #[serde(default)]
    pub file: Option<PathBuf>,
}
