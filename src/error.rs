//! Error handling for hs-telemetry
//!
//! This module defines the crate error type and a Result alias used
//! throughout the library. Malformed frames are not errors: the decoder
//! reports them as [`crate::protocol::Decoded::Unrecognized`] and the run
//! continues.

use thiserror::Error;

/// Main error type for hs-telemetry operations
#[derive(Error, Debug)]
pub enum HsError {
    /// Errors raised by the serial transport (open, read, write)
    #[error("Transport error: {0}")]
    Transport(String),

    /// No serial port matched the requested identifier
    #[error("No serial port matching '{query}' (available: {})", .available.join(", "))]
    PortNotFound {
        query: String,
        available: Vec<String>,
    },

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Live session lifecycle misuse (e.g. starting twice)
    #[error("Session error: {0}")]
    Session(String),

    /// Errors related to channel communication with the reader thread
    #[error("Channel error: {0}")]
    Channel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<HsError>,
    },
}

impl HsError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        HsError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serialport::Error> for HsError {
    fn from(err: serialport::Error) -> Self {
        HsError::Transport(err.to_string())
    }
}

/// Result type alias for hs-telemetry operations
pub type Result<T> = std::result::Result<T, HsError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<HsError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
