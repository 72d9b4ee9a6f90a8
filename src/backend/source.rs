//! ByteSource trait for the live reader
//!
//! This module provides the seam between the reader thread and whatever
//! delivers bytes: a real serial port ([`super::SerialSource`]) or a
//! recorded capture replayed in chunks ([`super::ReplaySource`]).

use crate::error::Result;

/// Outcome of one bounded read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// This many bytes were written to the front of the buffer
    Data(usize),
    /// The read timeout elapsed without data
    Idle,
    /// The source has ended and will never yield more bytes
    Closed,
}

/// A pull-based byte transport
///
/// `read` must return within the source's read timeout so the reader thread
/// can notice a stop request.
#[cfg_attr(test, mockall::automock)]
pub trait ByteSource {
    /// Read whatever is available into `buf`, waiting at most one timeout
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus>;

    /// Write a complete command frame
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Human readable name (port path, capture file)
    fn describe(&self) -> String;
}

/// Boxed source handed to the reader thread
pub type BoxedSource = Box<dyn ByteSource + Send>;
