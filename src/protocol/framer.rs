//! Byte stream framing
//!
//! Splits an unstructured byte stream into records terminated by a single
//! carriage return (`0x0D`). The delimiter is never part of a frame and is
//! never escaped.
//!
//! The same framer serves both paths:
//!
//! - live reads push arbitrary chunks through [`ByteFramer::push`]
//! - recorded captures go through [`split_frames`] in one pass
//!
//! A trailing fragment with no terminating delimiter is never yielded as a
//! frame. [`ByteFramer::finish`] hands it back so the caller can log it.

use std::fmt;

/// Record delimiter byte
pub const FRAME_DELIMITER: u8 = b'\r';

/// One complete record, delimiter excluded
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RawFrame(Vec<u8>);

impl RawFrame {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Frame text for display; invalid UTF-8 is replaced, not rejected
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawFrame({:?})", self.to_text())
    }
}

impl From<&str> for RawFrame {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<&[u8]> for RawFrame {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// Incremental framer for chunked input
///
/// Not restartable: create a fresh instance per run.
#[derive(Debug, Default)]
pub struct ByteFramer {
    pending: Vec<u8>,
    frames_emitted: u64,
}

impl ByteFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and collect every frame it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<RawFrame> {
        let mut frames = Vec::new();
        for &byte in chunk {
            if let Some(frame) = self.push_byte(byte) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Feed a single byte; returns a frame when the byte is the delimiter
    pub fn push_byte(&mut self, byte: u8) -> Option<RawFrame> {
        if byte == FRAME_DELIMITER {
            self.frames_emitted += 1;
            Some(RawFrame(std::mem::take(&mut self.pending)))
        } else {
            self.pending.push(byte);
            None
        }
    }

    /// Bytes received since the last delimiter
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Number of frames emitted so far
    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }

    /// End the run, returning any unterminated trailing bytes
    pub fn finish(self) -> Option<RawFrame> {
        if self.pending.is_empty() {
            None
        } else {
            Some(RawFrame(self.pending))
        }
    }

    /// Lazily frame a byte iterator
    pub fn frames<I>(bytes: I) -> Frames<I::IntoIter>
    where
        I: IntoIterator<Item = u8>,
    {
        Frames {
            bytes: bytes.into_iter(),
            framer: ByteFramer::new(),
        }
    }
}

/// Lazy frame iterator over a byte source
///
/// Yields complete frames only; the unterminated tail stays in
/// [`Frames::pending`] once the source is exhausted.
#[derive(Debug)]
pub struct Frames<I> {
    bytes: I,
    framer: ByteFramer,
}

impl<I> Frames<I> {
    /// Unterminated bytes seen after the last yielded frame
    pub fn pending(&self) -> &[u8] {
        self.framer.pending()
    }
}

impl<I: Iterator<Item = u8>> Iterator for Frames<I> {
    type Item = RawFrame;

    fn next(&mut self) -> Option<RawFrame> {
        for byte in self.bytes.by_ref() {
            if let Some(frame) = self.framer.push_byte(byte) {
                return Some(frame);
            }
        }
        None
    }
}

/// Lazily frame a fully read buffer
///
/// Equivalent to splitting on every `\r` and discarding the last piece,
/// regardless of how the capture was stored.
pub fn split_frames(buffer: &[u8]) -> Frames<std::iter::Copied<std::slice::Iter<'_, u8>>> {
    ByteFramer::frames(buffer.iter().copied())
}
