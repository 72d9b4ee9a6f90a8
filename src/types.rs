//! Core data types for hs-telemetry
//!
//! This module contains the sample records produced by decoding the device
//! stream and the per-stream history they accumulate into.
//!
//! # Main Types
//!
//! - [`AccelSample`] - One indexed accelerometer reading (x, y, z)
//! - [`PotSample`] - One indexed potentiometer reading
//! - [`VersionInfo`] - Firmware version report, display only
//! - [`SampleHistory`] - Insertion-ordered samples of one stream
//!
//! # Field Width
//!
//! Hex fields are decoded as unsigned 32-bit integers. The device never
//! documents signedness, so two's-complement readings (e.g. a negative
//! acceleration sent as `FFF0`) show up as large positive values here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Something that carries a per-stream sample index
pub trait Indexed {
    /// Position of this sample within its stream, starting at 0
    fn index(&self) -> u64;
}

/// One decoded accelerometer reading
///
/// Serialized field names match the CSV export header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccelSample {
    /// Number of accelerometer samples decoded before this one in the run
    #[serde(rename = "Sample Number")]
    pub index: u64,
    #[serde(rename = "X Data")]
    pub x: u32,
    #[serde(rename = "Y Data")]
    pub y: u32,
    #[serde(rename = "Z Data")]
    pub z: u32,
}

impl AccelSample {
    /// Euclidean magnitude of the (x, y, z) vector
    pub fn magnitude(&self) -> f64 {
        let (x, y, z) = (self.x as f64, self.y as f64, self.z as f64);
        (x * x + y * y + z * z).sqrt()
    }
}

impl Indexed for AccelSample {
    fn index(&self) -> u64 {
        self.index
    }
}

/// One decoded potentiometer reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PotSample {
    /// Number of potentiometer samples decoded before this one in the run
    #[serde(rename = "Sample Number")]
    pub index: u64,
    #[serde(rename = "Potentiometer Data")]
    pub value: u32,
}

impl Indexed for PotSample {
    fn index(&self) -> u64 {
        self.index
    }
}

/// Firmware version reported by a `~HSVI` frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VersionInfo {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub build: u32,
}

impl VersionInfo {
    pub fn new(major: u32, minor: u32, patch: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.build
        )
    }
}

/// Insertion-ordered samples of a single stream
///
/// Only the accumulator appends; the reconciler is the only thing that
/// removes, and only from the tail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleHistory<T> {
    samples: Vec<T>,
}

impl<T> Default for SampleHistory<T> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
        }
    }
}

impl<T> SampleHistory<T> {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample
    pub fn last(&self) -> Option<&T> {
        self.samples.last()
    }

    /// Iterate samples in index order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.samples.iter()
    }

    /// Borrow all samples
    pub fn as_slice(&self) -> &[T] {
        &self.samples
    }

    /// Consume into the underlying vector
    pub fn into_vec(self) -> Vec<T> {
        self.samples
    }

    pub(crate) fn push(&mut self, sample: T) {
        self.samples.push(sample);
    }

    pub(crate) fn pop(&mut self) -> Option<T> {
        self.samples.pop()
    }
}

impl<T: Indexed> SampleHistory<T> {
    /// Check that indices run `0, 1, 2, ...` with no gaps or duplicates
    pub fn indices_contiguous(&self) -> bool {
        self.samples
            .iter()
            .enumerate()
            .all(|(pos, sample)| sample.index() == pos as u64)
    }
}

impl<'a, T> IntoIterator for &'a SampleHistory<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
