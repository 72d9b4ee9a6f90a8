//! Machine-readable summary of a capture

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HsError, Result, ResultExt};
use crate::session::{CaptureReport, FrameStats, Reconciliation};

/// Counts and provenance written next to the CSV files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSummary {
    pub recorded_at: DateTime<Utc>,
    /// Port name or capture file the samples came from
    pub source: String,
    /// Requested capture length, for timed captures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    pub accel_samples: usize,
    pub pot_samples: usize,
    /// Device firmware version as `major.minor.patch.build`
    #[serde(default)]
    pub version: Option<String>,
    pub stats: FrameStats,
    pub reconciliation: Reconciliation,
    pub trailing_bytes: usize,
}

impl CaptureSummary {
    pub fn new(report: &CaptureReport, source: impl Into<String>) -> Self {
        Self {
            recorded_at: Utc::now(),
            source: source.into(),
            duration_secs: None,
            accel_samples: report.accel.len(),
            pot_samples: report.pot.len(),
            version: report.version.map(|v| v.to_string()),
            stats: report.stats,
            reconciliation: report.reconciliation,
            trailing_bytes: report.trailing_bytes,
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_secs = Some(seconds);
        self
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| HsError::Serialization(e.to_string()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
        Ok(())
    }
}
