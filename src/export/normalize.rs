//! Min-max normalisation for the combined view
//!
//! The potentiometer and accelerometer live on unrelated scales, so both
//! are squashed into `[0, 1]` before being paired. The accelerometer is
//! reduced to its vector magnitude first.

use serde::Serialize;

use crate::session::CaptureReport;

/// Divisor used when every value is identical
///
/// Every numerator is then zero, so a flat series normalises to zeros.
pub const ZERO_RANGE_DIVISOR: f64 = 0.00001;

/// Scale values into `[0, 1]` by their min and max
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.iter().copied().fold(min, f64::max);

    let range = max - min;
    let divisor = if range == 0.0 { ZERO_RANGE_DIVISOR } else { range };
    values.iter().map(|v| (v - min) / divisor).collect()
}

/// One row of the combined export
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedPair {
    #[serde(rename = "Sample Number")]
    pub index: u64,
    #[serde(rename = "Potentiometer")]
    pub pot: f64,
    #[serde(rename = "Accelerometer")]
    pub accel: f64,
}

/// Normalised, index-aligned pairs of both streams
pub fn normalized_pairs(report: &CaptureReport) -> Vec<NormalizedPair> {
    let count = report.pair_count();
    let pot: Vec<f64> = report.pot.iter().take(count).map(|s| s.value as f64).collect();
    let accel: Vec<f64> = report.accel.iter().take(count).map(|s| s.magnitude()).collect();

    let pot = normalize(&pot);
    let accel = normalize(&accel);

    report
        .accel
        .iter()
        .zip(pot.into_iter().zip(accel))
        .map(|(sample, (pot, accel))| NormalizedPair {
            index: sample.index,
            pot,
            accel,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::BatchIngest;

    #[test]
    fn test_normalize_range() {
        let normalized = normalize(&[2.0, 4.0, 6.0]);
        assert_eq!(normalized, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_flat_series_normalizes_to_zero() {
        assert_eq!(normalize(&[3.0, 3.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_empty_series() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_pairs_use_magnitude() {
        let report = BatchIngest::run(
            b"~HSAC,3,4,0\r~HSRD,0\r~HSAC,6,8,0\r~HSRD,A\r~HSAC,0,0,0\r~HSRD,5\r",
        );
        let pairs = normalized_pairs(&report);

        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].index, 0);
        assert!((pairs[0].accel - 0.5).abs() < 1e-9);
        assert!((pairs[1].accel - 1.0).abs() < 1e-9);
        assert_eq!(pairs[2].accel, 0.0);
        assert_eq!(pairs[1].pot, 1.0);
        assert_eq!(pairs[2].pot, 0.5);
    }
}
