//! History reconciliation
//!
//! A capture can stop between the accelerometer and potentiometer frames of
//! one cycle, leaving one stream a sample ahead. Pairing by index needs both
//! histories the same length, so the longer one loses its last sample.
//!
//! Only one sample is ever trimmed. If the streams drifted further apart
//! the remaining gap is reported in [`Reconciliation`] and left alone.

use serde::{Deserialize, Serialize};

use crate::types::{AccelSample, PotSample, SampleHistory};

/// What reconciliation did to the histories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Reconciliation {
    /// Lengths already matched
    #[default]
    Aligned,
    /// Dropped the last accelerometer sample
    TrimmedAccel {
        /// Samples accel still leads by after the trim
        remaining_gap: usize,
    },
    /// Dropped the last potentiometer sample
    TrimmedPot {
        /// Samples pot still leads by after the trim
        remaining_gap: usize,
    },
}

impl Reconciliation {
    /// Check if both histories ended up the same length
    pub fn is_aligned(&self) -> bool {
        match self {
            Reconciliation::Aligned => true,
            Reconciliation::TrimmedAccel { remaining_gap }
            | Reconciliation::TrimmedPot { remaining_gap } => *remaining_gap == 0,
        }
    }
}

/// Trim the strictly longer history by exactly one sample
pub fn reconcile(
    accel: &mut SampleHistory<AccelSample>,
    pot: &mut SampleHistory<PotSample>,
) -> Reconciliation {
    let outcome = if accel.len() > pot.len() {
        accel.pop();
        Reconciliation::TrimmedAccel {
            remaining_gap: accel.len() - pot.len(),
        }
    } else if pot.len() > accel.len() {
        pot.pop();
        Reconciliation::TrimmedPot {
            remaining_gap: pot.len() - accel.len(),
        }
    } else {
        Reconciliation::Aligned
    };

    if !outcome.is_aligned() {
        tracing::warn!(
            "Histories still differ after reconciliation (accel: {}, pot: {})",
            accel.len(),
            pot.len()
        );
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histories(
        accel_len: u64,
        pot_len: u64,
    ) -> (SampleHistory<AccelSample>, SampleHistory<PotSample>) {
        let mut accel = SampleHistory::new();
        for index in 0..accel_len {
            accel.push(AccelSample {
                index,
                x: 1,
                y: 2,
                z: 3,
            });
        }
        let mut pot = SampleHistory::new();
        for index in 0..pot_len {
            pot.push(PotSample { index, value: 9 });
        }
        (accel, pot)
    }

    #[test]
    fn test_trims_longer_accel() {
        let (mut accel, mut pot) = histories(5, 4);
        let outcome = reconcile(&mut accel, &mut pot);

        assert_eq!(outcome, Reconciliation::TrimmedAccel { remaining_gap: 0 });
        assert_eq!(accel.len(), 4);
        assert_eq!(pot.len(), 4);
        assert_eq!(accel.last().map(|s| s.index), Some(3));
    }

    #[test]
    fn test_trims_longer_pot() {
        let (mut accel, mut pot) = histories(2, 3);
        assert_eq!(
            reconcile(&mut accel, &mut pot),
            Reconciliation::TrimmedPot { remaining_gap: 0 }
        );
        assert_eq!(pot.len(), 2);
    }

    #[test]
    fn test_equal_lengths_untouched() {
        let (mut accel, mut pot) = histories(4, 4);
        let before = (accel.clone(), pot.clone());

        assert_eq!(reconcile(&mut accel, &mut pot), Reconciliation::Aligned);
        assert_eq!((accel, pot), before);
    }

    #[test]
    fn test_reconcile_twice_same_as_once() {
        let (mut accel, mut pot) = histories(5, 4);
        reconcile(&mut accel, &mut pot);
        let once = (accel.clone(), pot.clone());

        assert_eq!(reconcile(&mut accel, &mut pot), Reconciliation::Aligned);
        assert_eq!((accel, pot), once);
    }

    #[test]
    fn test_large_divergence_trims_only_one() {
        let (mut accel, mut pot) = histories(7, 4);
        let outcome = reconcile(&mut accel, &mut pot);

        assert_eq!(outcome, Reconciliation::TrimmedAccel { remaining_gap: 2 });
        assert!(!outcome.is_aligned());
        assert_eq!(accel.len(), 6);
        assert_eq!(pot.len(), 4);
    }

    #[test]
    fn test_empty_histories() {
        let (mut accel, mut pot) = histories(0, 0);
        assert_eq!(reconcile(&mut accel, &mut pot), Reconciliation::Aligned);

        let (mut accel, mut pot) = histories(0, 1);
        assert_eq!(
            reconcile(&mut accel, &mut pot),
            Reconciliation::TrimmedPot { remaining_gap: 0 }
        );
        assert!(pot.is_empty());
    }
}
