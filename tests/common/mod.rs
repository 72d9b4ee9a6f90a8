//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use hs_telemetry::backend::LiveSession;
use std::time::Duration;

/// Generous bound for a reader thread to drain an in-memory source
pub fn test_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Wait for a session whose source closes on its own
pub fn wait_until_stopped(session: &mut LiveSession) {
    assert!(
        session.wait_for_stop(test_timeout()),
        "Session did not stop within {:?}",
        test_timeout()
    );
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}
