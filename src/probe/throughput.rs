//! Throughput arithmetic

use crate::defaults::BYTES_PER_MEGABYTE;
use std::time::Duration;

/// Shortest elapsed time used in a rate calculation
pub const MIN_ELAPSED: Duration = Duration::from_millis(1);

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Megabits carried by `bytes` (1 megabyte = 1,048,576 bytes)
pub fn bytes_to_megabits(bytes: usize) -> f64 {
    bytes as f64 * 8.0 / BYTES_PER_MEGABYTE
}

pub fn megabytes_to_megabits(megabytes: f64) -> f64 {
    megabytes * 8.0
}

/// `megabits / elapsed_seconds`, rounded to two decimals.
///
/// Elapsed time is floored at [`MIN_ELAPSED`] so an instant response still
/// yields a finite rate.
pub fn megabits_per_second(megabits: f64, elapsed: Duration) -> f64 {
    let seconds = elapsed.max(MIN_ELAPSED).as_secs_f64();
    round2(megabits / seconds)
}

/// Whole milliseconds, truncated
pub fn whole_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_upload_payload_is_eight_megabits() {
        assert_eq!(bytes_to_megabits(1024 * 1024), 8.0);
    }

    #[test]
    fn test_assumed_download_size() {
        assert!((megabytes_to_megabits(0.1) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_rate_rounding() {
        assert_eq!(megabits_per_second(8.0, Duration::from_secs(2)), 4.0);
        assert_eq!(megabits_per_second(0.8, Duration::from_millis(300)), 2.67);
        assert_eq!(megabits_per_second(8.0, Duration::from_millis(3000)), 2.67);
    }

    #[test]
    fn test_zero_elapsed_is_floored() {
        let rate = megabits_per_second(8.0, Duration::ZERO);
        assert!(rate.is_finite());
        assert_eq!(rate, 8000.0);
    }

    #[test]
    fn test_whole_millis_truncates() {
        assert_eq!(whole_millis(Duration::from_micros(1_999)), 1);
        assert_eq!(whole_millis(Duration::from_secs(2)), 2000);
    }

    proptest! {
        #[test]
        fn prop_rate_matches_rounded_quotient(megabits in 0.0f64..1_000.0, elapsed_ms in 1u64..600_000) {
            let elapsed = Duration::from_millis(elapsed_ms);
            let expected = (megabits / elapsed.as_secs_f64() * 100.0).round() / 100.0;
            prop_assert_eq!(megabits_per_second(megabits, elapsed), expected);
        }

        #[test]
        fn prop_rate_is_finite_and_non_negative(megabits in 0.0f64..1_000.0, elapsed_us in 0u64..10_000_000) {
            let rate = megabits_per_second(megabits, Duration::from_micros(elapsed_us));
            prop_assert!(rate.is_finite());
            prop_assert!(rate >= 0.0);
        }
    }
}
