//! Time source used for probe timing, backoff sleeps and history timestamps

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

/// Clock abstraction so retry delays and probe timings can be observed in tests
#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic timestamp for measuring elapsed time
    fn now(&self) -> Instant;

    /// Wall-clock time used to stamp history entries
    fn wall_time(&self) -> DateTime<Utc>;

    /// Suspend the current task for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ManualClock;
    use super::*;

    #[tokio::test]
    async fn test_manual_clock_records_sleeps() {
        let clock = ManualClock::new();
        let start = clock.now();

        clock.sleep(Duration::from_millis(500)).await;
        clock.advance(Duration::from_millis(20));
        clock.sleep(Duration::from_millis(1000)).await;

        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_millis(500), Duration::from_millis(1000)]
        );
        assert_eq!(clock.now() - start, Duration::from_millis(1520));
    }

    #[tokio::test]
    async fn test_tokio_clock_sleep_advances_time() {
        let clock = TokioClock;
        let start = clock.now();
        clock.sleep(Duration::from_millis(20)).await;
        assert!(clock.now() - start >= Duration::from_millis(20));
    }
}
