//! Per-worker rate ticker

use std::num::NonZeroU32;
use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Emits evenly spaced ticks at `rate` per second, starting
/// immediately.
///
/// Ticks missed while the caller is busy are dropped rather than
/// queued, so a slow ledger call bounds achieved throughput instead of
/// producing a burst afterwards. Dropping the ticker releases the
/// timer on every exit path.
#[derive(Debug)]
pub struct RateTicker {
    interval: Interval,
}

impl RateTicker {
    /// Create a ticker for the given per-second rate.
    pub fn new(rate: NonZeroU32) -> Self {
        // Rates above 1e9/s would truncate to a zero period, which the
        // timer rejects; clamp to the finest interval it can express.
        let period = (Duration::from_secs(1) / rate.get()).max(Duration::from_nanos(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }

    /// The interval between ticks.
    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    /// Wait for the next tick.
    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[tokio::test]
    async fn period_is_one_second_over_rate() {
        assert_eq!(RateTicker::new(rate(10)).period(), Duration::from_millis(100));
        assert_eq!(RateTicker::new(rate(1)).period(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn extreme_rate_clamps_to_one_nanosecond() {
        assert_eq!(
            RateTicker::new(rate(u32::MAX)).period(),
            Duration::from_nanos(1)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_fires_immediately() {
        let mut ticker = RateTicker::new(rate(1));
        let start = Instant::now();
        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_are_evenly_spaced() {
        let mut ticker = RateTicker::new(rate(10));
        let start = Instant::now();
        for _ in 0..5 {
            ticker.tick().await;
        }
        // First tick at t=0, then four 100ms periods.
        assert_eq!(start.elapsed(), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn missed_ticks_are_dropped_not_queued() {
        let mut ticker = RateTicker::new(rate(10));
        ticker.tick().await;

        // Simulate a slow work item spanning several periods.
        tokio::time::sleep(Duration::from_millis(350)).await;

        let before = Instant::now();
        ticker.tick().await;
        let first_gap = before.elapsed();
        ticker.tick().await;

        // The late tick fires on the next schedule slot, and the one
        // after it is a full period later: no burst of make-up ticks.
        assert!(first_gap <= Duration::from_millis(100));
        assert_eq!(ticker.period(), Duration::from_millis(100));
    }
}
