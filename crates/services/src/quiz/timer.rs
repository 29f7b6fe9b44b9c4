use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Tick driver for the drive loop.
///
/// The first tick fires one full period after construction, so a fresh quiz
/// is never charged for the time spent building it. Missed ticks are delayed
/// rather than bursted, keeping one countdown second per delivered tick.
#[derive(Debug)]
pub struct QuizTicker {
    interval: Interval,
}

impl QuizTicker {
    #[must_use]
    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    #[must_use]
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Wait for the next tick.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let start = Instant::now();
        let mut ticker = QuizTicker::every_second();
        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }
}
