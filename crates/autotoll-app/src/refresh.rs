//! Poll scheduling for periodically refreshed views

use std::time::{Duration, Instant};

/// Decides when a polled fetch is due again.
///
/// Time is passed in rather than read internally so schedules can be
/// driven with synthetic instants in tests.
#[derive(Debug, Clone)]
pub struct RefreshSchedule {
    period: Duration,
    last: Option<Instant>,
    forced: bool,
}

impl RefreshSchedule {
    pub fn new(period: Duration) -> Self {
        RefreshSchedule {
            period,
            last: None,
            forced: false,
        }
    }

    pub fn every_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// True when a fetch should run now: never fetched, period elapsed,
    /// or a refresh was forced.
    pub fn due(&self, now: Instant) -> bool {
        if self.forced {
            return true;
        }
        match self.last {
            None => true,
            Some(last) => now.duration_since(last) >= self.period,
        }
    }

    /// Record that a fetch ran, clearing any forced refresh
    pub fn mark(&mut self, now: Instant) {
        self.last = Some(now);
        self.forced = false;
    }

    /// Make the next `due` check fire immediately
    pub fn force(&mut self) {
        self.forced = true;
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_check_is_always_due() {
        let schedule = RefreshSchedule::every_secs(5);
        assert!(schedule.due(Instant::now()));
    }

    #[test]
    fn due_again_only_after_the_period() {
        let mut schedule = RefreshSchedule::every_secs(5);
        let start = Instant::now();
        schedule.mark(start);

        assert!(!schedule.due(start + Duration::from_secs(4)));
        assert!(schedule.due(start + Duration::from_secs(5)));
        assert!(schedule.due(start + Duration::from_secs(60)));
    }

    #[test]
    fn force_fires_immediately_and_is_consumed() {
        let mut schedule = RefreshSchedule::every_secs(30);
        let start = Instant::now();
        schedule.mark(start);
        assert!(!schedule.due(start + Duration::from_secs(1)));

        schedule.force();
        assert!(schedule.due(start + Duration::from_secs(1)));

        schedule.mark(start + Duration::from_secs(1));
        assert!(!schedule.due(start + Duration::from_secs(2)));
    }
}
