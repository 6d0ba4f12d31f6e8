//! Polling cadence for run resolution.

use std::time::Duration;

/// How long and how often the gateway polls a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wall-clock limit from entry to giving up.
    pub timeout: Duration,
    /// Delay after the first poll.
    pub initial_interval: Duration,
    /// Upper bound the delay doubles towards.
    pub max_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(8),
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(1),
        }
    }
}

impl PollPolicy {
    /// Creates a fixed-cadence policy.
    #[must_use]
    pub fn fixed(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            initial_interval: interval,
            max_interval: interval,
        }
    }

    /// Sets the initial delay, enabling exponential backoff up to the max.
    #[must_use]
    pub fn with_initial_interval(mut self, initial_interval: Duration) -> Self {
        self.initial_interval = initial_interval;
        self
    }

    /// Returns a fresh backoff sequence for one polling session.
    #[must_use]
    pub fn backoff(&self) -> Backoff {
        let max = self.max_interval.max(Duration::from_millis(1));
        Backoff {
            next: self.initial_interval.clamp(Duration::from_millis(1), max),
            max,
        }
    }
}

/// Doubling delay sequence capped at a maximum.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
}

impl Backoff {
    /// Returns the next delay and advances the sequence.
    pub fn next_interval(&mut self) -> Duration {
        let current = self.next;
        self.next = (self.next * 2).min(self.max);
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_eight_seconds_at_one_second_cadence() {
        let policy = PollPolicy::default();
        assert_eq!(policy.timeout, Duration::from_secs(8));

        let mut backoff = policy.backoff();
        for _ in 0..5 {
            assert_eq!(backoff.next_interval(), Duration::from_secs(1));
        }
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let policy = PollPolicy::default().with_initial_interval(Duration::from_millis(200));
        let mut backoff = policy.backoff();

        let delays: Vec<_> = (0..5).map(|_| backoff.next_interval()).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
                Duration::from_secs(1),
                Duration::from_secs(1),
            ]
        );
    }

    #[test]
    fn degenerate_intervals_are_clamped() {
        let mut backoff = PollPolicy::fixed(Duration::from_secs(1), Duration::ZERO).backoff();
        assert_eq!(backoff.next_interval(), Duration::from_millis(1));

        let policy = PollPolicy::default().with_initial_interval(Duration::from_secs(5));
        assert_eq!(policy.backoff().next_interval(), Duration::from_secs(1));
    }
}
