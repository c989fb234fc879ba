use std::time::Duration;

/// Default delay before the first reconnect attempt.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(10_000);
/// Default ceiling for the reconnect delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(30_000);

/// Doubling reconnect delay, capped, reset only on confirmed reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_DELAY, DEFAULT_MAX_DELAY)
    }
}

impl ReconnectBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(initial);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay to wait before the next attempt. Advances the sequence.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    /// Delay the next failure would wait, without advancing.
    pub fn peek(&self) -> Duration {
        self.current
    }

    /// Record a confirmed successful reconnection.
    pub fn confirm(&mut self) {
        self.current = self.initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(d: Duration) -> u128 {
        d.as_millis()
    }

    #[test]
    fn doubles_up_to_cap() {
        let mut backoff = ReconnectBackoff::default();
        let delays: Vec<u128> = (0..5).map(|_| ms(backoff.next_delay())).collect();
        assert_eq!(delays, vec![10_000, 20_000, 30_000, 30_000, 30_000]);
    }

    #[test]
    fn resets_only_after_confirmation() {
        let mut backoff = ReconnectBackoff::default();
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(ms(backoff.peek()), 30_000);

        backoff.confirm();
        assert_eq!(ms(backoff.next_delay()), 10_000);
        assert_eq!(ms(backoff.next_delay()), 20_000);
    }

    #[test]
    fn max_below_initial_is_raised() {
        let mut backoff =
            ReconnectBackoff::new(Duration::from_millis(50), Duration::from_millis(10));
        assert_eq!(ms(backoff.next_delay()), 50);
        assert_eq!(ms(backoff.next_delay()), 50);
    }
}
