use std::time::{Duration, Instant};

/// A single restartable countdown.
///
/// The clock never runs by itself: its owner passes the current time in and asks
/// whether the deadline has passed. At most one deadline is pending at any time, and
/// restarting replaces it.
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use tetrecs_engine::GameClock;
///
/// let start = Instant::now();
/// let mut clock = GameClock::stopped();
/// clock.restart(start, Duration::from_secs(12));
///
/// assert!(!clock.is_expired(start + Duration::from_secs(11)));
/// assert!(clock.is_expired(start + Duration::from_secs(12)));
///
/// // Activity pushes the deadline back.
/// clock.restart(start + Duration::from_secs(11), Duration::from_secs(12));
/// assert!(!clock.is_expired(start + Duration::from_secs(12)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameClock {
    delay: Duration,
    deadline: Option<Instant>,
}

impl GameClock {
    #[must_use]
    pub const fn stopped() -> Self {
        Self {
            delay: Duration::ZERO,
            deadline: None,
        }
    }

    /// Cancels any pending deadline and schedules one `delay` after `now`.
    pub fn restart(&mut self, now: Instant, delay: Duration) {
        self.delay = delay;
        self.deadline = Some(now + delay);
    }

    /// Cancels the pending deadline. The last delay is kept for display.
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    /// The delay the current countdown was scheduled with.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Time left until the deadline, zero once expired, `None` when stopped.
    #[must_use]
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::stopped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(12_000);

    #[test]
    fn test_stopped_clock_never_expires() {
        let clock = GameClock::stopped();
        let now = Instant::now();
        assert!(!clock.is_running());
        assert!(!clock.is_expired(now + Duration::from_secs(3600)));
        assert_eq!(clock.time_remaining(now), None);
        assert_eq!(clock.deadline(), None);
    }

    #[test]
    fn test_restart_replaces_pending_deadline() {
        let start = Instant::now();
        let mut clock = GameClock::stopped();
        clock.restart(start, DELAY);
        assert_eq!(clock.deadline(), Some(start + DELAY));

        let later = start + Duration::from_millis(5_000);
        clock.restart(later, Duration::from_millis(3_000));
        assert_eq!(clock.deadline(), Some(later + Duration::from_millis(3_000)));
        assert_eq!(clock.delay(), Duration::from_millis(3_000));
        assert!(!clock.is_expired(start + DELAY - Duration::from_millis(4_001)));
        assert!(clock.is_expired(start + Duration::from_millis(8_000)));
    }

    #[test]
    fn test_time_remaining_saturates() {
        let start = Instant::now();
        let mut clock = GameClock::stopped();
        clock.restart(start, DELAY);
        assert_eq!(
            clock.time_remaining(start + Duration::from_millis(2_000)),
            Some(Duration::from_millis(10_000))
        );
        assert_eq!(
            clock.time_remaining(start + Duration::from_millis(20_000)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_stop_cancels_deadline() {
        let start = Instant::now();
        let mut clock = GameClock::stopped();
        clock.restart(start, DELAY);
        clock.stop();
        assert!(!clock.is_running());
        assert!(!clock.is_expired(start + DELAY * 2));
        assert_eq!(clock.delay(), DELAY);
    }
}
