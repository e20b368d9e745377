use std::thread;
use std::time::{Duration, Instant};

/// Spaces consecutive emissions at least one frame period apart.
#[derive(Debug)]
pub struct Pacer {
    period: Duration,
    last_emission: Instant,
}

impl Pacer {
    /// `target_fps` must be >= 1.
    pub fn new(target_fps: u32) -> Self {
        assert!(target_fps > 0, "target_fps must be > 0");
        Self {
            period: Duration::from_secs(1) / target_fps,
            last_emission: Instant::now(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// How long an emission at `now` would have to wait.
    pub fn delay_at(&self, now: Instant) -> Duration {
        self.period
            .saturating_sub(now.saturating_duration_since(self.last_emission))
    }

    /// Sleep out the rest of the current period, then record the emission.
    /// Returns the time slept.
    pub fn wait(&mut self) -> Duration {
        let delay = self.delay_at(Instant::now());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        self.last_emission = Instant::now();
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_from_fps() {
        assert_eq!(Pacer::new(30).period(), Duration::from_nanos(33_333_333));
        assert_eq!(Pacer::new(1).period(), Duration::from_secs(1));
    }

    #[test]
    fn delay_shrinks_with_elapsed_time() {
        let pacer = Pacer::new(10);
        let start = pacer.last_emission;
        assert_eq!(pacer.delay_at(start), Duration::from_millis(100));
        assert_eq!(
            pacer.delay_at(start + Duration::from_millis(30)),
            Duration::from_millis(70)
        );
        assert_eq!(pacer.delay_at(start + Duration::from_millis(250)), Duration::ZERO);
    }

    #[test]
    fn consecutive_waits_are_a_period_apart() {
        let mut pacer = Pacer::new(30);
        pacer.wait();
        let first = Instant::now();
        pacer.wait();
        let gap = first.elapsed();
        // Allow a little slack for the instant taken after the first wait.
        assert!(gap >= pacer.period() - Duration::from_millis(1), "gap {gap:?}");
    }

    #[test]
    #[should_panic(expected = "target_fps must be > 0")]
    fn zero_fps_panics() {
        Pacer::new(0);
    }
}
