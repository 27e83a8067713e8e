use std::time::Duration;

/// Periodic trigger for the next slideshow step, driven by frame time.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleTimer {
    interval: Duration,
    elapsed: Duration,
}

impl CycleTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true when the interval has elapsed. The timer then starts
    /// over; a long stall fires once, not once per missed interval.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed = Duration::ZERO;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let mut timer = CycleTimer::new(Duration::from_millis(100));
        assert!(!timer.tick(Duration::from_millis(60)));
        assert!(timer.tick(Duration::from_millis(60)));
        assert!(!timer.tick(Duration::from_millis(60)));
        assert!(timer.tick(Duration::from_millis(40)));
    }

    #[test]
    fn long_stall_fires_once() {
        let mut timer = CycleTimer::new(Duration::from_millis(100));
        assert!(timer.tick(Duration::from_secs(10)));
        assert!(!timer.tick(Duration::from_millis(1)));
    }
}
