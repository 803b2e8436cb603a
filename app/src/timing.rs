use std::time::{Duration, Instant};

/// source of wall-clock time and the only way the loop is allowed to suspend.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// checkpoints of the actions the loop performs.
///
/// each checkpoint is advanced by the driver, at most once per iteration and only after the
/// action it guards has run.
#[derive(Debug, Clone, Copy)]
pub struct TimingSample {
    pub last_poll: Instant,
    pub last_present: Instant,
    pub last_fps_report: Instant,
    /// instantaneous fps computed at the most recent present.
    pub fps: f64,
}

impl TimingSample {
    pub fn starting_at(now: Instant) -> Self {
        Self {
            last_poll: now,
            last_present: now,
            last_fps_report: now,
            fps: 0.0,
        }
    }
}

#[cfg(test)]
pub(crate) use manual::ManualClock;


#[test]
fn test_manual_clock() {
    let clock = ManualClock::new();
    assert_eq!(clock.now(), clock.origin());

    clock.advance(Duration::from_millis(5));
    clock.sleep(Duration::from_micros(10));
    assert_eq!(clock.now() - clock.origin(), Duration::from_micros(5_010));
    assert_eq!(clock.times_slept(), 1);
}
