//! decides what a loop iteration does; knows nothing about windows, surfaces or callbacks.
//!
//! the poll check and the frame check are independent: a single iteration may both drain events
//! and render. each check is evaluated against its own `now`, the driver samples the clock right
//! before asking.

use std::time::{Duration, Instant};

use crate::config::LoopConfig;
use crate::timing::TimingSample;

/// how long the idle branch suspends for. short enough for the loop to notice the poll timer
/// promptly, long enough to not spin a core.
pub const IDLE_SLEEP: Duration = Duration::from_micros(10);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameAction {
    Idle,
    RenderAndPresent { fps: f64 },
}

#[inline]
pub fn should_poll(config: &LoopConfig, timing: &TimingSample, now: Instant) -> bool {
    now.saturating_duration_since(timing.last_poll) >= config.poll_interval()
}

pub fn frame_action(config: &LoopConfig, timing: &TimingSample, now: Instant) -> FrameAction {
    let elapsed = now.saturating_duration_since(timing.last_present);
    if elapsed < config.frame_interval() {
        return FrameAction::Idle;
    }
    // NOTE: frame interval is at least 1µs, elapsed can't be zero here. sub-microsecond
    // precision is kept so that fps never exceeds the cap.
    let elapsed_micros = elapsed.as_nanos() as f64 / 1_000.0;
    FrameAction::RenderAndPresent {
        fps: 1_000_000.0 / elapsed_micros,
    }
}

/// purely observational, returns the fps to report if the report interval has elapsed.
pub fn fps_report(config: &LoopConfig, timing: &TimingSample, now: Instant) -> Option<f64> {
    let interval = config.fps_report_interval()?;
    (now.saturating_duration_since(timing.last_fps_report) >= interval).then_some(timing.fps)
}
