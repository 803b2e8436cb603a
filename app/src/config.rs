use std::ffi::{CStr, CString};
use std::time::Duration;

pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (480, 800);
/// draining the x11 event queue 30 times a second is responsive enough and does not congest it.
pub const DEFAULT_POLL_RATE_CAP: u32 = 30;
/// caps the frame rate when swap_buffers does not sync to vblank.
pub const DEFAULT_FRAME_RATE_CAP: u32 = 80;
pub const DEFAULT_FPS_REPORT_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_TITLE: &CStr = c"App";

const MICROS_PER_SEC: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// fixed at startup; the loop never mutates it.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    window_size: (u32, u32),
    title: CString,
    poll_rate_cap: u32,
    frame_rate_cap: u32,
    fps_report_interval: Option<Duration>,
    log_level: log::LevelFilter,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            title: DEFAULT_TITLE.to_owned(),
            poll_rate_cap: DEFAULT_POLL_RATE_CAP,
            frame_rate_cap: DEFAULT_FRAME_RATE_CAP,
            fps_report_interval: cfg!(feature = "debug").then_some(DEFAULT_FPS_REPORT_INTERVAL),
            log_level: if cfg!(feature = "debug") {
                log::LevelFilter::Trace
            } else {
                log::LevelFilter::Info
            },
        }
    }
}

/// rounded up to the next nanosecond, an interval must never be shorter than 1/hz.
#[inline]
fn interval_from_rate_cap(hz: u32) -> Duration {
    Duration::from_nanos(NANOS_PER_SEC.div_ceil(hz as u64))
}

impl LoopConfig {
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "window size must not be empty");
        self.window_size = (width, height);
        self
    }

    pub fn with_title(mut self, title: &CStr) -> Self {
        self.title = title.to_owned();
        self
    }

    /// hz must be within 1..=1_000_000 so that the poll interval is at least a microsecond.
    pub fn with_poll_rate_cap(mut self, hz: u32) -> Self {
        assert!(hz > 0 && hz as u64 <= MICROS_PER_SEC, "invalid poll rate cap: {hz}");
        self.poll_rate_cap = hz;
        self
    }

    /// hz must be within 1..=1_000_000 so that the frame interval is at least a microsecond.
    pub fn with_frame_rate_cap(mut self, hz: u32) -> Self {
        assert!(hz > 0 && hz as u64 <= MICROS_PER_SEC, "invalid frame rate cap: {hz}");
        self.frame_rate_cap = hz;
        self
    }

    /// none disables fps reporting.
    pub fn with_fps_report(mut self, interval: Option<Duration>) -> Self {
        self.fps_report_interval = interval;
        self
    }

    pub fn with_log_level(mut self, log_level: log::LevelFilter) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub fn title(&self) -> &CStr {
        &self.title
    }

    pub fn poll_rate_cap(&self) -> u32 {
        self.poll_rate_cap
    }

    pub fn frame_rate_cap(&self) -> u32 {
        self.frame_rate_cap
    }

    /// minimum time between two event queue drains.
    pub fn poll_interval(&self) -> Duration {
        interval_from_rate_cap(self.poll_rate_cap)
    }

    /// minimum time between two presented frames.
    pub fn frame_interval(&self) -> Duration {
        interval_from_rate_cap(self.frame_rate_cap)
    }

    pub fn fps_report_interval(&self) -> Option<Duration> {
        self.fps_report_interval
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level
    }
}

#[test]
fn test_default_config() {
    let config = LoopConfig::default();
    assert_eq!(config.window_size(), (480, 800));
    assert_eq!(config.title(), c"App");
    assert_eq!(config.poll_rate_cap(), 30);
    assert_eq!(config.frame_rate_cap(), 80);
    assert_eq!(config.poll_interval(), Duration::from_nanos(33_333_334));
    assert_eq!(config.frame_interval(), Duration::from_micros(12_500));
}

#[test]
fn test_config_builder() {
    let config = LoopConfig::default()
        .with_window_size(640, 480)
        .with_title(c"hello")
        .with_poll_rate_cap(60)
        .with_frame_rate_cap(144)
        .with_fps_report(Some(Duration::from_millis(500)));
    assert_eq!(config.window_size(), (640, 480));
    assert_eq!(config.title(), c"hello");
    assert_eq!(config.poll_interval(), Duration::from_nanos(16_666_667));
    assert_eq!(config.frame_interval(), Duration::from_nanos(6_944_445));
    assert_eq!(config.fps_report_interval(), Some(Duration::from_millis(500)));
}

#[test]
fn test_interval_is_never_shorter_than_one_over_hz() {
    for hz in [1, 3, 7, 30, 60, 80, 144, 999_999, 1_000_000] {
        let config = LoopConfig::default()
            .with_poll_rate_cap(hz)
            .with_frame_rate_cap(hz);
        assert!(config.poll_interval().as_nanos() * hz as u128 >= 1_000_000_000, "hz = {hz}");
        assert!(config.frame_interval().as_nanos() * hz as u128 >= 1_000_000_000, "hz = {hz}");
    }
}

#[test]
#[should_panic(expected = "invalid frame rate cap")]
fn test_zero_frame_rate_cap() {
    _ = LoopConfig::default().with_frame_rate_cap(0);
}
