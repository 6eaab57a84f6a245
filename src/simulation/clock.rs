//! Time sources for race timing, plus the display format for times

use std::time::Instant;

/// Monotonic time source, in seconds since the clock was created
pub trait Clock {
    fn now(&self) -> f64;

    /// Move time forward by one frame. Wall-time clocks ignore this.
    fn advance(&mut self, delta_secs: f64);
}

/// Deterministic clock driven entirely by frame ticks
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now
    }

    fn advance(&mut self, delta_secs: f64) {
        if delta_secs > 0.0 {
            self.now += delta_secs;
        }
    }
}

/// Wall-time clock for real-time hosts
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn advance(&mut self, _delta_secs: f64) {}
}

/// Format seconds as `mm:ss.mmm`, rounded to the nearest millisecond
///
/// Negative and non-finite inputs format as zero. Minutes are not capped.
pub fn format_time(seconds: f32) -> String {
    let seconds = f64::from(seconds);
    let total_millis = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };
    let minutes = total_millis / 60_000;
    let secs = (total_millis / 1000) % 60;
    let millis = total_millis % 1000;
    format!("{:02}:{:02}.{:03}", minutes, secs, millis)
}
