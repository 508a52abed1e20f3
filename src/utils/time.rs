#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Wall clock for the render loop.
///
/// [`Clock::get_delta`] returns the seconds since the previous call (or
/// since creation), so calling it once per frame yields the frame time.
#[derive(Debug, Clone)]
pub struct Clock {
    start_time: Instant,
    last_update: Instant,
    /// Total number of `get_delta` calls.
    pub frame_count: u64,
    /// Largest delta handed out. Unbounded by default, so animations keep
    /// wall-clock time across stalls.
    pub max_delta: f32,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_update: now,
            frame_count: 0,
            max_delta: f32::INFINITY,
        }
    }

    /// Seconds since the last call, clamped to `max_delta`.
    pub fn get_delta(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now - self.last_update;
        self.last_update = now;
        self.frame_count += 1;
        delta.as_secs_f32().min(self.max_delta)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
