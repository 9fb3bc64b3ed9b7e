//! Frame timing utilities

use std::time::{Duration, Instant};

/// Per-frame timer tracking delta time and frame statistics
pub struct Timer {
    last_tick: Instant,
    delta: f32,
    total: f32,
    frames: u64,
    smoothed_fps: f32,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Smoothing factor for the exponential FPS average
    const FPS_SMOOTHING: f32 = 0.9;

    /// Create a new timer starting now
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            delta: 0.0,
            total: 0.0,
            frames: 0,
            smoothed_fps: 0.0,
        }
    }

    /// Advance the timer by one frame; call once per frame
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now.duration_since(self.last_tick).as_secs_f32();
        self.total += self.delta;
        self.last_tick = now;
        self.frames += 1;

        if self.delta > 0.0 {
            let instant_fps = 1.0 / self.delta;
            self.smoothed_fps = if self.frames == 1 {
                instant_fps
            } else {
                self.smoothed_fps * Self::FPS_SMOOTHING + instant_fps * (1.0 - Self::FPS_SMOOTHING)
            };
        }
    }

    /// Seconds elapsed between the two most recent ticks
    pub fn delta_seconds(&self) -> f32 {
        self.delta
    }

    /// Total seconds accumulated across all ticks
    pub fn total_seconds(&self) -> f32 {
        self.total
    }

    /// Number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Exponentially smoothed frames-per-second estimate
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

/// Simple stopwatch for ad-hoc measurement
pub struct Stopwatch {
    started: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a stopped stopwatch
    pub fn new() -> Self {
        Self {
            started: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut watch = Self::new();
        watch.start();
        watch
    }

    /// Start measuring
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Stop measuring and accumulate the elapsed time
    pub fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed += started.elapsed();
        }
    }

    /// Accumulated elapsed time, including a running measurement
    pub fn elapsed(&self) -> Duration {
        match self.started {
            Some(started) => self.elapsed + started.elapsed(),
            None => self.elapsed,
        }
    }

    /// Accumulated elapsed time in seconds
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Whether the stopwatch is currently measuring
    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_counts_frames() {
        let mut timer = Timer::new();
        assert_eq!(timer.frame_count(), 0);
        timer.tick();
        timer.tick();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.total_seconds() >= 0.0);
    }

    #[test]
    fn test_stopwatch_accumulates() {
        let mut watch = Stopwatch::start_new();
        assert!(watch.is_running());
        watch.stop();
        assert!(!watch.is_running());
        let frozen = watch.elapsed();
        assert_eq!(watch.elapsed(), frozen);
    }
}
