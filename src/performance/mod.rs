//! # Frame Rate Reporting
//!
//! Accumulates live-loop frame deltas and produces an FPS figure at a fixed
//! reporting interval, which the app shows in the window title and the log.
//!
//! ## Usage
//!
//! ```rust
//! use saver::performance::FpsCounter;
//!
//! let mut fps = FpsCounter::new();
//! for _ in 0..60 {
//!     if let Some(value) = fps.record_frame(1.0 / 60.0) {
//!         println!("FPS={value:.0}");
//!     }
//! }
//! ```

use crate::simulation::ExecutionMode;

/// Default reporting interval in seconds
pub const FPS_REPORT_INTERVAL: f64 = 0.5;

/// Windowed frames-per-second counter
#[derive(Debug, Clone)]
pub struct FpsCounter {
    /// Time accumulated in the current window
    accumulated: f64,
    /// Frames counted in the current window
    frames: u32,
    /// Length of a reporting window
    interval: f64,
    /// FPS of the last completed window
    last_fps: Option<f64>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::with_interval(FPS_REPORT_INTERVAL)
    }

    pub fn with_interval(interval: f64) -> Self {
        Self {
            accumulated: 0.0,
            frames: 0,
            interval,
            last_fps: None,
        }
    }

    /// Count one frame that took `delta_time` seconds
    ///
    /// Returns the FPS of the window this frame completed, if any.
    pub fn record_frame(&mut self, delta_time: f32) -> Option<f64> {
        self.accumulated += f64::from(delta_time);
        self.frames += 1;

        if self.accumulated < self.interval || self.accumulated <= 0.0 {
            return None;
        }

        let fps = f64::from(self.frames) / self.accumulated;
        self.last_fps = Some(fps);
        self.accumulated = 0.0;
        self.frames = 0;
        Some(fps)
    }

    /// FPS of the last completed window
    pub fn fps(&self) -> Option<f64> {
        self.last_fps
    }

    pub fn reset(&mut self) {
        self.accumulated = 0.0;
        self.frames = 0;
        self.last_fps = None;
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Window title showing the run configuration and current frame rate
pub fn hud_title(mode: ExecutionMode, particles: usize, threads: usize, fps: f64) -> String {
    format!(
        "saver | mode={} | N={} | threads={} | FPS={}",
        mode,
        particles,
        threads,
        fps.round() as i64
    )
}
