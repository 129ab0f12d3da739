// src/simulation/mod.rs
//! Particle simulation
//!
//! The CPU side of the screensaver: particle state ([`particle`]), the
//! per-particle update rules ([`rules`]), the sequential / multi-threaded
//! step scheduler ([`scheduler`]), frame timing and the benchmark loop
//! ([`clock`]), and [`ParticleSystem`], which owns the particle array for the
//! lifetime of the process.

pub mod clock;
pub mod particle;
pub mod rules;
pub mod scheduler;
pub mod system;

use cgmath::Vector2;

pub use particle::{hsv_to_rgb, initialize, Particle};
pub use rules::UpdateRule;
pub use scheduler::{ExecutionMode, StepScheduler};
pub use system::ParticleSystem;

/// Current drawable area in pixels
///
/// Positions are valid inside `[0, width] x [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    /// Clamp a point into the viewport rectangle
    pub fn clamp(&self, point: Vector2<f32>) -> Vector2<f32> {
        Vector2::new(
            point.x.clamp(0.0, self.width),
            point.y.clamp(0.0, self.height),
        )
    }

    /// Whether a point lies inside the viewport, edges included
    pub fn contains(&self, point: Vector2<f32>) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_clamp() {
        let vp = Viewport::new(100, 50);
        assert_eq!(vp.clamp(Vector2::new(-3.0, 20.0)), Vector2::new(0.0, 20.0));
        assert_eq!(vp.clamp(Vector2::new(120.0, 80.0)), Vector2::new(100.0, 50.0));
        assert!(vp.contains(Vector2::new(100.0, 0.0)));
        assert!(!vp.contains(Vector2::new(100.5, 0.0)));
    }
}
