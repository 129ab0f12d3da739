//! Particle state and its deterministic initializer
//!
//! Every particle carries both the orbital (Lissajous) parameters and a base
//! velocity, so either [`UpdateRule`](super::rules::UpdateRule) can drive the
//! same population.

use std::f32::consts::TAU;

use cgmath::Vector2;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::Viewport;

/// Saturation used for phase-driven particle colors
pub const COLOR_SATURATION: f32 = 0.85;
/// Value (brightness) used for phase-driven particle colors
pub const COLOR_VALUE: f32 = 1.0;

/// Maximum magnitude of the initial drift velocity per axis, in px/s
const MAX_BASE_SPEED: f32 = 60.0;

/// One independently animated particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Current position in pixel space
    pub position: Vector2<f32>,
    /// Orbit center
    pub center: Vector2<f32>,
    /// Orbit amplitude per axis
    pub amplitude: Vector2<f32>,
    /// Angular frequency per axis, in rad/s
    pub frequency: Vector2<f32>,
    /// Phase offset per axis, in radians
    pub phase: Vector2<f32>,
    /// Base velocity used by the drift rule, in px/s
    pub velocity: Vector2<f32>,
    /// Local time accumulator
    pub t: f32,
    /// Current color
    pub color: [u8; 3],
}

impl Particle {
    /// Position on the orbit at the particle's current local time
    pub fn orbit_position(&self) -> Vector2<f32> {
        Vector2::new(
            self.center.x + self.amplitude.x * (self.frequency.x * self.t + self.phase.x).sin(),
            self.center.y + self.amplitude.y * (self.frequency.y * self.t + self.phase.y).sin(),
        )
    }

    /// Hue in `[0, 1)` derived from the x-axis phase angle
    pub fn phase_hue(&self) -> f32 {
        (self.frequency.x * self.t + self.phase.x).rem_euclid(TAU) / TAU
    }

    /// Recompute the color from the particle's phase
    pub fn refresh_color(&mut self) {
        self.color = hsv_to_rgb(self.phase_hue(), COLOR_SATURATION, COLOR_VALUE);
    }
}

/// Create `count` particles spread over the viewport
///
/// The sequence depends only on the arguments: identical calls yield
/// bit-identical particles.
pub fn initialize(count: usize, viewport: Viewport, seed: u64) -> Vec<Particle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let (w, h) = (viewport.width, viewport.height);

    (0..count)
        .map(|_| {
            let center = Vector2::new(
                rng.random_range(0.2 * w..=0.8 * w),
                rng.random_range(0.2 * h..=0.8 * h),
            );
            let amplitude = Vector2::new(
                rng.random_range(0.15 * w..=0.4 * w),
                rng.random_range(0.15 * h..=0.4 * h),
            );
            let frequency = Vector2::new(rng.random_range(0.6..2.0), rng.random_range(0.6..2.0));
            let phase = Vector2::new(rng.random_range(0.0..TAU), rng.random_range(0.0..TAU));
            let t = rng.random_range(0.0..100.0);
            let velocity = Vector2::new(
                rng.random_range(-MAX_BASE_SPEED..MAX_BASE_SPEED),
                rng.random_range(-MAX_BASE_SPEED..MAX_BASE_SPEED),
            );

            let mut particle = Particle {
                position: Vector2::new(0.0, 0.0),
                center,
                amplitude,
                frequency,
                phase,
                velocity,
                t,
                color: [0, 0, 0],
            };
            particle.position = viewport.clamp(particle.orbit_position());
            particle.refresh_color();
            particle
        })
        .collect()
}

/// Convert an HSV color to 8-bit RGB
///
/// `h` may be any real number and is wrapped into `[0, 1)`; `s` and `v` are
/// clamped into `[0, 1]`. A hue that lies exactly on a sector boundary belongs
/// to the sector starting there.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);

    let h = h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    // rem_euclid can round up to exactly 1.0 for tiny negative hues
    let (r, g, b) = match (sector as i32).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    [to_channel(r), to_channel(g), to_channel(b)]
}

fn to_channel(c: f32) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}
