//! Per-particle update rules
//!
//! A rule is a pure transition `(particle, dt, viewport) -> particle`. The
//! variant is chosen once at startup and matched once per step, so the
//! per-particle loop runs a concrete [`orbital_step`] or [`drift_step`] and
//! never branches on it.

use std::fmt;
use std::str::FromStr;

use cgmath::Vector2;

use super::{Particle, Viewport};
use crate::error::ConfigError;

/// Upper bound of the orbit-center drift, in px/s
pub const CENTER_DRIFT: f32 = 0.15;
/// Amplitude of the drift rule's sinusoidal velocity perturbation, in px/s
pub const DRIFT_WOBBLE: f32 = 40.0;

/// Update rule variants
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateRule {
    /// Lissajous orbit around a slowly drifting center, color cycles with phase.
    /// The center is clamped hard into the viewport.
    #[default]
    Orbital,
    /// Velocity integration with a phase-dependent wobble, reflecting off the
    /// viewport edges. Color stays as initialized.
    Drift,
}

impl UpdateRule {
    /// Apply the rule to a single particle
    pub fn apply(self, particle: &mut Particle, dt: f32, viewport: Viewport) {
        match self {
            UpdateRule::Orbital => orbital_step(particle, dt, viewport),
            UpdateRule::Drift => drift_step(particle, dt, viewport),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UpdateRule::Orbital => "orbital",
            UpdateRule::Drift => "drift",
        }
    }
}

impl fmt::Display for UpdateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UpdateRule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orbital" | "orbit" | "lissajous" => Ok(UpdateRule::Orbital),
            "drift" => Ok(UpdateRule::Drift),
            other => Err(ConfigError::UnknownRule(other.to_string())),
        }
    }
}

/// Lissajous orbit step with a clamped, slowly drifting center
pub fn orbital_step(particle: &mut Particle, dt: f32, viewport: Viewport) {
    particle.t += dt;

    let t = particle.t;
    particle.center.x += CENTER_DRIFT * (0.25 * t).sin() * dt;
    particle.center.y += CENTER_DRIFT * (0.22 * t).cos() * dt;
    particle.center = viewport.clamp(particle.center);

    particle.position = viewport.clamp(particle.orbit_position());
    particle.refresh_color();
}

/// Velocity integration step reflecting off the viewport edges
pub fn drift_step(particle: &mut Particle, dt: f32, viewport: Viewport) {
    particle.t += dt;

    let t = particle.t;
    let wobble = Vector2::new(
        DRIFT_WOBBLE * (particle.frequency.x * t + particle.phase.x).sin(),
        DRIFT_WOBBLE * (particle.frequency.y * t + particle.phase.y).sin(),
    );
    particle.position += (particle.velocity + wobble) * dt;

    reflect(&mut particle.position.x, &mut particle.velocity.x, viewport.width);
    reflect(&mut particle.position.y, &mut particle.velocity.y, viewport.height);
}

/// Clamp one coordinate into `[0, max]` and point the velocity back inside
/// if it crossed an edge
fn reflect(position: &mut f32, velocity: &mut f32, max: f32) {
    if *position < 0.0 {
        *position = 0.0;
        *velocity = velocity.abs();
    } else if *position > max {
        *position = max;
        *velocity = -velocity.abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::initialize;

    fn still_particle(x: f32, y: f32, vx: f32, vy: f32) -> Particle {
        Particle {
            position: Vector2::new(x, y),
            center: Vector2::new(x, y),
            amplitude: Vector2::new(0.0, 0.0),
            frequency: Vector2::new(0.0, 0.0),
            phase: Vector2::new(0.0, 0.0),
            velocity: Vector2::new(vx, vy),
            t: 0.0,
            color: [10, 20, 30],
        }
    }

    #[test]
    fn test_drift_reflects_left_edge() {
        let vp = Viewport::new(200, 100);
        let mut p = still_particle(1.0, 50.0, -100.0, 0.0);

        UpdateRule::Drift.apply(&mut p, 0.1, vp);

        assert_eq!(p.position.x, 0.0);
        assert_eq!(p.velocity.x, 100.0);
        assert_eq!(p.position.y, 50.0);
    }

    #[test]
    fn test_drift_reflects_far_edges() {
        let vp = Viewport::new(200, 100);
        let mut p = still_particle(199.0, 99.0, 50.0, 30.0);

        UpdateRule::Drift.apply(&mut p, 0.1, vp);

        assert_eq!(p.position, Vector2::new(200.0, 100.0));
        assert_eq!(p.velocity, Vector2::new(-50.0, -30.0));
    }

    #[test]
    fn test_drift_keeps_inward_velocity_after_shrink() {
        let small = Viewport::new(100, 80);
        let mut p = still_particle(150.0, 120.0, -20.0, -10.0);

        UpdateRule::Drift.apply(&mut p, 0.1, small);
        assert_eq!(p.position, Vector2::new(100.0, 80.0));
        assert_eq!(p.velocity, Vector2::new(-20.0, -10.0));

        // Still heading inward on the next frame, so it leaves the edge
        UpdateRule::Drift.apply(&mut p, 0.1, small);
        assert_eq!(p.velocity, Vector2::new(-20.0, -10.0));
        assert!(p.position.x < 100.0 && p.position.y < 80.0);
    }

    #[test]
    fn test_drift_keeps_color() {
        let vp = Viewport::new(200, 100);
        let mut p = still_particle(100.0, 50.0, 5.0, 5.0);
        UpdateRule::Drift.apply(&mut p, 0.5, vp);
        assert_eq!(p.color, [10, 20, 30]);
        assert_eq!(p.position, Vector2::new(102.5, 52.5));
    }

    #[test]
    fn test_orbital_clamps_center_without_bounce() {
        let vp = Viewport::new(200, 100);
        let mut p = still_particle(0.0, 50.0, -100.0, 0.0);
        p.center = Vector2::new(-20.0, 150.0);

        UpdateRule::Orbital.apply(&mut p, 0.01, vp);

        assert_eq!(p.center, Vector2::new(0.0, 100.0));
        // Velocity belongs to the drift rule and is never touched here
        assert_eq!(p.velocity.x, -100.0);
    }

    #[test]
    fn test_orbital_follows_lissajous_curve() {
        let vp = Viewport::new(1000, 1000);
        let mut p = still_particle(500.0, 500.0, 0.0, 0.0);
        p.amplitude = Vector2::new(100.0, 50.0);
        p.frequency = Vector2::new(1.0, 2.0);
        p.t = 0.0;

        UpdateRule::Orbital.apply(&mut p, 0.5, vp);

        assert_eq!(p.t, 0.5);
        let expected = p.orbit_position();
        assert_eq!(p.position, expected);
        assert!((p.position.x - (p.center.x + 100.0 * 0.5f32.sin())).abs() < 1e-3);
    }

    #[test]
    fn test_orbital_center_drift_is_bounded() {
        let vp = Viewport::new(960, 600);
        for mut p in initialize(64, vp, 11) {
            let before = p.center;
            UpdateRule::Orbital.apply(&mut p, 1.0, vp);
            assert!((p.center.x - before.x).abs() <= CENTER_DRIFT + 1e-4);
            assert!((p.center.y - before.y).abs() <= CENTER_DRIFT + 1e-4);
        }
    }

    #[test]
    fn test_orbital_recolors_from_phase() {
        let vp = Viewport::new(960, 600);
        let mut p = initialize(1, vp, 5)[0];
        UpdateRule::Orbital.apply(&mut p, 0.3, vp);
        let mut expected = p;
        expected.refresh_color();
        assert_eq!(p.color, expected.color);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let vp = Viewport::new(960, 600);
        for rule in [UpdateRule::Orbital, UpdateRule::Drift] {
            for mut p in initialize(128, vp, 9) {
                let before = p;
                rule.apply(&mut p, 0.0, vp);
                assert_eq!(p.position, before.position, "{rule}");
                assert_eq!(p.color, before.color, "{rule}");
                assert_eq!(p.t, before.t, "{rule}");
            }
        }
    }

    #[test]
    fn test_shrunk_viewport_clamps_positions() {
        let large = Viewport::new(960, 600);
        let small = Viewport::new(320, 200);
        for rule in [UpdateRule::Orbital, UpdateRule::Drift] {
            for mut p in initialize(128, large, 4) {
                rule.apply(&mut p, 1.0 / 60.0, small);
                assert!(small.contains(p.position), "{rule}: {:?}", p.position);
            }
        }
    }

    #[test]
    fn test_rule_parsing() {
        assert_eq!("orbital".parse::<UpdateRule>().unwrap(), UpdateRule::Orbital);
        assert_eq!("drift".parse::<UpdateRule>().unwrap(), UpdateRule::Drift);
        assert!(matches!(
            "spiral".parse::<UpdateRule>(),
            Err(ConfigError::UnknownRule(_))
        ));
        assert_eq!(UpdateRule::Drift.to_string(), "drift");
    }
}
