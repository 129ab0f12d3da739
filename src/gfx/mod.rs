//! # Graphics Module
//!
//! Draws the particle population to a window surface.
//!
//! The simulation only depends on the [`ParticleRenderer`] trait: it hands
//! over the current particles and viewport once per live frame. The wgpu
//! implementation lives in [`render_engine`] and draws every particle as a
//! filled disc using one instanced draw call.

pub mod instance;
pub mod render_engine;

pub use instance::{ParticleInstance, ViewportUniform};
pub use render_engine::RenderEngine;

use crate::error::Result;
use crate::simulation::{Particle, Viewport};

/// Disc radius in pixels
pub const PARTICLE_RADIUS: f32 = 3.0;
/// Background color (10, 10, 18)
pub const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 10.0 / 255.0,
    g: 10.0 / 255.0,
    b: 18.0 / 255.0,
    a: 1.0,
};

/// Something that can draw the particle population
pub trait ParticleRenderer {
    /// Draw one frame
    fn render(&mut self, particles: &[Particle], viewport: Viewport) -> Result<()>;

    /// The drawable area changed size
    fn resize(&mut self, width: u32, height: u32);
}
