//! GPU-side per-particle and per-frame data

use bytemuck::{Pod, Zeroable};

use crate::simulation::{Particle, Viewport};

/// Instance data for a single particle disc
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// Center in pixels
    pub position: [f32; 2],
    /// RGBA, alpha always opaque
    pub color: [u8; 4],
}

impl ParticleInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Unorm8x4];

    /// Get vertex buffer layout for instance data
    pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl From<&Particle> for ParticleInstance {
    fn from(particle: &Particle) -> Self {
        let [r, g, b] = particle.color;
        Self {
            position: [particle.position.x, particle.position.y],
            color: [r, g, b, 255],
        }
    }
}

/// Per-frame uniform: viewport size and disc radius
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ViewportUniform {
    pub size: [f32; 2],
    pub radius: f32,
    _padding: f32,
}

impl ViewportUniform {
    pub fn new(viewport: Viewport, radius: f32) -> Self {
        Self {
            size: [viewport.width, viewport.height],
            radius,
            _padding: 0.0,
        }
    }
}
