// src/wgpu_utils/mod.rs
//! WGPU utility functions and helpers
//!
//! Typed buffer wrappers used by the particle renderer.

pub mod uniform_buffer;

pub use uniform_buffer::{InstanceBuffer, UniformBuffer};

/// Binding type for a plain uniform buffer
pub fn uniform() -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: None,
    }
}
