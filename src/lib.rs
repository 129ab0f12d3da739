// src/lib.rs
//! Saver
//!
//! A particle screensaver: a fixed population of independently animated
//! particles advanced every frame on one thread or across a worker pool, drawn
//! with wgpu into a winit window, plus a headless throughput benchmark.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod performance;
pub mod simulation;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ScreensaverApp;
pub use config::{ParseOutcome, SimulationConfig};
pub use error::{ConfigError, SaverError};
pub use simulation::{ExecutionMode, ParticleSystem, UpdateRule, Viewport};
