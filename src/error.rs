//! Error types
//!
//! [`ConfigError`] covers command-line parsing and validation; [`SaverError`]
//! covers everything that can fail while setting up workers, the window or the
//! GPU. The per-frame update path has no error surface.

use thiserror::Error;

/// Invalid or unparsable configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing value for {0}")]
    MissingValue(String),

    #[error("invalid value {value:?} for {flag}")]
    InvalidValue { flag: String, value: String },

    #[error("unknown argument {0:?} (try --help)")]
    UnknownArgument(String),

    #[error("particle count must be positive, got {0}")]
    InvalidParticleCount(i64),

    #[error("viewport must be at least 1x1, got {width}x{height}")]
    InvalidViewport { width: i64, height: i64 },

    #[error("benchmark duration {0} seconds is out of range")]
    InvalidBenchmarkDuration(f64),

    #[error("thread count must not be negative, got {0}")]
    InvalidThreadCount(i64),

    #[error("unknown execution mode {0:?} (expected seq or parallel)")]
    UnknownMode(String),

    #[error("unknown update rule {0:?} (expected orbital or drift)")]
    UnknownRule(String),
}

/// Failures while bringing up the simulation or its window
#[derive(Debug, Error)]
pub enum SaverError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create GPU surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter found: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported {0}")]
    UnsupportedSurface(&'static str),

    #[error("failed to acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),
}

pub type Result<T, E = SaverError> = std::result::Result<T, E>;
