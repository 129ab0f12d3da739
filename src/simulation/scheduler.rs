//! Step scheduler
//!
//! Applies an [`UpdateRule`] to every particle for one frame, either on the
//! calling thread or fanned out over a dedicated rayon pool. Particles never
//! read each other, so the parallel path needs no synchronisation and yields
//! exactly the same values as the sequential one.

use std::fmt;
use std::str::FromStr;

use log::debug;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::rules::{drift_step, orbital_step};
use super::{Particle, UpdateRule, Viewport};
use crate::error::{ConfigError, Result};

/// How a step is executed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Index order on the calling thread
    Sequential,
    /// Static contiguous partition across a worker pool
    #[default]
    Parallel,
}

impl ExecutionMode {
    pub fn name(self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "seq",
            ExecutionMode::Parallel => "parallel",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExecutionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "seq" | "sequential" => Ok(ExecutionMode::Sequential),
            "parallel" | "par" | "omp" => Ok(ExecutionMode::Parallel),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

/// Runs one simulation step over the whole particle array
pub struct StepScheduler {
    mode: ExecutionMode,
    threads: usize,
    pool: Option<ThreadPool>,
}

impl StepScheduler {
    /// Create a scheduler
    ///
    /// `thread_hint` of 0 means one worker per hardware thread. Asking for
    /// more workers than the machine has is allowed.
    pub fn new(mode: ExecutionMode, thread_hint: usize) -> Result<Self> {
        match mode {
            ExecutionMode::Sequential => Ok(Self::sequential()),
            ExecutionMode::Parallel => {
                let threads = resolve_threads(thread_hint);
                let pool = ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("saver-worker-{i}"))
                    .build()?;
                debug!("Built worker pool with {} threads", threads);
                Ok(Self {
                    mode,
                    threads,
                    pool: Some(pool),
                })
            }
        }
    }

    /// Single-threaded scheduler, never fails
    pub fn sequential() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            threads: 1,
            pool: None,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Number of threads doing update work
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Advance every particle by `dt` inside `viewport`
    ///
    /// Returns only once every particle has been updated.
    pub fn step(&self, particles: &mut [Particle], dt: f32, viewport: Viewport, rule: UpdateRule) {
        match rule {
            UpdateRule::Orbital => self.run(particles, dt, viewport, orbital_step),
            UpdateRule::Drift => self.run(particles, dt, viewport, drift_step),
        }
    }

    fn run<F>(&self, particles: &mut [Particle], dt: f32, viewport: Viewport, kernel: F)
    where
        F: Fn(&mut Particle, f32, Viewport) + Sync,
    {
        match &self.pool {
            None => {
                for particle in particles.iter_mut() {
                    kernel(particle, dt, viewport);
                }
            }
            Some(pool) => {
                let chunk = chunk_len(particles.len(), self.threads);
                let kernel = &kernel;
                pool.install(|| {
                    particles.par_chunks_mut(chunk).for_each(|part| {
                        for particle in part {
                            kernel(particle, dt, viewport);
                        }
                    });
                });
            }
        }
    }
}

impl fmt::Debug for StepScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepScheduler")
            .field("mode", &self.mode)
            .field("threads", &self.threads)
            .finish()
    }
}

/// Worker count for a thread hint, 0 meaning "all hardware threads"
pub fn resolve_threads(hint: usize) -> usize {
    if hint > 0 {
        hint
    } else {
        num_cpus::get().max(1)
    }
}

/// Length of each contiguous partition when `len` items go to `workers`
///
/// Every partition but the last has exactly this length. Never zero.
pub fn chunk_len(len: usize, workers: usize) -> usize {
    len.div_ceil(workers.max(1)).max(1)
}
