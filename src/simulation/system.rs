//! Particle system
//!
//! Owns the particle array for the lifetime of the process together with the
//! scheduler and rule that advance it, and keeps simple step statistics.

use log::info;

use super::{initialize, Particle, StepScheduler, UpdateRule, Viewport};
use crate::config::SimulationConfig;
use crate::error::Result;

/// Step statistics over the system's lifetime
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepStats {
    pub step_count: u64,
    pub simulated_time: f64,
}

impl StepStats {
    /// Record a simulation step
    pub fn record_step(&mut self, delta_time: f32) {
        self.step_count += 1;
        self.simulated_time += f64::from(delta_time);
    }

    /// Average simulated time per step
    pub fn average_step_time(&self) -> f64 {
        if self.step_count > 0 {
            self.simulated_time / self.step_count as f64
        } else {
            0.0
        }
    }
}

/// The simulated particle population
#[derive(Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    scheduler: StepScheduler,
    rule: UpdateRule,
    stats: StepStats,
}

impl ParticleSystem {
    /// Validate `config`, then initialize particles and workers from it
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let scheduler = StepScheduler::new(config.mode, config.threads)?;
        let particles = initialize(config.particles, config.viewport(), config.seed);
        info!(
            "Particles initialized: N={} rule={} mode={} threads={}",
            particles.len(),
            config.rule,
            scheduler.mode(),
            scheduler.threads()
        );
        Ok(Self::from_parts(particles, scheduler, config.rule))
    }

    pub fn from_parts(particles: Vec<Particle>, scheduler: StepScheduler, rule: UpdateRule) -> Self {
        Self {
            particles,
            scheduler,
            rule,
            stats: StepStats::default(),
        }
    }

    /// Advance every particle by `dt` inside the current viewport
    pub fn step(&mut self, dt: f32, viewport: Viewport) {
        self.scheduler
            .step(&mut self.particles, dt, viewport, self.rule);
        self.stats.record_step(dt);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn rule(&self) -> UpdateRule {
        self.rule
    }

    pub fn scheduler(&self) -> &StepScheduler {
        &self.scheduler
    }

    pub fn stats(&self) -> StepStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, SaverError};
    use crate::simulation::ExecutionMode;

    fn config(mode: ExecutionMode) -> SimulationConfig {
        SimulationConfig {
            particles: 300,
            width: 320,
            height: 240,
            threads: 2,
            mode,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_new_system_from_config() {
        let system = ParticleSystem::new(&config(ExecutionMode::Parallel)).unwrap();
        assert_eq!(system.len(), 300);
        assert_eq!(system.scheduler().threads(), 2);
        assert_eq!(system.rule(), UpdateRule::Orbital);
        assert_eq!(system.stats(), StepStats::default());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut bad = config(ExecutionMode::Sequential);
        bad.particles = 0;
        assert!(matches!(
            ParticleSystem::new(&bad),
            Err(SaverError::Config(ConfigError::InvalidParticleCount(0)))
        ));

        let mut bad = config(ExecutionMode::Sequential);
        bad.benchmark = Some(f64::INFINITY);
        assert!(matches!(
            ParticleSystem::new(&bad),
            Err(SaverError::Config(ConfigError::InvalidBenchmarkDuration(_)))
        ));
    }

    #[test]
    fn test_step_records_stats() {
        let mut system = ParticleSystem::new(&config(ExecutionMode::Sequential)).unwrap();
        let vp = Viewport::new(320, 240);
        system.step(0.25, vp);
        system.step(0.75, vp);
        let stats = system.stats();
        assert_eq!(stats.step_count, 2);
        assert_eq!(stats.simulated_time, 1.0);
        assert_eq!(stats.average_step_time(), 0.5);
    }

    #[test]
    fn test_particle_count_is_fixed() {
        let mut system = ParticleSystem::new(&config(ExecutionMode::Parallel)).unwrap();
        for _ in 0..10 {
            system.step(1.0 / 60.0, Viewport::new(320, 240));
        }
        assert_eq!(system.len(), 300);
    }
}
