//! Frame timing and drive loops
//!
//! The live loop steps with the clamped wall-clock delta between frames and
//! renders after every step. The benchmark loop steps with a fixed virtual
//! delta until a wall-clock budget runs out and reports throughput.

use std::fmt;
use std::time::{Duration, Instant};

use log::info;

use super::{ExecutionMode, ParticleSystem, Viewport};
use crate::error::Result;
use crate::gfx::ParticleRenderer;

/// Virtual time advanced by each benchmark step
pub const BENCHMARK_DT: f32 = 1.0 / 240.0;
/// Largest delta a single live frame may feed into the simulation
pub const MAX_FRAME_DT: f32 = 1.0 / 30.0;
/// Benchmark length when none (or a non-positive one) is configured
pub const DEFAULT_BENCHMARK_SECS: f64 = 3.0;

/// Measures real time between frames
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    max_dt: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_max_dt(MAX_FRAME_DT)
    }

    pub fn with_max_dt(max_dt: f32) -> Self {
        Self {
            last: Instant::now(),
            max_dt,
        }
    }

    /// Seconds since the previous tick, clamped to the maximum frame delta
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Same as [`tick`](Self::tick) with an explicit current instant
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        self.clamp(elapsed)
    }

    /// Restart measuring from now, e.g. after a stall outside the loop
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn clamp(&self, elapsed: Duration) -> f32 {
        elapsed.as_secs_f32().min(self.max_dt)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one live frame: tick the clock, step once, then render
///
/// Returns the delta fed into the simulation.
pub fn live_frame<R: ParticleRenderer + ?Sized>(
    clock: &mut FrameClock,
    system: &mut ParticleSystem,
    viewport: Viewport,
    renderer: &mut R,
) -> Result<f32> {
    let dt = clock.tick();
    system.step(dt, viewport);
    renderer.render(system.particles(), viewport)?;
    Ok(dt)
}

/// Benchmark wall-clock budget for a configured duration in seconds
///
/// Missing, non-positive or unrepresentable durations fall back to
/// [`DEFAULT_BENCHMARK_SECS`].
pub fn benchmark_duration(seconds: Option<f64>) -> Duration {
    seconds
        .filter(|s| *s > 0.0)
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
        .unwrap_or(Duration::from_secs(DEFAULT_BENCHMARK_SECS as u64))
}

/// Outcome of a benchmark run
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    pub mode: ExecutionMode,
    pub particles: usize,
    pub threads: usize,
    pub steps: u64,
    pub elapsed: Duration,
}

impl BenchmarkReport {
    /// Updates per real second, 0 when no measurable time passed
    pub fn steps_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.steps as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[BENCH] mode={} N={} threads={} time={:.3}s steps={} UPS={:.1}",
            self.mode,
            self.particles,
            self.threads,
            self.elapsed.as_secs_f64(),
            self.steps,
            self.steps_per_second()
        )
    }
}

/// Step `system` with [`BENCHMARK_DT`] until `duration` of real time passed
///
/// At least one step always runs.
pub fn run_benchmark(
    system: &mut ParticleSystem,
    viewport: Viewport,
    duration: Duration,
) -> BenchmarkReport {
    info!("Starting benchmark for {:.3}s", duration.as_secs_f64());

    let start = Instant::now();
    let mut steps = 0u64;
    let elapsed = loop {
        system.step(BENCHMARK_DT, viewport);
        steps += 1;
        let elapsed = start.elapsed();
        if elapsed >= duration {
            break elapsed;
        }
    };

    BenchmarkReport {
        mode: system.scheduler().mode(),
        particles: system.len(),
        threads: system.scheduler().threads(),
        steps,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{initialize, Particle, StepScheduler, UpdateRule};

    fn system(count: usize, mode: ExecutionMode) -> ParticleSystem {
        let vp = Viewport::new(320, 200);
        ParticleSystem::from_parts(
            initialize(count, vp, 42),
            StepScheduler::new(mode, 2).unwrap(),
            UpdateRule::Orbital,
        )
    }

    #[derive(Default)]
    struct RecordingRenderer {
        frames: Vec<(usize, Viewport)>,
    }

    impl ParticleRenderer for RecordingRenderer {
        fn render(&mut self, particles: &[Particle], viewport: Viewport) -> Result<()> {
            self.frames.push((particles.len(), viewport));
            Ok(())
        }

        fn resize(&mut self, _width: u32, _height: u32) {}
    }

    #[test]
    fn test_clock_clamps_stalled_frame() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        let dt = clock.tick_at(start + Duration::from_secs(2));
        assert_eq!(dt, MAX_FRAME_DT);
    }

    #[test]
    fn test_clock_passes_short_frames_through() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        let dt = clock.tick_at(start + Duration::from_millis(10));
        assert!((dt - 0.010).abs() < 1e-6);
        assert_eq!(clock.tick_at(start + Duration::from_millis(10)), 0.0);
    }

    #[test]
    fn test_clock_never_goes_negative() {
        let mut clock = FrameClock::new();
        let now = Instant::now();
        clock.tick_at(now + Duration::from_millis(5));
        assert_eq!(clock.tick_at(now), 0.0);
    }

    #[test]
    fn test_benchmark_duration_defaults() {
        assert_eq!(benchmark_duration(None), Duration::from_secs(3));
        assert_eq!(benchmark_duration(Some(0.0)), Duration::from_secs(3));
        assert_eq!(benchmark_duration(Some(-1.0)), Duration::from_secs(3));
        assert_eq!(benchmark_duration(Some(f64::NAN)), Duration::from_secs(3));
        assert_eq!(benchmark_duration(Some(0.5)), Duration::from_millis(500));
        assert_eq!(benchmark_duration(Some(1e20)), Duration::from_secs(3));
        assert_eq!(benchmark_duration(Some(f64::INFINITY)), Duration::from_secs(3));
    }

    #[test]
    fn test_benchmark_reports_throughput() {
        let budget = Duration::from_millis(50);
        let mut sys = system(64, ExecutionMode::Sequential);
        let report = run_benchmark(&mut sys, Viewport::new(320, 200), budget);

        assert!(report.elapsed >= budget);
        assert!(report.steps >= 1);
        let ups = report.steps_per_second();
        assert!(ups > 0.0 && ups.is_finite());
        assert_eq!(report.particles, 64);
        assert_eq!(report.threads, 1);
        assert_eq!(sys.stats().step_count, report.steps);
    }

    #[test]
    fn test_benchmark_uses_fixed_virtual_step() {
        let mut sys = system(8, ExecutionMode::Parallel);
        let report = run_benchmark(&mut sys, Viewport::new(320, 200), Duration::from_millis(20));
        let stats = sys.stats();
        let expected = report.steps as f64 * f64::from(BENCHMARK_DT);
        assert!((stats.simulated_time - expected).abs() < 1e-6 * report.steps as f64);
        assert_eq!(report.mode, ExecutionMode::Parallel);
        assert_eq!(report.threads, 2);
    }

    #[test]
    fn test_throughput_guards_zero_elapsed() {
        let report = BenchmarkReport {
            mode: ExecutionMode::Sequential,
            particles: 1,
            threads: 1,
            steps: 10,
            elapsed: Duration::ZERO,
        };
        assert_eq!(report.steps_per_second(), 0.0);
    }

    #[test]
    fn test_report_line() {
        let report = BenchmarkReport {
            mode: ExecutionMode::Parallel,
            particles: 800,
            threads: 4,
            steps: 600,
            elapsed: Duration::from_secs(3),
        };
        assert_eq!(
            report.to_string(),
            "[BENCH] mode=parallel N=800 threads=4 time=3.000s steps=600 UPS=200.0"
        );
    }

    #[test]
    fn test_live_frame_steps_then_renders() {
        let mut sys = system(16, ExecutionMode::Sequential);
        let mut clock = FrameClock::new();
        let mut renderer = RecordingRenderer::default();
        let vp = Viewport::new(100, 80);

        for _ in 0..3 {
            let dt = live_frame(&mut clock, &mut sys, vp, &mut renderer).unwrap();
            assert!((0.0..=MAX_FRAME_DT).contains(&dt));
        }

        assert_eq!(sys.stats().step_count, 3);
        assert_eq!(renderer.frames, vec![(16, vp); 3]);
        assert!(sys.particles().iter().all(|p| vp.contains(p.position)));
    }
}
