//! Simulation configuration
//!
//! [`SimulationConfig`] is built once at startup, from defaults or from the
//! command line, validated, and then only read.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::simulation::{ExecutionMode, UpdateRule, Viewport};

pub const USAGE: &str = "\
Usage: saver [-n N] [--mode seq|parallel] [--rule orbital|drift] [--threads T]
             [--width W] [--height H] [--benchmark [S]] [--seed X]

  -n, --N N          number of particles (default 800)
      --mode M       seq or parallel (default parallel)
      --rule R       orbital or drift (default orbital)
      --threads T    worker threads, 0 = one per hardware thread (default 0)
      --width W      window width in pixels (default 960)
      --height H     window height in pixels (default 600)
      --benchmark S  run headless for S seconds and report updates per second
                     (3 seconds when S is omitted or not positive)
      --seed X       random seed (default 42)
  -h, --help         print this help

Set RUST_LOG to change the log level (default info).";

/// Immutable simulation settings
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub particles: usize,
    pub width: u32,
    pub height: u32,
    /// Worker thread hint, 0 for one per hardware thread
    pub threads: usize,
    pub mode: ExecutionMode,
    pub rule: UpdateRule,
    pub seed: u64,
    /// Headless benchmark length in seconds; `None` runs the live window
    pub benchmark: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particles: 800,
            width: 960,
            height: 600,
            threads: 0,
            mode: ExecutionMode::Parallel,
            rule: UpdateRule::Orbital,
            seed: 42,
            benchmark: None,
        }
    }
}

/// Result of parsing the command line
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Run(SimulationConfig),
    Help,
}

impl SimulationConfig {
    /// Parse command-line arguments, program name excluded
    pub fn from_args<I, S>(args: I) -> Result<ParseOutcome, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut config = SimulationConfig::default();

        let mut particles = config.particles as i64;
        let mut width = i64::from(config.width);
        let mut height = i64::from(config.height);
        let mut threads = config.threads as i64;

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "-h" | "--help" => return Ok(ParseOutcome::Help),
                "-n" | "--N" => particles = parse_value(&args, &mut i)?,
                "--width" => width = parse_value(&args, &mut i)?,
                "--height" => height = parse_value(&args, &mut i)?,
                "--threads" => threads = parse_value(&args, &mut i)?,
                "--mode" => config.mode = parse_value(&args, &mut i)?,
                "--rule" => config.rule = parse_value(&args, &mut i)?,
                "--seed" => config.seed = parse_value(&args, &mut i)?,
                "--benchmark" => {
                    // The duration is optional; only consume the next
                    // argument when it is a number.
                    let seconds = args.get(i + 1).and_then(|v| v.parse::<f64>().ok());
                    if seconds.is_some() {
                        i += 1;
                    }
                    config.benchmark = Some(seconds.unwrap_or(0.0));
                }
                other => return Err(ConfigError::UnknownArgument(other.to_string())),
            }
            i += 1;
        }

        if particles <= 0 {
            return Err(ConfigError::InvalidParticleCount(particles));
        }
        if threads < 0 {
            return Err(ConfigError::InvalidThreadCount(threads));
        }
        let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(ConfigError::InvalidViewport { width, height });
        };

        config.particles = particles as usize;
        config.threads = threads as usize;
        config.width = w;
        config.height = h;
        config.validate()?;
        Ok(ParseOutcome::Run(config))
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particles == 0 {
            return Err(ConfigError::InvalidParticleCount(0));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidViewport {
                width: i64::from(self.width),
                height: i64::from(self.height),
            });
        }
        // Non-positive means "use the default"; anything else must fit a Duration
        if let Some(seconds) = self.benchmark {
            if seconds.is_nan() || (seconds > 0.0 && Duration::try_from_secs_f64(seconds).is_err()) {
                return Err(ConfigError::InvalidBenchmarkDuration(seconds));
            }
        }
        Ok(())
    }

    /// Initial viewport
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    pub fn is_benchmark(&self) -> bool {
        self.benchmark.is_some()
    }
}

/// Parse the value following the flag at `args[*i]`, advancing `i` past it
fn parse_value<T>(args: &[String], i: &mut usize) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: IntoConfigError,
{
    let flag = &args[*i];
    let value = args
        .get(*i + 1)
        .ok_or_else(|| ConfigError::MissingValue(flag.clone()))?;
    *i += 1;
    value
        .parse::<T>()
        .map_err(|err| err.into_config_error(flag.clone(), value.clone()))
}

/// Maps a `FromStr` error to the matching [`ConfigError`]
trait IntoConfigError {
    fn into_config_error(self, flag: String, value: String) -> ConfigError;
}

impl IntoConfigError for ConfigError {
    fn into_config_error(self, _flag: String, _value: String) -> ConfigError {
        self
    }
}

impl IntoConfigError for std::num::ParseIntError {
    fn into_config_error(self, flag: String, value: String) -> ConfigError {
        ConfigError::InvalidValue { flag, value }
    }
}
