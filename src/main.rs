use std::process::ExitCode;

use anyhow::Context;
use log::{error, info};

use saver::config::USAGE;
use saver::simulation::clock::{benchmark_duration, run_benchmark};
use saver::{ParseOutcome, ParticleSystem, ScreensaverApp, SimulationConfig};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let outcome = SimulationConfig::from_args(std::env::args().skip(1))
        .context("invalid command line")?;
    let config = match outcome {
        ParseOutcome::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        ParseOutcome::Run(config) => config,
    };

    info!(
        "Args: mode={} rule={} N={} size={}x{} threads={} benchmark={} seed={}",
        config.mode,
        config.rule,
        config.particles,
        config.width,
        config.height,
        config.threads,
        config
            .benchmark
            .map_or_else(|| "off".to_string(), |s| format!("{s}s")),
        config.seed
    );

    let mut system = ParticleSystem::new(&config).context("failed to set up the simulation")?;

    if config.is_benchmark() {
        let report = run_benchmark(
            &mut system,
            config.viewport(),
            benchmark_duration(config.benchmark),
        );
        println!("{report}");
        info!("{report}");
        return Ok(());
    }

    info!("Starting live mode");
    ScreensaverApp::new(&config, system)
        .run()
        .context("live mode failed")?;
    info!("Exiting");
    Ok(())
}
