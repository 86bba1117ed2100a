//! Microcheck binary
//!
//! Runs the sine acceptance test against the simulated engine.
//! Run with: cargo run -p microcheck-cli

use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use microcheck_engine::{OpResolver, SimulatedRuntime};
use microcheck_harness::{sine_vectors, HarnessConfig, Session};

mod model_data;

use model_data::SINE_MODEL;

/// Buffer the arena is carved from; `MICROCHECK_ARENA_SIZE` must fit in it
const ARENA_BUFFER_BYTES: usize = 16 * 1024;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "microcheck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("microcheck v{} started", env!("CARGO_PKG_VERSION"));

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = HarnessConfig::from_env();
    let report_json = config.report_json;
    tracing::info!(
        arena_size = config.arena_size,
        tolerance = config.tolerance,
        mode = ?config.mode,
        rounding = %config.rounding,
        "Configuration"
    );

    let mut resolver = OpResolver::with_capacity(1);
    resolver
        .add_fully_connected()
        .context("registering FULLY_CONNECTED")?;

    let runtime = SimulatedRuntime::sine().with_rounding(config.rounding);
    let mut arena = [0u8; ARENA_BUFFER_BYTES];

    let mut session = Session::initialize(&runtime, &SINE_MODEL, resolver, &mut arena, config)
        .context("initializing session")?;

    let (input_scale, input_zero_point, output_scale, output_zero_point) =
        session.io_quantization()?.into_tuple();
    tracing::debug!(
        input_scale,
        input_zero_point,
        output_scale,
        output_zero_point,
        "Model I/O"
    );

    let report = session.run(&sine_vectors())?;
    if report_json {
        println!("{}", report.to_json()?);
    }
    report.ensure_passed()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use microcheck_model::{ModelArtifact, SCHEMA_VERSION};

    #[test]
    fn test_model_declares_schema_version() {
        let model = ModelArtifact::parse(&SINE_MODEL).unwrap();
        assert_eq!(model.schema_version(), SCHEMA_VERSION);
        assert!(model.header().has_file_identifier());
    }

    #[test]
    fn test_default_run_passes() {
        let runtime = SimulatedRuntime::sine();
        let mut resolver = OpResolver::with_capacity(1);
        resolver.add_fully_connected().unwrap();
        let mut arena = [0u8; ARENA_BUFFER_BYTES];

        let mut session = Session::initialize(
            &runtime,
            &SINE_MODEL,
            resolver,
            &mut arena,
            HarnessConfig::default(),
        )
        .unwrap();
        let report = session.run(&sine_vectors()).unwrap();
        assert!(report.ensure_passed().is_ok());
    }
}
