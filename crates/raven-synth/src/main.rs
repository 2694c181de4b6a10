//! Command-line entry point: reads `RAVEN_SYNTH_CONFIG` and writes the chain JSON

use anyhow::Context;
use raven_synth::{run, write_output, SynthConfig};
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let config = SynthConfig::from_env().context("failed to load synthesizer configuration")?;
    tracing::info!(
        dataset = %config.dataset_root.display(),
        archives = %config.archive_root.display(),
        per_config = config.samples_per_config,
        "starting raven-synth v{}",
        raven_synth::VERSION
    );

    let instances = run(&config).context("failed to generate logical chains")?;
    write_output(&config.output_path, &instances)
        .with_context(|| format!("failed to write {}", config.output_path.display()))?;
    Ok(())
}
