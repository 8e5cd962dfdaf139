#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

use anyhow::Context;
use chomp::app::App;
use chomp::config::RunnerConfig;
use chomp::constants::LOOP_TIME;
use chomp::formatter::CustomFormatter;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

fn init_tracing() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(true)
        .event_format(CustomFormatter)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish()
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber).context("could not set the global tracing subscriber")
}

/// Runs the simulation headless in real time until the configured tick budget is spent.
pub fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config = RunnerConfig::load().context("invalid runner configuration")?;
    let mut app = App::new(config).context("could not create the game")?;

    info!(loop_time = ?LOOP_TIME, "Starting game loop");
    while app.run()? {}

    Ok(())
}
