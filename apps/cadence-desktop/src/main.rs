mod keymap;
mod platform;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cadence_assets::AssetStore;
use cadence_kernel::{EngineConfig, Environment, Scene, Scheduler};
use cadence_physics::PhysicsBackend;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::platform::DesktopPlatform;

#[derive(Parser)]
#[command(name = "cadence-desktop", about = "Run the playground scene in a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Engine config file (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

#[cfg(feature = "rapier")]
fn physics(config: &EngineConfig) -> Box<dyn PhysicsBackend> {
    Box::new(cadence_physics::RapierWorld::with_settings(config.physics))
}

#[cfg(not(feature = "rapier"))]
fn physics(config: &EngineConfig) -> Box<dyn PhysicsBackend> {
    Box::new(cadence_physics::SimpleWorld::with_settings(config.physics))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    tracing::info!("cadence-desktop starting");

    let mut env = Environment::new(physics(&config))
        .with_window(config.window.width, config.window.height);
    let mut scene = Scene::new();
    let mut assets = AssetStore::new();
    cadence_playground::build(&mut scene, &mut env, &mut assets, &config);

    let platform = DesktopPlatform::new(
        config.window.title.clone(),
        config.window.width,
        config.window.height,
    );
    let mut scheduler = Scheduler::new(platform, config.scheduler);
    scheduler
        .start(&mut scene, &mut env)
        .context("frame loop failed")?;

    let stats = scheduler.stats();
    tracing::info!(
        frames = stats.frames,
        steps = stats.steps,
        dropped = stats.dropped_steps,
        "cadence-desktop exiting"
    );
    Ok(())
}
