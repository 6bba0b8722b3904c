use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use cadence_assets::AssetStore;
use cadence_input::Key;
use cadence_kernel::{
    EngineConfig, Environment, HeadlessPlatform, ManualClock, Scene, Scheduler, clamp_velocity,
};
use cadence_physics::PhysicsBackend;
use clap::{Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cadence-cli", about = "Headless tools for the cadence runtime")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and physics backend
    Info,
    /// Simulate the playground scene without a window
    Run {
        /// Simulated seconds to run for
        #[arg(short, long, default_value = "2.0")]
        seconds: f32,
        /// Simulated milliseconds between event polls
        #[arg(long, default_value = "20")]
        poll_ms: u64,
        /// Keys held down for the whole run (e.g. w,space)
        #[arg(short, long, value_delimiter = ',')]
        keys: Vec<String>,
        /// Engine config file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the last presented frame
        #[arg(long)]
        frame: bool,
    },
    /// Print the default engine config as JSON
    Config,
    /// Apply the entity speed limits to a velocity
    Clamp {
        #[arg(allow_hyphen_values = true)]
        x: f32,
        #[arg(allow_hyphen_values = true)]
        y: f32,
        #[arg(allow_hyphen_values = true)]
        z: f32,
        #[arg(long, default_value = "7.5")]
        lateral: f32,
        #[arg(long, default_value = "5.0")]
        vertical: f32,
    },
}

#[cfg(feature = "rapier")]
const BACKEND: &str = "rapier3d";
#[cfg(not(feature = "rapier"))]
const BACKEND: &str = "simple";

#[cfg(feature = "rapier")]
fn physics(config: &EngineConfig) -> Box<dyn PhysicsBackend> {
    Box::new(cadence_physics::RapierWorld::with_settings(config.physics))
}

#[cfg(not(feature = "rapier"))]
fn physics(config: &EngineConfig) -> Box<dyn PhysicsBackend> {
    Box::new(cadence_physics::SimpleWorld::with_settings(config.physics))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("cadence-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("physics: {BACKEND}");
            let config = EngineConfig::default();
            println!(
                "scheduler: {} Hz, at most {} steps per frame",
                config.scheduler.frame_cap, config.scheduler.max_steps_per_frame
            );
        }
        Commands::Run {
            seconds,
            poll_ms,
            keys,
            config,
            frame,
        } => {
            let config = load_config(config.as_deref())?;
            if poll_ms == 0 {
                anyhow::bail!("--poll-ms must be > 0");
            }
            let polls = ((seconds.max(0.0) * 1000.0) / poll_ms as f32).ceil() as u64;

            let mut env = Environment::new(physics(&config))
                .with_window(config.window.width, config.window.height);
            let mut scene = Scene::new();
            let mut assets = AssetStore::new();
            let playground = cadence_playground::build(&mut scene, &mut env, &mut assets, &config);

            for name in &keys {
                let key = Key::from_name(name)
                    .with_context(|| format!("unknown key {name:?}"))?;
                env.input.press(key);
            }

            tracing::info!(polls, poll_ms, keys = keys.len(), "headless run starting");
            let clock = ManualClock::new();
            let platform = HeadlessPlatform::new()
                .simulated(clock.clone(), Duration::from_millis(poll_ms))
                .close_after(polls);
            let mut scheduler = Scheduler::with_clock(platform, clock, config.scheduler);
            scheduler
                .start(&mut scene, &mut env)
                .context("headless run failed")?;

            let stats = scheduler.stats();
            tracing::info!(
                steps = stats.steps,
                frames = stats.frames,
                "headless run finished"
            );
            println!(
                "Ran {polls} polls: steps={}, frames={}, dropped={}",
                stats.steps, stats.frames, stats.dropped_steps
            );
            if let Some(player) = scene.get(playground.player) {
                let p = player.object().transform.position;
                println!("Player: ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
            }
            if frame {
                print!("{}", scheduler.platform().last_frame());
            }
        }
        Commands::Config => {
            println!("{}", EngineConfig::default().to_json_pretty()?);
        }
        Commands::Clamp {
            x,
            y,
            z,
            lateral,
            vertical,
        } => {
            let v = clamp_velocity(Vec3::new(x, y, z), lateral, vertical);
            println!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z);
        }
    }

    Ok(())
}
