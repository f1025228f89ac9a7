//! Vase Scene Runner
//!
//! Runs a scripted headless session, or with the `windowed` feature, opens
//! an interactive window.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vase_core::config::SceneConfig;
use vase_core::scene::VaseScene;

mod script;
mod sink;
#[cfg(feature = "windowed")]
mod windowed;

#[derive(Parser)]
#[command(name = "vase-sim")]
#[command(about = "Run the vase scene headless or in a window")]
struct Cli {
    /// JSON scene config; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the config seed
    #[arg(long)]
    seed: Option<u64>,

    /// Destroy rounds in the scripted session
    #[arg(long, default_value_t = 3)]
    destroys: u32,

    /// Coins dropped in the scripted session
    #[arg(long, default_value_t = 5)]
    coins: u32,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Open a window instead of running the script
    #[cfg(feature = "windowed")]
    #[arg(long)]
    windowed: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<SceneConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            SceneConfig::from_json(&json)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => SceneConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if cli.print_config {
        println!("{}", config.to_json().context("Failed to encode config")?);
        return Ok(());
    }

    let scene = VaseScene::new(config, Box::new(sink::LoggingSink))
        .context("Failed to build scene")?;

    #[cfg(feature = "windowed")]
    if cli.windowed {
        windowed::run(scene);
        return Ok(());
    }

    let report = script::run(
        scene,
        script::ScriptOptions {
            destroys: cli.destroys,
            coins: cli.coins,
        },
    );

    tracing::info!(
        "[sim] {} frames, {} coins, locked={}",
        report.frames,
        report.coins,
        report.locked
    );
    for (vase, count) in &report.destroy_counts {
        if *count > 0 {
            tracing::info!("[sim] {} destroyed {} time(s)", vase, count);
        }
    }
    Ok(())
}
