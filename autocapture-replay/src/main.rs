//! Autocapture scene replay
//!
//! Loads a capture config and a scripted scene, plays the scene through the
//! capture engine on a manual clock and prints what was captured.
//!
//! Usage:
//!   autocapture-replay --config capture.toml --scene scene.json [--json]

use anyhow::{Context, Result};
use autocapture_core::config;
use autocapture_replay::{format_event, load_scene, replay};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "autocapture-replay")]
#[command(about = "Replay a scripted interaction scene through the capture engine")]
struct Args {
    /// Capture config (TOML). Defaults apply when the file is missing.
    #[arg(short, long, default_value = "capture.toml")]
    config: PathBuf,

    /// Scene to replay (JSON)
    #[arg(short, long)]
    scene: PathBuf,

    /// Print captured events as a JSON array
    #[arg(long)]
    json: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let options = config::load_from(&args.config)?;
    let scene = load_scene(&args.scene)?;
    info!(
        elements = scene.elements.len(),
        interactions = scene.interactions.len(),
        "Replaying {:?}",
        args.scene
    );

    let report = replay(&scene, options)?;

    if args.json {
        let out = serde_json::to_string_pretty(&report.events)
            .context("Failed to serialize captured events")?;
        println!("{out}");
    } else {
        for event in &report.events {
            println!("{}", format_event(event));
        }
        println!(
            "\n{} interactions replayed, {} events captured",
            report.dispatched,
            report.events.len()
        );
    }
    Ok(())
}
