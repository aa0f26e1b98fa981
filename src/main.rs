//! Headless runner for tilerun stages
//!
//! Usage:
//!   tilerun check --stage assets/stages/cutman.ron
//!   tilerun run --stage assets/stages/cutman.ron --script assets/scripts/walk_right.ron
//!
//! Logging follows `RUST_LOG` (default `info`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tilerun::game::{AudioSink, GameMode, GameRuntime, InputScript, ScriptedInput, Stage, Tuning, World};
use tilerun::VERSION;

#[derive(Parser)]
#[command(name = "tilerun")]
#[command(about = "Run or validate platformer stages without a window")]
#[command(version = VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a stage for a number of ticks, optionally driven by a script
    Run {
        /// Stage file (RON)
        #[arg(long)]
        stage: PathBuf,
        /// Tuning overrides (RON); defaults when absent
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Scripted button events (RON)
        #[arg(long)]
        script: Option<PathBuf>,
        /// Ticks to simulate; defaults to the script length plus two seconds
        #[arg(long)]
        ticks: Option<u64>,
        /// Loot RNG seed, overriding the tuning file
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Load and validate a stage (and tuning file) without simulating
    Check {
        #[arg(long)]
        stage: PathBuf,
        #[arg(long)]
        tuning: Option<PathBuf>,
    },
}

/// Sound sink that writes requests to the log
struct LogAudio;

impl AudioSink for LogAudio {
    fn play_sound(&mut self, name: &str, blocking: bool) {
        tracing::debug!(sound = name, blocking, "play");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { stage, tuning, script, ticks, seed } => run(&stage, tuning.as_deref(), script.as_deref(), ticks, seed),
        Commands::Check { stage, tuning } => check(&stage, tuning.as_deref()),
    }
}

fn load_tuning(path: Option<&Path>) -> Result<Tuning> {
    match path {
        Some(path) => Tuning::load(path).with_context(|| format!("Failed to load tuning {}", path.display())),
        None => Ok(Tuning::default()),
    }
}

fn load_stage(path: &Path) -> Result<Stage> {
    Stage::load(path).with_context(|| format!("Failed to load stage {}", path.display()))
}

fn load_script(path: &Path) -> Result<InputScript> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    ron::from_str(&text).with_context(|| format!("Failed to parse script {}", path.display()))
}

fn check(stage_path: &Path, tuning_path: Option<&Path>) -> Result<()> {
    let tuning = load_tuning(tuning_path)?;
    let stage = load_stage(stage_path)?;

    println!("Stage '{}' ({}x{})", stage.name, stage.width, stage.height);
    println!("  platforms: {}", stage.platforms.len());
    println!("  ladders:   {}", stage.ladders.len());
    println!("  hazards:   {}", stage.hazards.len());
    println!("  gates:     {}", stage.gates.len());
    println!("  enemies:   {}", stage.enemy_spawns.len());
    println!("  items:     {}", stage.item_spawns.len());
    for zone in &stage.zones {
        println!("  zone '{}' at ({}, {}) {}x{}", zone.name, zone.rect.x, zone.rect.y, zone.rect.w, zone.rect.h);
    }
    println!("Tuning OK (timestep {:.4}s, seed {})", tuning.timestep, tuning.seed);
    Ok(())
}

fn run(
    stage_path: &Path,
    tuning_path: Option<&Path>,
    script_path: Option<&Path>,
    ticks: Option<u64>,
    seed: Option<u64>,
) -> Result<()> {
    let mut tuning = load_tuning(tuning_path)?;
    if let Some(seed) = seed {
        tuning.seed = seed;
    }
    let stage = load_stage(stage_path)?;
    let script = match script_path {
        Some(path) => load_script(path)?,
        None => InputScript::default(),
    };

    let ticks = ticks.unwrap_or_else(|| script.last_tick().unwrap_or(0) + 120);
    let input = ScriptedInput;
    let mut audio = LogAudio;
    let mut runtime = GameRuntime::new(World::new(stage, tuning));

    tracing::info!(ticks, events = script.events.len(), "running");

    for tick in 0..ticks {
        for event in script.events_at(tick) {
            runtime.handle_input(&input, &event);
        }

        let events = runtime.tick(&mut audio);

        for zone in events.zone_changed.iter() {
            tracing::info!(tick, zone = %zone.name, music = ?zone.music, "zone changed");
        }
        for item in events.item_collected.iter() {
            tracing::info!(tick, kind = ?item.kind, "item collected");
        }
        for death in events.death.iter() {
            tracing::info!(tick, target = ?death.target, killer = ?death.killer, "death");
        }

        if runtime.mode() == GameMode::GameOver {
            break;
        }
    }

    let player = &runtime.world.player;
    println!(
        "After {} ticks: mode {:?}, player at ({:.1}, {:.1}) {:?}, hp {}/{}, lives {}, score {}",
        runtime.ticks(),
        runtime.mode(),
        player.body.position.x,
        player.body.position.y,
        player.mode(),
        player.hit_points,
        player.max_hit_points,
        player.lives,
        player.score,
    );
    Ok(())
}
