//! Puffball - headless arena runner
//!
//! Steps the simulation at a fixed delta, driven by a recorded input script
//! or a seeded autopilot, and logs events and periodic snapshots.
//!
//! ```bash
//! puffball --ticks 3600 --seed 7
//! puffball --config arena.ron --script demos/hop_and_inhale.ron
//! RUST_LOG=debug puffball --snapshot-every 30
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use game::script::{Autopilot, InputScript};
use game::{ArenaConfig, Outcome, SimEvent, Simulation};
use input::InputState;

#[derive(Parser, Debug)]
#[command(name = "puffball")]
#[command(version, about = "Headless runner for the Puffball arena simulation")]
struct Args {
    /// Arena config (RON). Defaults to ./arena.ron, or built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long, default_value = "3600")]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value = "0.016666668")]
    dt: f32,

    /// Seed for spawning, enemy AI and the autopilot
    #[arg(long, default_value = "1")]
    seed: u64,

    /// Input script to replay instead of the autopilot
    #[arg(long)]
    script: Option<PathBuf>,

    /// Log a snapshot every N ticks (0 disables)
    #[arg(long, default_value = "60")]
    snapshot_every: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ArenaConfig::from_path(path).with_context(|| format!("loading arena config {:?}", path))?,
        None => ArenaConfig::load(None),
    };
    let script = args
        .script
        .as_deref()
        .map(InputScript::from_path)
        .transpose()
        .context("loading input script")?;

    let mut sim = Simulation::new(config, args.seed);
    let mut input = InputState::new();
    let mut autopilot = Autopilot::new(args.seed.wrapping_add(1));

    log::info!(
        "Running {} ticks at dt {:.4}s ({})",
        args.ticks,
        args.dt,
        if script.is_some() { "scripted" } else { "autopilot" }
    );

    let mut stats = RunStats::default();
    for tick in 0..args.ticks {
        input.begin_frame();
        match &script {
            Some(s) => s.apply(tick, &mut input),
            None => autopilot.apply(&mut input),
        }

        let report = sim.step(&input.intents(), args.dt);
        for event in &report.events {
            stats.record(event);
            log::debug!("[{}] {:?}", tick, event);
        }

        if args.snapshot_every > 0 && tick % args.snapshot_every == 0 {
            log_snapshot(tick, &sim);
        }

        if let Outcome::EpisodeEnded(cause) = report.outcome {
            log::info!("Episode ended at tick {}: {:?}", tick, cause);
            break;
        }
    }

    log::info!(
        "Done after {:.1}s simulated: {} stomps, {} swallowed, {} pickups, {} throws",
        sim.time().elapsed_seconds(),
        stats.stomps,
        stats.swallowed,
        stats.pickups,
        stats.throws
    );
    Ok(())
}

#[derive(Default)]
struct RunStats {
    stomps: u32,
    swallowed: u32,
    pickups: u32,
    throws: u32,
}

impl RunStats {
    fn record(&mut self, event: &SimEvent) {
        match event {
            SimEvent::Stomped { .. } => self.stomps += 1,
            SimEvent::Swallowed { .. } => self.swallowed += 1,
            SimEvent::PickedUp { .. } => self.pickups += 1,
            SimEvent::Thrown { .. } => self.throws += 1,
            _ => {}
        }
    }
}

fn log_snapshot(tick: u64, sim: &Simulation) {
    let player = sim.player();
    let p = player.position();
    log::info!(
        "[{}] player {:?} at ({:.2}, {:.2}, {:.2}) power {:?}",
        tick,
        player.mode(),
        p.x,
        p.y,
        p.z,
        player.held_power()
    );
    for instance in sim.render_instances().iter().skip(1) {
        let q = instance.transform.position;
        log::debug!("  {} {:?} at ({:.2}, {:.2}, {:.2})", instance.kind.name(), instance.mode, q.x, q.y, q.z);
    }
}
