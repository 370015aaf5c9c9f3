//! ripps runner
//!
//! Runs one effect against a generated dome and logs what it wrote.
//!
//! # Usage
//!
//! ```bash
//! ripps-runner --list
//! ripps-runner --effect candyorb-1 --seconds 5 --seed 7
//! ripps-runner --effect raindrops-7 --dump-config > vapor.json
//! ripps-runner --config vapor.json --frames 600 --rings 16 --segments 32
//! ripps-runner --effect 7-up-2 --realtime --time-scale 0.5
//! RUST_LOG=ripps=debug ripps-runner --effect t_wave-9
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use ripps::registry;
use ripps::time::Clock;
use ripps::{Host, RunConfig, SceneHost, Vec3};

#[derive(Parser)]
#[command(name = "ripps-runner")]
#[command(author, version, about = "Run a ripps effect on a generated dome")]
struct Args {
    /// List the catalog and exit
    #[arg(long)]
    list: bool,

    /// Catalog id to run
    #[arg(long, short = 'e', conflicts_with = "config")]
    effect: Option<String>,

    /// JSON run config to load instead of a catalog id
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Print the selected effect's run config as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Number of frames to run (overrides --seconds)
    #[arg(long)]
    frames: Option<u64>,

    /// Seconds to run (default: the effect's suggested duration)
    #[arg(long)]
    seconds: Option<f32>,

    /// Frame rate (default: the effect's preferred fps)
    #[arg(long)]
    fps: Option<u32>,

    /// Step on wall time, paced at --fps, instead of fixed steps run flat out
    #[arg(long)]
    realtime: bool,

    /// Playback speed multiplier (0 freezes the effect)
    #[arg(long, default_value = "1.0")]
    time_scale: f32,

    // === Scene ===
    /// Dome radius in world units
    #[arg(long, default_value = "100")]
    radius: f32,

    /// Latitude rings between the poles
    #[arg(long, default_value = "12")]
    rings: u32,

    /// Panels per ring
    #[arg(long, default_value = "24")]
    segments: u32,

    /// Random seed (default: seeded from the clock)
    #[arg(long, short = 's')]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.list {
        for entry in registry::CATALOG {
            let mark = if entry.enabled { "*" } else { " " };
            println!("{mark} {:<24} {:<16} {}", entry.id, entry.kind(), entry.name);
        }
        return Ok(());
    }

    let mut run = match (&args.config, &args.effect) {
        (Some(path), _) => {
            RunConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        (None, Some(id)) => RunConfig::new(registry::config_for(id)?),
        (None, None) => bail!("pass --effect <id>, --config <file> or --list"),
    };
    if args.seed.is_some() {
        run.seed = args.seed;
    }

    if args.dump_config {
        println!("{}", run.to_json()?);
        return Ok(());
    }

    if args.radius <= 0.0 || args.rings == 0 || args.segments == 0 {
        bail!("dome needs a positive radius, rings and segments");
    }
    let mut host = SceneHost::dome(Vec3::ZERO, args.radius, args.rings, args.segments);

    let mut effect = run.build()?;
    let meta = effect.meta();
    let fps = args.fps.unwrap_or(meta.fps).max(1);
    let seconds = args.seconds.unwrap_or(meta.duration).max(0.0);

    let mut clock = if args.realtime {
        Clock::wall()
    } else {
        Clock::fixed(fps as f32)
    };
    clock.set_time_scale(args.time_scale);
    if clock.time_scale() == 0.0 && args.frames.is_none() {
        bail!("--time-scale 0 never reaches --seconds; pass --frames as well");
    }

    // A wall clock stops on elapsed time unless a frame count is given.
    let frames = args
        .frames
        .or((!args.realtime).then(|| clock.frames_for(seconds)));
    info!(
        name = %meta.name,
        fps,
        ?frames,
        seconds,
        time_scale = clock.time_scale(),
        realtime = args.realtime,
        blend = ?meta.blend,
        panels = host.panel_count(),
        "running effect"
    );

    let frame_time = Duration::from_secs_f32(1.0 / fps as f32);
    let started = Instant::now();

    effect.init(&mut host);
    loop {
        let done = match frames {
            Some(n) => clock.frame() >= n,
            None => clock.elapsed() >= seconds,
        };
        if done {
            break;
        }
        let tick_start = Instant::now();
        let (t, dt) = clock.tick();
        effect.update(&mut host, t, dt);
        if args.realtime {
            if let Some(rest) = frame_time.checked_sub(tick_start.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }
    effect.dispose(&mut host);

    let elapsed = started.elapsed();
    if host.frames_committed() == 0 && clock.frame() > 0 {
        warn!("effect committed no frames after init");
    }
    info!(
        frames = clock.frame(),
        committed = host.frames_committed(),
        writes = host.writes_total(),
        painted = host.painted_ids().len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "run complete"
    );
    Ok(())
}
