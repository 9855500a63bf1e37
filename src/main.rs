//! Pixel Plumber headless runner
//!
//! Drives the simulation at a fixed rate with the autopilot (or a set of held
//! keys), logs a HUD line once per second and prints a JSON summary at the end.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;

use pixel_plumber::hint::HintDispatcher;
use pixel_plumber::sim::{EntityKind, GameStatus};
use pixel_plumber::{LevelDef, Session, Settings, autopilot};

const WELCOME: &str = "Welcome, Plumber! Hit the [?] blocks for wisdom.";

#[derive(Debug, Parser)]
#[command(name = "pixel-plumber", about = "Side-scrolling platformer simulation")]
struct Args {
    /// Settings file (JSON)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Level file (JSON); overrides the settings file
    #[arg(long)]
    level: Option<PathBuf>,
    /// Stop after this many ticks (0 = until the run ends)
    #[arg(long)]
    ticks: Option<u64>,
    /// Keys to hold for the whole run, e.g. `right,up`. Disables the autopilot.
    #[arg(long, value_delimiter = ',')]
    hold: Vec<String>,
    /// Pace ticks to wall-clock time
    #[arg(long)]
    realtime: bool,
    /// Oracle seed
    #[arg(long)]
    seed: Option<u64>,
    /// Print the level as JSON and exit
    #[arg(long)]
    dump_level: bool,
}

/// What the runner prints when it finishes
#[derive(Debug, Serialize)]
struct RunSummary {
    status: GameStatus,
    score: u64,
    ticks: u64,
    player_x: f32,
    coins_left: usize,
    enemies_left: usize,
    hint: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut settings = Settings::load_or_default(args.settings.as_deref())?;
    if let Some(level) = args.level {
        settings.level = Some(level);
    }
    if let Some(ticks) = args.ticks {
        settings.max_ticks = ticks;
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    settings.realtime |= args.realtime;
    if !args.hold.is_empty() {
        settings.autopilot = false;
    }

    let level = match &settings.level {
        Some(path) => LevelDef::load(path)
            .with_context(|| format!("loading level {}", path.display()))?,
        None => LevelDef::classic(),
    };

    if args.dump_level {
        println!("{}", level.to_json()?);
        return Ok(());
    }

    log::info!("Pixel Plumber starting... {}", WELCOME);

    let hints = settings
        .hint_service()
        .map(|service| HintDispatcher::new(service, Handle::current()));
    let mut session =
        Session::new(level, settings.tuning.clone(), hints).context("starting level")?;
    for key in &args.hold {
        session.key_down(key);
    }

    let mut pacing = settings.realtime.then(|| {
        let mut interval = tokio::time::interval(settings.tick_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    });
    let hud_every = u64::from(settings.tick_hz.max(1));

    loop {
        match pacing.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            // Let hint tasks make progress between ticks
            None => tokio::task::yield_now().await,
        }

        if settings.autopilot {
            let input = autopilot::drive(session.state(), &settings.tuning);
            session.set_input(input);
        }
        session.tick();

        let state = session.state();
        if state.time_ticks % hud_every == 0 {
            log::info!("{}", state.hud_line());
        }
        if state.status.is_terminal() {
            break;
        }
        if settings.max_ticks > 0 && state.time_ticks >= settings.max_ticks {
            log::info!("Tick limit reached");
            break;
        }
    }

    session.settle_hints().await;
    let state = session.state();
    log::info!("{}", state.hud_line());

    let summary = RunSummary {
        status: state.status,
        score: state.score,
        ticks: state.time_ticks,
        player_x: state.player.pos.x,
        coins_left: state.count(EntityKind::Coin),
        enemies_left: state.count(EntityKind::Enemy),
        hint: state.hint.clone(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
