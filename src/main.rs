//! Tank Arena headless runner
//!
//! Plays rounds with autopilot players and logs what happens. Useful for
//! soak-testing levels and tuning without a renderer.
//!
//! Usage: `tank-arena [LEVEL_DIR] [LEVEL_INDEX] [SEED]`
//!
//! Set `TANK_ARENA_CONFIG` to a JSON file to override the default tuning.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde_json::json;

use tank_arena::audio::{AudioSink, LogAudio};
use tank_arena::consts::SIM_DT_MS;
use tank_arena::roster::RoundResult;
use tank_arena::sim::level::next_level_index;
use tank_arena::sim::{
    DEMO_LEVEL, Player, PlayerInput, RoundState, SpriteCatalog, TerrainGrid, TickInput, load_level,
    tick,
};
use tank_arena::{Result, SimConfig};

/// Ticks before the session is cut short (about 16 minutes of play)
const MAX_TICKS: u32 = 60_000;
/// Ticks between autopilot steering changes
const STEER_TICKS: u32 = 40;
const PLAYERS: usize = 2;

struct Args {
    level_dir: Option<PathBuf>,
    level_index: u32,
    seed: u64,
}

fn parse_args() -> Args {
    let mut args = env::args().skip(1);
    let level_dir = args.next().map(PathBuf::from);
    let level_index = args
        .next()
        .and_then(|s| {
            s.parse::<u32>()
                .map_err(|_| log::warn!("Ignoring bad level index {s:?}"))
                .ok()
        })
        .unwrap_or(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().map_err(|_| log::warn!("Ignoring bad seed {s:?}")).ok())
        .unwrap_or(0x7a4c);
    Args {
        level_dir,
        level_index,
        seed,
    }
}

fn load_config() -> Result<SimConfig> {
    match env::var_os("TANK_ARENA_CONFIG") {
        Some(path) => SimConfig::load(PathBuf::from(path)),
        None => Ok(SimConfig::default()),
    }
}

fn load_grid(args: &Args, index: u32) -> Result<TerrainGrid> {
    match &args.level_dir {
        Some(dir) => load_level(dir, index),
        None => Ok(TerrainGrid::parse(DEMO_LEVEL)),
    }
}

/// Wanders, turns now and then and keeps the trigger held
struct Autopilot {
    rng: Pcg32,
    held: Vec<PlayerInput>,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            held: vec![PlayerInput::default(); PLAYERS],
        }
    }

    fn input(&mut self, tick_index: u32) -> TickInput {
        if tick_index % STEER_TICKS == 0 {
            for held in &mut self.held {
                *held = match self.rng.random_range(0..5) {
                    0 => PlayerInput { up: true, ..Default::default() },
                    1 => PlayerInput { down: true, ..Default::default() },
                    2 => PlayerInput { left: true, ..Default::default() },
                    3 => PlayerInput { right: true, ..Default::default() },
                    _ => PlayerInput::default(),
                };
                held.fire = true;
            }
        }
        TickInput {
            players: self.held.clone(),
            pause: false,
        }
    }
}

fn run() -> Result<()> {
    let args = parse_args();
    let config = load_config()?;
    let catalog = Arc::new(SpriteCatalog::default());
    let mut audio = LogAudio::new();
    let mut autopilot = Autopilot::new(args.seed.wrapping_add(1));

    let mut level_index = args.level_index;
    let mut state = RoundState::new_game(
        load_grid(&args, level_index)?,
        level_index,
        PLAYERS,
        config.clone(),
        Arc::clone(&catalog),
        args.seed,
    );

    let mut ticks = 0;
    let mut rounds = Vec::new();
    while ticks < MAX_TICKS {
        tick(&mut state, &autopilot.input(ticks), SIM_DT_MS);
        audio.play_all(state.drain_sounds());
        ticks += 1;

        let Some(outcome) = state.outcome() else {
            continue;
        };
        rounds.push(json!({
            "level": outcome.level_index,
            "result": outcome.result,
            "scores": outcome.scores(),
        }));
        if outcome.result != RoundResult::Victory {
            break;
        }
        level_index = next_level_index(level_index, config.level_count);
        let roster: Vec<Player> = outcome.carry_over(&config, &catalog).unwrap_or_default();
        state = RoundState::new(
            load_grid(&args, level_index)?,
            level_index,
            roster,
            config.clone(),
            Arc::clone(&catalog),
            args.seed.wrapping_add(u64::from(level_index)),
        );
    }

    if !state.is_finished() {
        log::info!("Tick budget spent on level {}", state.level_index);
    }
    let report = json!({
        "ticks": ticks,
        "sounds_played": audio.played,
        "rounds": rounds,
        "status": state.status_panel(),
        "game_over_banner": state.game_over_banner(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Tank Arena (headless) starting...");
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
