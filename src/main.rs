//! Deadblock entry point
//!
//! Runs a headless session: the demo autopilot plays through the fixed-step loop
//! while events are logged. Rendering and input capture belong to the embedding
//! host.

use std::path::PathBuf;

use deadblock::consts::{MAX_SUBSTEPS, SIM_DT};
use deadblock::platform;
use deadblock::sim::{GameEvent, GamePhase, GameState, RenderFrame, TickInput, tick};
use deadblock::{Settings, Tuning};

/// Frame times the fake host cycles through (the last one exceeds the clamp)
const FRAME_TIMES: [f32; 5] = [1.0 / 60.0, 1.0 / 144.0, 1.0 / 30.0, 1.0 / 60.0, 0.25];

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Options {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Fixed RNG seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Wall-clock seconds of frames to feed the session
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// Tuning JSON overriding the built-in gameplay numbers
    tuning: Option<PathBuf>,
}

/// Session driven like a browser frame loop
struct Game {
    state: GameState,
    accumulator: f32,
    input: TickInput,
}

impl Game {
    fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        let mut state = GameState::new(seed, tuning, platform::currency_store());
        state.settings = settings;
        Self {
            state,
            accumulator: 0.0,
            input: TickInput {
                idle_mode: true,
                ..Default::default()
            },
        }
    }

    /// Run simulation ticks
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.look_delta = glam::Vec2::ZERO;
            self.input.purchases.clear();
            self.input.settings = None;
        }

        for event in self.state.drain_events() {
            if event == GameEvent::SettingsChanged {
                platform::save_settings(&self.state.settings);
            }
            log_event(&event);
        }
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::WaveStarted { .. }
        | GameEvent::WaveCleared { .. }
        | GameEvent::GameOver { .. }
        | GameEvent::Purchased { .. }
        | GameEvent::Toast(_) => log::info!("{event:?}"),
        GameEvent::Tracer { .. } | GameEvent::ScreenShake { .. } => {
            log::trace!("{event:?}")
        }
        _ => log::debug!("{event:?}"),
    }
}

fn run(options: Options) {
    platform::init_logging(options.verbose);
    log::info!("Deadblock (headless) starting...");

    let tuning = match &options.tuning {
        Some(path) => Tuning::load(path).unwrap_or_else(|e| {
            log::warn!("{e}; using default tuning");
            Tuning::default()
        }),
        None => Tuning::default(),
    };
    let settings = platform::load_settings();
    let seed = options.seed.unwrap_or_else(rand::random);
    log::debug!("Session seed {seed}");

    let mut game = Game::new(seed, tuning, settings);
    let mut elapsed = 0.0;
    for frame in 0.. {
        if elapsed >= options.seconds || game.state.phase == GamePhase::GameOver {
            break;
        }
        let dt = FRAME_TIMES[frame % FRAME_TIMES.len()];
        game.update(dt);
        elapsed += dt;
    }

    let frame = RenderFrame::capture(&game.state);
    match serde_json::to_string(&frame.hud) {
        Ok(json) => log::debug!("Final HUD: {json}"),
        Err(e) => log::warn!("Failed to serialize HUD: {e}"),
    }
    log::info!(
        "Session over after {:.1}s sim time: wave {}, {} kills, balance {}",
        game.state.time,
        game.state.wave.number,
        game.state.kills,
        game.state.economy.balance()
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;
    run(Options::parse());
}

/// No command line in the browser; run a short demo session
#[cfg(target_arch = "wasm32")]
fn main() {
    run(Options {
        verbose: false,
        seed: None,
        seconds: 30.0,
        tuning: None,
    });
}
