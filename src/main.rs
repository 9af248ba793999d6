//! Obelisk Defense - headless native runner
//!
//! Plays one match with a simple autopilot and prints the game-over payload.
//! Pass a JSON settings file as the first argument to override defaults;
//! `RUST_LOG=info` shows wave and quality-tier changes.

#[cfg(not(target_arch = "wasm32"))]
use obelisk_defense::sim::{GameState, TickInput};
#[cfg(not(target_arch = "wasm32"))]
use obelisk_defense::{Session, Settings};

/// Give up after ten simulated minutes
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: u32 = 60 * 60 * 10;

/// Specials are saved for enemies this close to the obelisk
#[cfg(not(target_arch = "wasm32"))]
const SPECIAL_RANGE: f32 = 150.0;

#[cfg(not(target_arch = "wasm32"))]
fn load_settings() -> Settings {
    let Some(path) = std::env::args().nth(1) else {
        return Settings::default();
    };
    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| Settings::from_json(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Could not load settings from {path}: {e}; using defaults");
            Settings::default()
        }
    }
}

/// Aim at the enemy closest to the obelisk and hold fire
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(state: &GameState) -> TickInput {
    let obelisk = state.obelisk.pos;
    let threat = state
        .actors
        .iter()
        .filter(|a| a.is_enemy() && a.is_alive())
        .min_by(|a, b| {
            a.pos
                .distance_squared(obelisk)
                .partial_cmp(&b.pos.distance_squared(obelisk))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    match threat {
        Some(enemy) => TickInput {
            pointer: Some(enemy.pos),
            fire_primary: true,
            fire_special: enemy.pos.distance(obelisk) < SPECIAL_RANGE,
            pause: false,
        },
        None => TickInput::default(),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Obelisk Defense (native autopilot) starting...");

    let mut session = Session::new(load_settings());
    let frame_ms = 1000.0 / 60.0;

    for frame in 0..MAX_FRAMES {
        let input = autopilot(session.state());
        let out = session.frame(frame as f64 * frame_ms, &input);
        if let Some(payload) = out.game_over {
            match payload.to_json() {
                Ok(json) => println!("{json}"),
                Err(e) => log::error!("Failed to encode game over payload: {e}"),
            }
            return;
        }
    }

    let state = session.state();
    log::info!(
        "Autopilot survived {MAX_FRAMES} frames: score {} wave {} health {:.0}",
        state.score,
        state.wave.number,
        state.obelisk.health
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm host drives `Session` directly; nothing to run here
}
