//! Wave & spawn director
//!
//! Two clocks drive enemy creation: a continuous spawn cadence and the wave
//! timer. Wave transitions stagger their batch through one-shot timers.

use super::catalog;
use super::schedule::DelayedAction;
use super::state::{GameEvent, GameState};

pub const BASE_WAVE_ENEMIES: u32 = 2;
pub const MAX_EXTRA_WAVE_ENEMIES: u32 = 8;
pub const BASE_SPAWN_INTERVAL_MS: f64 = 2000.0;
pub const MIN_SPAWN_INTERVAL_MS: f64 = 500.0;
const SPAWN_INTERVAL_PER_WAVE_MS: f64 = 80.0;
const SPAWN_INTERVAL_PER_DIFFICULTY_MS: f64 = 50.0;

pub const BASE_WAVE_DURATION_MS: f64 = 20_000.0;
pub const WAVE_DURATION_STEP_MS: f64 = 2_000.0;
/// Delay between enemies of one batch
pub const BATCH_STAGGER_MS: f64 = 150.0;

pub const WAVE_REGEN: f32 = 5.0;
pub const CLEAR_BONUS_HEALTH: f32 = 2.0;
/// Quiet time required before the clearing bonus fires
pub const CLEAR_COOLDOWN_MS: f64 = 3000.0;

/// Enemies in the batch for wave `n`
pub fn enemies_for_wave(wave: u32) -> u32 {
    BASE_WAVE_ENEMIES + (wave.saturating_sub(1) / 2).min(MAX_EXTRA_WAVE_ENEMIES)
}

pub fn spawn_interval_ms(wave: u32, difficulty: f32) -> f64 {
    let interval = BASE_SPAWN_INTERVAL_MS
        - wave as f64 * SPAWN_INTERVAL_PER_WAVE_MS
        - difficulty as f64 * SPAWN_INTERVAL_PER_DIFFICULTY_MS;
    interval.max(MIN_SPAWN_INTERVAL_MS)
}

pub fn wave_duration_ms(wave: u32) -> f64 {
    BASE_WAVE_DURATION_MS + wave as f64 * WAVE_DURATION_STEP_MS
}

/// Wave bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct WaveState {
    /// Current wave (1-based), also the unlock level for archetypes
    pub number: u32,
    pub started_ms: f64,
    pub spawn_interval_ms: f64,
    /// Last spawn from any source; gates the clearing bonus
    pub last_spawn_ms: f64,
    /// Last continuous-cadence spawn; no other spawn path touches it
    pub last_cadence_ms: f64,
    pub enemies_this_wave: u32,
}

impl WaveState {
    pub fn new(wave: u32, difficulty: f32, now_ms: f64) -> Self {
        let number = wave.max(1);
        Self {
            number,
            started_ms: now_ms,
            spawn_interval_ms: spawn_interval_ms(number, difficulty),
            last_spawn_ms: now_ms,
            last_cadence_ms: now_ms,
            enemies_this_wave: enemies_for_wave(number),
        }
    }

    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.started_ms
    }
}

/// Create one random enemy at the current wave level. Returns its id.
pub fn spawn_enemy(state: &mut GameState) -> u32 {
    let spawn = catalog::random_spawn(
        state.bounds,
        state.difficulty,
        state.wave.number,
        &mut state.rng,
    );
    let id = state.next_entity_id();
    let center = state.center();
    let actor = catalog::build_enemy(id, &spawn, center, state.now_ms);
    log::trace!(
        "spawn enemy {id}: {:?}/{:?} at {:?} hp {}",
        spawn.kind,
        spawn.behavior,
        spawn.pos,
        actor.hp
    );
    state.actors.push(actor);
    state.wave.last_spawn_ms = state.now_ms;
    id
}

/// Queue a staggered batch, first enemy due immediately
fn schedule_batch(state: &mut GameState, count: u32) {
    for i in 0..count {
        let due = state.now_ms + i as f64 * BATCH_STAGGER_MS;
        state.timers.schedule(due, DelayedAction::SpawnEnemy);
    }
}

fn advance_wave(state: &mut GameState) {
    let next = state.wave.number + 1;
    let last_spawn_ms = state.wave.last_spawn_ms;
    let last_cadence_ms = state.wave.last_cadence_ms;
    state.wave = WaveState::new(next, state.difficulty, state.now_ms);
    state.wave.last_spawn_ms = last_spawn_ms;
    state.wave.last_cadence_ms = last_cadence_ms;

    schedule_batch(state, state.wave.enemies_this_wave);
    state.obelisk.heal(WAVE_REGEN);
    state.events.push(GameEvent::WaveStarted { wave: next });
    log::info!(
        "wave {next} started: {} enemies, spawn every {:.0} ms",
        state.wave.enemies_this_wave,
        state.wave.spawn_interval_ms
    );
}

/// Run the director for the current tick
pub fn update(state: &mut GameState) {
    let now = state.now_ms;

    for action in state.timers.take_due(now) {
        match action {
            DelayedAction::SpawnEnemy => {
                spawn_enemy(state);
            }
        }
    }

    if state.wave.elapsed_ms(now) > wave_duration_ms(state.wave.number) {
        advance_wave(state);
    }

    if now - state.wave.last_cadence_ms >= state.wave.spawn_interval_ms {
        state.wave.last_cadence_ms = now;
        spawn_enemy(state);
    }

    let live = state.enemy_count();
    if live == 0
        && state.timers.pending_count() == 0
        && now - state.wave.last_spawn_ms >= CLEAR_COOLDOWN_MS
    {
        state.wave.last_spawn_ms = now;
        schedule_batch(state, state.wave.enemies_this_wave);
        state.obelisk.heal(CLEAR_BONUS_HEALTH);
        log::debug!("field cleared, bonus batch queued");
    }

    if !state.is_degraded() && (live as u32) < state.min_enemies {
        spawn_enemy(state);
    }
}
