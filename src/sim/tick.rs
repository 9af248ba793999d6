//! Per-frame simulation tick
//!
//! One call advances the match by one (clamped) frame: player, firing,
//! director, steering, integration, collisions, effect expiry.

use glam::Vec2;

use super::behavior::{self, SteeringContext};
use super::collision;
use super::director;
use super::powerups::{self, PICKUP_LIFETIME_MS};
use super::state::{Actor, ActorClass, GameEvent, GamePhase, GameState, ProjectileKind};
use crate::consts::*;
use crate::direction_toward;

/// Plain input values sampled by the host for one frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in arena coordinates, if the pointer is known
    pub pointer: Option<Vec2>,
    /// Primary button held
    pub fire_primary: bool,
    /// Secondary button held
    pub fire_special: bool,
    /// Pause toggle (edge)
    pub pause: bool,
}

/// Advance the game state by one frame of `frame_ms` wall time
pub fn tick(state: &mut GameState, input: &TickInput, frame_ms: f64) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::debug!("paused at {:.0} ms", state.now_ms);
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::GameOver => {}
        }
    }
    if state.phase != GamePhase::Playing {
        return;
    }

    let dt_ms = if frame_ms.is_finite() {
        frame_ms.clamp(0.0, MAX_FRAME_DT_MS)
    } else {
        0.0
    };
    let frames = (dt_ms / FRAME_MS) as f32;
    state.now_ms += dt_ms;

    if let Some(pointer) = input.pointer {
        update_player(state, pointer, frames);
        if input.fire_special {
            try_fire(state, ProjectileKind::Special, pointer);
        }
        if input.fire_primary {
            try_fire(state, ProjectileKind::Regular, pointer);
        }
    }
    refill_ammo(state);

    director::update(state);

    let ctx = SteeringContext {
        obelisk: state.obelisk.pos,
        player: state.player.pos,
        difficulty: state.difficulty,
        bounds: state.bounds,
        now_ms: state.now_ms,
        frames,
    };
    for actor in state.actors.iter_mut() {
        behavior::steer(actor, &ctx, &mut state.rng);
    }

    integrate(state, frames);
    collision::resolve(state);

    if state.timers.effect_poll.poll(state.now_ms) {
        powerups::poll_effects(state);
    }

    if state.obelisk.is_destroyed() {
        state.phase = GamePhase::GameOver;
        state.timers.cancel_all();
        state.events.push(GameEvent::GameOver { score: state.score });
        log::info!(
            "game over: score {} on wave {}",
            state.score,
            state.wave.number
        );
    }

    state.governor.record(frame_ms);
}

/// Move and face the avatar toward the pointer
fn update_player(state: &mut GameState, pointer: Vec2, frames: f32) {
    let player = &mut state.player;
    let delta = pointer - player.pos;

    if delta.x.abs() > PLAYER_DEADZONE || delta.y.abs() > PLAYER_DEADZONE {
        let distance = delta.length();
        let step = (player.speed * frames).min(distance);
        player.pos += delta / distance * step;
    }
    if delta.length_squared() > f32::EPSILON {
        player.angle = delta.y.atan2(delta.x);
    }

    let bounds = state.bounds;
    player.pos.x = player
        .pos
        .x
        .clamp(PLAYER_PADDING, bounds.x - PLAYER_PADDING);
    player.pos.y = player
        .pos
        .y
        .clamp(PLAYER_PADDING, bounds.y - PLAYER_PADDING);

    let leash = PLAYER_LEASH * bounds.x.min(bounds.y);
    let offset = player.pos - state.obelisk.pos;
    if offset.length() > leash {
        player.pos = state.obelisk.pos + offset.clamp_length_max(leash);
    }
}

/// Fire if the cooldown (and ammo, for specials) allows
fn try_fire(state: &mut GameState, kind: ProjectileKind, aim: Vec2) -> Option<u32> {
    let since_last = state.now_ms - state.player.last_shot_ms;
    let fire_rate = state.player.fire_rate_ms as f64;

    match kind {
        ProjectileKind::Regular => {
            if since_last < fire_rate {
                return None;
            }
            fire_projectile(state, kind, aim)
        }
        ProjectileKind::Special => {
            let infinite = state.effects.infinite_special_active();
            if since_last < fire_rate * SPECIAL_SHOT_COOLDOWN_FACTOR as f64
                || (state.player.special_ammo == 0 && !infinite)
            {
                return None;
            }
            let id = fire_projectile(state, kind, aim)?;
            if !infinite {
                state.player.special_ammo -= 1;
            }
            Some(id)
        }
    }
}

/// Spawn a projectile from the player toward `aim`.
///
/// Returns `None` (no shot) when the aim point coincides with the player.
pub fn fire_projectile(state: &mut GameState, kind: ProjectileKind, aim: Vec2) -> Option<u32> {
    let Some(dir) = direction_toward(state.player.pos, aim) else {
        log::trace!("shot skipped: zero-length aim");
        return None;
    };

    let (speed, radius, damage) = match kind {
        ProjectileKind::Regular => (REGULAR_SHOT_SPEED, REGULAR_SHOT_RADIUS, REGULAR_SHOT_DAMAGE),
        ProjectileKind::Special => (SPECIAL_SHOT_SPEED, SPECIAL_SHOT_RADIUS, SPECIAL_SHOT_DAMAGE),
    };

    let id = state.next_entity_id();
    state.actors.push(Actor {
        id,
        pos: state.player.pos,
        vel: dir * speed,
        radius,
        hp: damage,
        spawned_ms: state.now_ms,
        target: Some(aim),
        class: ActorClass::Projectile(kind),
    });
    state.player.last_shot_ms = state.now_ms;
    state.player.angle = dir.y.atan2(dir.x);
    Some(id)
}

fn refill_ammo(state: &mut GameState) {
    let player = &mut state.player;
    if player.special_ammo >= player.ammo_cap {
        player.last_refill_ms = state.now_ms;
        return;
    }
    if state.now_ms - player.last_refill_ms >= SPECIAL_AMMO_REFILL_MS {
        player.special_ammo += 1;
        player.last_refill_ms = state.now_ms;
    }
}

/// Kinematic integration plus lifetime aging
fn integrate(state: &mut GameState, frames: f32) {
    let decay = if state.is_degraded() { 2 } else { 1 };
    let now = state.now_ms;
    let floor = state.bounds.y;

    for actor in state.actors.iter_mut() {
        actor.pos += actor.vel * frames;
        match actor.class {
            ActorClass::Explosion { .. } => {
                actor.hp = actor.hp.saturating_sub(decay).max(0);
            }
            ActorClass::Powerup(_) => {
                if now - actor.spawned_ms > PICKUP_LIFETIME_MS || actor.pos.y - actor.radius > floor
                {
                    actor.hp = 0;
                }
            }
            ActorClass::Enemy(_) | ActorClass::Projectile(_) => {}
        }
    }
}
