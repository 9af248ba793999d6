//! Per-tick enemy steering
//!
//! Each behavior nudges velocity toward a target point (normally the obelisk,
//! the player for hunters in range). After blending, a per-edge override keeps
//! enemies from resting on (or drifting out past) the arena border, the speed
//! is capped per archetype and an isotropic drag is applied.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::catalog;
use super::state::{Actor, Behavior, EnemySpecial};
use crate::{direction_toward, perpendicular, polar_to_cartesian};

/// Hunters lock on when the player is closer than this
pub const HUNTER_LOCK_RANGE: f32 = 300.0;
/// Distance from an edge that counts as resting on it
pub const BOUNDARY_BUFFER: f32 = 10.0;
/// Velocity retained-fraction lost per 60 Hz frame
pub const DRAG: f32 = 0.02;
/// Teleport destination annulus around the target
pub const TELEPORT_MIN_DISTANCE: f32 = 100.0;
pub const TELEPORT_MAX_DISTANCE: f32 = 200.0;

const ERRATIC_BURST_CHANCE: f32 = 0.05;
const ERRATIC_NOISE: f32 = 0.2;
const AMBUSH_TRIGGER_DISTANCE: f32 = 150.0;
const DEFENSIVE_BAND: f32 = 200.0;

/// World facts steering needs for one tick
#[derive(Debug, Clone, Copy)]
pub struct SteeringContext {
    pub obelisk: Vec2,
    pub player: Vec2,
    pub difficulty: f32,
    pub bounds: Vec2,
    pub now_ms: f64,
    /// Tick length in 60 Hz frames
    pub frames: f32,
}

/// Update one enemy's velocity (and position, for teleporters)
pub fn steer<R: Rng + ?Sized>(actor: &mut Actor, ctx: &SteeringContext, rng: &mut R) {
    let Some(enemy) = actor.enemy().copied() else {
        return;
    };
    if !actor.is_alive() {
        return;
    }

    let d = ctx.difficulty;
    let f = ctx.frames;
    let since_spawn_ms = (ctx.now_ms - actor.spawned_ms).max(0.0);

    let mut attraction = 0.05 + d * 0.01;
    let mut target = ctx.obelisk;

    if let EnemySpecial::Hunter { .. } = enemy.special {
        let seeking = actor.pos.distance(ctx.player) < HUNTER_LOCK_RANGE;
        if seeking {
            target = ctx.player;
            attraction = 0.08 + d * 0.02;
        }
        if let Some(e) = actor.enemy_mut() {
            e.special = EnemySpecial::Hunter { seeking };
        }
    }
    actor.target = Some(target);

    let dir = direction_toward(actor.pos, target).unwrap_or(Vec2::ZERO);
    let side = perpendicular(dir);
    let distance_to_target = actor.pos.distance(target);

    let at_left = actor.pos.x <= BOUNDARY_BUFFER;
    let at_right = actor.pos.x >= ctx.bounds.x - BOUNDARY_BUFFER;
    let at_top = actor.pos.y <= BOUNDARY_BUFFER;
    let at_bottom = actor.pos.y >= ctx.bounds.y - BOUNDARY_BUFFER;
    if at_left || at_right || at_top || at_bottom {
        attraction *= 3.0;
    }

    let mut vel = actor.vel;
    match enemy.behavior {
        Behavior::Direct => {
            vel += dir * attraction * f;
        }
        Behavior::Circling => {
            vel += dir * attraction * 0.5 * f;
            vel += side * attraction * 2.0 * f;
        }
        Behavior::Swooping => {
            let t = (since_spawn_ms / 1000.0) as f32;
            vel.x += dir.x * attraction * (0.5 + t.sin() * 0.5) * f;
            vel.y += dir.y * attraction * (0.5 + t.cos() * 0.5) * f;
        }
        Behavior::Erratic => {
            if rng.random::<f32>() < ERRATIC_BURST_CHANCE {
                vel = dir * (1.0 + d * 0.2);
            } else {
                let noise = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5);
                vel += dir * attraction * 0.3 * f;
                vel += noise * ERRATIC_NOISE * f;
            }
        }
        Behavior::Ambush => {
            let threshold_ms = (5000.0 - d * 400.0) as f64;
            if since_spawn_ms > threshold_ms || distance_to_target < AMBUSH_TRIGGER_DISTANCE {
                vel += dir * attraction * 3.0 * f;
            } else {
                vel += dir * attraction * 0.2 * f;
            }
        }
        Behavior::Defensive => {
            if distance_to_target < DEFENSIVE_BAND {
                vel -= dir * attraction * f;
            } else if rng.random::<f32>() < 0.01 * d {
                vel = dir * (1.5 + d * 0.1);
            } else {
                vel += side * attraction * 1.5 * f;
            }
        }
    }

    // Edge override wins over the behavior, per axis
    let push = 0.5 + d * 0.1;
    if at_left && vel.x <= 0.0 {
        vel.x = push;
    }
    if at_right && vel.x >= 0.0 {
        vel.x = -push;
    }
    if at_top && vel.y <= 0.0 {
        vel.y = push;
    }
    if at_bottom && vel.y >= 0.0 {
        vel.y = -push;
    }

    if let EnemySpecial::Teleporter {
        cooldown_ms,
        last_teleport_ms,
    } = enemy.special
    {
        if ctx.now_ms - last_teleport_ms > cooldown_ms {
            let angle = rng.random::<f32>() * TAU;
            let distance = TELEPORT_MIN_DISTANCE
                + rng.random::<f32>() * (TELEPORT_MAX_DISTANCE - TELEPORT_MIN_DISTANCE);
            actor.pos = target + polar_to_cartesian(distance, angle);
            vel = Vec2::ZERO;
            if let Some(e) = actor.enemy_mut() {
                e.special = EnemySpecial::Teleporter {
                    cooldown_ms,
                    last_teleport_ms: ctx.now_ms,
                };
            }
            log::trace!("enemy {} teleported to {:?}", actor.id, actor.pos);
        }
    }

    let max_speed = catalog::max_speed(d, enemy.kind);
    vel = vel.clamp_length_max(max_speed);
    vel *= (1.0 - DRAG).powf(f);

    actor.vel = vel;
}
