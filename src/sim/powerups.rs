//! Power-up pickups and timed effects
//!
//! Each timed effect remembers the value it overrode, so expiry restores the
//! player's real baseline even after repeated or overlapping activations.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::catalog::weighted_pick;
use super::state::{Actor, ActorClass, GameEvent, GameState, PowerupKind};

pub const PICKUP_RADIUS: f32 = 20.0;
/// Downward drift in pixels per 60 Hz frame
pub const PICKUP_FALL_SPEED: f32 = 0.2;
pub const PICKUP_LIFETIME_MS: f64 = 12_000.0;
pub const MAX_LIVE_PICKUPS: usize = 3;

pub const SHIELD_DURATION_MS: f64 = 10_000.0;
pub const RAPID_FIRE_DURATION_MS: f64 = 8_000.0;
pub const INFINITE_SPECIAL_DURATION_MS: f64 = 5_000.0;

/// Fraction of obelisk damage absorbed while shielded
pub const SHIELD_DAMAGE_REDUCTION: f32 = 0.75;
pub const RAPID_FIRE_FACTOR: f32 = 0.25;
pub const HEALTH_PACK_AMOUNT: f32 = 30.0;

const POWERUP_WEIGHTS: [(PowerupKind, f32); 4] = [
    (PowerupKind::Shield, 15.0),
    (PowerupKind::RapidFire, 25.0),
    (PowerupKind::InfiniteSpecial, 15.0),
    (PowerupKind::HealthPack, 45.0),
];

/// Effect duration; `None` for instant pickups
pub fn duration_ms(kind: PowerupKind) -> Option<f64> {
    match kind {
        PowerupKind::Shield => Some(SHIELD_DURATION_MS),
        PowerupKind::RapidFire => Some(RAPID_FIRE_DURATION_MS),
        PowerupKind::InfiniteSpecial => Some(INFINITE_SPECIAL_DURATION_MS),
        PowerupKind::HealthPack => None,
    }
}

pub fn select_powerup_kind<R: Rng + ?Sized>(rng: &mut R) -> PowerupKind {
    weighted_pick(&POWERUP_WEIGHTS, rng).unwrap_or(PowerupKind::HealthPack)
}

/// Roll for a drop after a kill
pub fn should_drop<R: Rng + ?Sized>(rng: &mut R, chance: f32, live_pickups: usize) -> bool {
    live_pickups < MAX_LIVE_PICKUPS && rng.random::<f32>() < chance
}

pub fn make_pickup(id: u32, pos: Vec2, kind: PowerupKind, now_ms: f64) -> Actor {
    Actor {
        id,
        pos,
        vel: Vec2::new(0.0, PICKUP_FALL_SPEED),
        radius: PICKUP_RADIUS,
        hp: 1,
        spawned_ms: now_ms,
        target: None,
        class: ActorClass::Powerup(kind),
    }
}

/// One running effect and the value it replaced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect<T> {
    pub started_ms: f64,
    pub ends_ms: f64,
    pub baseline: T,
}

impl<T> TimedEffect<T> {
    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        (self.ends_ms - now_ms).max(0.0)
    }
}

/// At most one instance of each timed effect
#[derive(Debug, Clone, Default)]
pub struct ActiveEffects {
    pub shield: Option<TimedEffect<()>>,
    /// Baseline is the fire rate (ms) before the effect
    pub rapid_fire: Option<TimedEffect<u32>>,
    /// Baseline is the ammo count at activation, restored exactly on expiry
    pub infinite_special: Option<TimedEffect<u8>>,
}

impl ActiveEffects {
    pub fn shield_active(&self) -> bool {
        self.shield.is_some()
    }

    pub fn infinite_special_active(&self) -> bool {
        self.infinite_special.is_some()
    }

    /// Obelisk damage after the shield reduction
    pub fn obelisk_damage(&self, base: f32) -> f32 {
        if self.shield_active() {
            base * (1.0 - SHIELD_DAMAGE_REDUCTION)
        } else {
            base
        }
    }

    /// (kind, remaining ms) for each running effect
    pub fn running(&self, now_ms: f64) -> Vec<(PowerupKind, f64)> {
        let mut out = Vec::new();
        if let Some(e) = &self.shield {
            out.push((PowerupKind::Shield, e.remaining_ms(now_ms)));
        }
        if let Some(e) = &self.rapid_fire {
            out.push((PowerupKind::RapidFire, e.remaining_ms(now_ms)));
        }
        if let Some(e) = &self.infinite_special {
            out.push((PowerupKind::InfiniteSpecial, e.remaining_ms(now_ms)));
        }
        out
    }
}

/// Apply a collected pickup to the match
pub fn apply_powerup(state: &mut GameState, kind: PowerupKind) {
    let now = state.now_ms;
    let ends_ms = now + duration_ms(kind).unwrap_or(0.0);

    match kind {
        PowerupKind::Shield => {
            state.effects.shield = Some(TimedEffect {
                started_ms: now,
                ends_ms,
                baseline: (),
            });
        }
        PowerupKind::RapidFire => {
            // Undo a running boost first so the recorded baseline is the real one
            if let Some(previous) = state.effects.rapid_fire.take() {
                state.player.fire_rate_ms = previous.baseline;
            }
            let baseline = state.player.fire_rate_ms;
            state.player.fire_rate_ms =
                ((baseline as f32 * RAPID_FIRE_FACTOR).round() as u32).max(1);
            state.effects.rapid_fire = Some(TimedEffect {
                started_ms: now,
                ends_ms,
                baseline,
            });
        }
        PowerupKind::InfiniteSpecial => {
            let baseline = match state.effects.infinite_special.take() {
                Some(previous) => previous.baseline,
                None => state.player.special_ammo,
            };
            state.effects.infinite_special = Some(TimedEffect {
                started_ms: now,
                ends_ms,
                baseline,
            });
        }
        PowerupKind::HealthPack => {
            state.obelisk.heal(HEALTH_PACK_AMOUNT);
        }
    }

    log::debug!("powerup {kind:?} applied at {now:.0} ms");
    state.events.push(GameEvent::PowerupCollected { kind });
}

/// Expire effects whose end time has passed, restoring baselines
pub fn poll_effects(state: &mut GameState) -> Vec<PowerupKind> {
    let now = state.now_ms;
    let mut expired = Vec::new();

    if state.effects.shield.is_some_and(|e| now >= e.ends_ms) {
        state.effects.shield = None;
        expired.push(PowerupKind::Shield);
    }
    if let Some(effect) = state.effects.rapid_fire.filter(|e| now >= e.ends_ms) {
        state.player.fire_rate_ms = effect.baseline;
        state.effects.rapid_fire = None;
        expired.push(PowerupKind::RapidFire);
    }
    if let Some(effect) = state.effects.infinite_special.filter(|e| now >= e.ends_ms) {
        state.player.special_ammo = effect.baseline;
        state.effects.infinite_special = None;
        expired.push(PowerupKind::InfiniteSpecial);
    }

    for &kind in &expired {
        log::debug!("effect {kind:?} expired at {now:.0} ms");
        state.events.push(GameEvent::EffectExpired { kind });
    }
    expired
}
