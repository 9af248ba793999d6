//! Enemy catalog: per-archetype stats, weighted selection and spawn geometry
//!
//! Selection uses two independent tables (archetype and behavior). Each entry
//! scales linearly with difficulty and is floored at zero. Archetypes unlock
//! by wave, so early waves only draw from a small subset.

use glam::Vec2;
use rand::Rng;

use super::state::{Actor, ActorClass, Behavior, Enemy, EnemyKind, EnemySpecial};
use crate::{direction_toward, perpendicular};

/// Spawn distance outside the visible edge
pub const SPAWN_BUFFER: f32 = 100.0;
/// Teleporter cooldown
pub const TELEPORT_COOLDOWN_MS: f64 = 3000.0;
/// Fraction of spawn speed every velocity component keeps at minimum
const MIN_VELOCITY_COMPONENT: f32 = 0.1;

/// Static stat multipliers for one archetype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub size_mult: f32,
    pub speed_mult: f32,
    pub hp_mult: f32,
    pub targets_player: bool,
    pub teleports: bool,
    pub shielded: bool,
}

impl EnemyStats {
    const fn plain(size_mult: f32, speed_mult: f32, hp_mult: f32) -> Self {
        Self {
            size_mult,
            speed_mult,
            hp_mult,
            targets_player: false,
            teleports: false,
            shielded: false,
        }
    }
}

/// Stat table lookup
pub fn stats(kind: EnemyKind) -> EnemyStats {
    match kind {
        EnemyKind::Basic => EnemyStats::plain(1.0, 1.0, 1.0),
        EnemyKind::Fast => EnemyStats::plain(0.7, 1.8, 0.6),
        EnemyKind::Tank => EnemyStats::plain(1.5, 0.7, 2.5),
        EnemyKind::Hunter => EnemyStats {
            targets_player: true,
            ..EnemyStats::plain(0.9, 1.3, 1.2)
        },
        EnemyKind::Bomber => EnemyStats::plain(1.2, 0.8, 1.3),
        EnemyKind::Sniper => EnemyStats::plain(0.8, 0.9, 0.7),
        EnemyKind::Teleporter => EnemyStats {
            teleports: true,
            ..EnemyStats::plain(0.85, 1.2, 0.9)
        },
        EnemyKind::Shielded => EnemyStats {
            shielded: true,
            ..EnemyStats::plain(1.1, 0.9, 1.8)
        },
    }
}

/// First wave an archetype can appear on
pub fn unlock_wave(kind: EnemyKind) -> u32 {
    match kind {
        EnemyKind::Basic => 1,
        EnemyKind::Fast => 2,
        EnemyKind::Tank => 3,
        EnemyKind::Hunter => 4,
        EnemyKind::Bomber => 5,
        EnemyKind::Sniper => 7,
        EnemyKind::Teleporter => 9,
        EnemyKind::Shielded => 11,
    }
}

/// Archetypes unlocked at `level`, in unlock order
pub fn available_kinds(level: u32) -> impl Iterator<Item = EnemyKind> {
    EnemyKind::ALL
        .into_iter()
        .filter(move |kind| level >= unlock_wave(*kind))
}

/// Linear difficulty-scaled weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnWeight {
    pub base: f32,
    pub per_difficulty: f32,
}

impl SpawnWeight {
    pub const fn new(base: f32, per_difficulty: f32) -> Self {
        Self {
            base,
            per_difficulty,
        }
    }

    /// Weight at a difficulty, floored at zero
    pub fn at(self, difficulty: f32) -> f32 {
        (self.base + self.per_difficulty * difficulty).max(0.0)
    }
}

pub const ENEMY_WEIGHTS: [(EnemyKind, SpawnWeight); 8] = [
    (EnemyKind::Basic, SpawnWeight::new(100.0, -5.0)),
    (EnemyKind::Fast, SpawnWeight::new(30.0, 5.0)),
    (EnemyKind::Tank, SpawnWeight::new(20.0, 5.0)),
    (EnemyKind::Hunter, SpawnWeight::new(10.0, 7.0)),
    (EnemyKind::Bomber, SpawnWeight::new(5.0, 6.0)),
    (EnemyKind::Sniper, SpawnWeight::new(0.0, 3.0)),
    (EnemyKind::Teleporter, SpawnWeight::new(0.0, 4.0)),
    (EnemyKind::Shielded, SpawnWeight::new(0.0, 6.0)),
];

pub const BEHAVIOR_WEIGHTS: [(Behavior, SpawnWeight); 6] = [
    (Behavior::Direct, SpawnWeight::new(100.0, -5.0)),
    (Behavior::Circling, SpawnWeight::new(20.0, 5.0)),
    (Behavior::Swooping, SpawnWeight::new(10.0, 5.0)),
    (Behavior::Erratic, SpawnWeight::new(5.0, 3.0)),
    (Behavior::Ambush, SpawnWeight::new(0.0, 4.0)),
    (Behavior::Defensive, SpawnWeight::new(0.0, 3.0)),
];

/// Single weighted draw.
///
/// Draws uniformly in `[0, total)` and subtracts weights in order until the
/// remainder is `<= 0`. Zero weights are never chosen. Returns `None` when
/// the total weight is zero.
pub fn weighted_pick<T: Copy, R: Rng + ?Sized>(weighted: &[(T, f32)], rng: &mut R) -> Option<T> {
    let total: f32 = weighted.iter().map(|(_, w)| w.max(0.0)).sum();
    if !(total > 0.0) || !total.is_finite() {
        return None;
    }

    let mut remaining = rng.random::<f32>() * total;
    for &(item, weight) in weighted {
        if weight <= 0.0 {
            continue;
        }
        remaining -= weight;
        if remaining <= 0.0 {
            return Some(item);
        }
    }

    // Float rounding can leave a sliver; the last positive entry owns it
    weighted
        .iter()
        .rev()
        .find(|(_, w)| *w > 0.0)
        .map(|&(item, _)| item)
}

/// Pick an archetype from a weight table, restricted to those unlocked at `level`
pub fn select_enemy_kind_with<R: Rng + ?Sized>(
    table: &[(EnemyKind, SpawnWeight)],
    difficulty: f32,
    level: u32,
    rng: &mut R,
) -> EnemyKind {
    let eligible: Vec<(EnemyKind, f32)> = table
        .iter()
        .filter(|(kind, _)| level >= unlock_wave(*kind))
        .map(|&(kind, weight)| (kind, weight.at(difficulty)))
        .collect();

    weighted_pick(&eligible, rng)
        .or_else(|| eligible.first().map(|&(kind, _)| kind))
        .unwrap_or(EnemyKind::Basic)
}

pub fn select_enemy_kind<R: Rng + ?Sized>(difficulty: f32, level: u32, rng: &mut R) -> EnemyKind {
    select_enemy_kind_with(&ENEMY_WEIGHTS, difficulty, level, rng)
}

/// Pick a behavior from a weight table; falls back to `Direct`
pub fn select_behavior_with<R: Rng + ?Sized>(
    table: &[(Behavior, SpawnWeight)],
    difficulty: f32,
    rng: &mut R,
) -> Behavior {
    let weighted: Vec<(Behavior, f32)> = table
        .iter()
        .map(|&(behavior, weight)| (behavior, weight.at(difficulty)))
        .collect();
    weighted_pick(&weighted, rng).unwrap_or(Behavior::Direct)
}

pub fn select_behavior<R: Rng + ?Sized>(difficulty: f32, rng: &mut R) -> Behavior {
    select_behavior_with(&BEHAVIOR_WEIGHTS, difficulty, rng)
}

/// Small per-level speed bonus, capped at +10%
pub fn level_speed_multiplier(level: u32) -> f32 {
    1.0 + level.saturating_sub(1).min(10) as f32 * 0.01
}

/// Per-level hp bonus, capped at +45%
pub fn level_hp_multiplier(level: u32) -> f32 {
    1.0 + level.saturating_sub(1).min(15) as f32 * 0.03
}

/// Speed cap for an archetype
pub fn max_speed(difficulty: f32, kind: EnemyKind) -> f32 {
    (1.0 + difficulty * 0.2) * stats(kind).speed_mult
}

/// Random point just outside one of the four visible edges
pub fn edge_spawn_point<R: Rng + ?Sized>(bounds: Vec2, offset: f32, rng: &mut R) -> Vec2 {
    match rng.random_range(0..4) {
        0 => Vec2::new(rng.random::<f32>() * bounds.x, -offset),
        1 => Vec2::new(bounds.x + offset, rng.random::<f32>() * bounds.y),
        2 => Vec2::new(rng.random::<f32>() * bounds.x, bounds.y + offset),
        _ => Vec2::new(-offset, rng.random::<f32>() * bounds.y),
    }
}

/// The random inputs of one enemy spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRolls {
    /// [0, 1) position inside the base size range
    pub size: f32,
    /// Speed variation factor, 0.85-1.15
    pub speed: f32,
    /// Initial velocity noise, each axis in [-0.5, 0.5)
    pub noise: Vec2,
}

impl SpawnRolls {
    /// Midpoint size, nominal speed, no noise
    pub const NEUTRAL: SpawnRolls = SpawnRolls {
        size: 0.5,
        speed: 1.0,
        noise: Vec2::ZERO,
    };

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            size: rng.random::<f32>(),
            speed: rng.random::<f32>() * 0.3 + 0.85,
            noise: Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5),
        }
    }
}

/// Everything needed to build one enemy
#[derive(Debug, Clone, Copy)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub behavior: Behavior,
    pub pos: Vec2,
    pub difficulty: f32,
    pub level: u32,
    pub rolls: SpawnRolls,
}

/// Build an enemy aimed at `center`
pub fn build_enemy(id: u32, spawn: &EnemySpawn, center: Vec2, now_ms: f64) -> Actor {
    let stats = stats(spawn.kind);
    let difficulty = spawn.difficulty;
    let to_center = direction_toward(spawn.pos, center).unwrap_or(Vec2::X);

    let base_speed = (1.0 + difficulty * 0.2) * level_speed_multiplier(spawn.level);
    let speed = base_speed * spawn.rolls.speed * stats.speed_mult;

    let mut vel = to_center * speed;
    let floor = MIN_VELOCITY_COMPONENT * speed;
    if vel.x.abs() < floor {
        vel.x = if vel.x >= 0.0 { floor } else { -floor };
    }
    if vel.y.abs() < floor {
        vel.y = if vel.y >= 0.0 { floor } else { -floor };
    }

    let side = perpendicular(to_center);
    let noise = spawn.rolls.noise;
    match spawn.behavior {
        Behavior::Direct => {}
        Behavior::Circling => vel += side * speed * 0.7,
        Behavior::Swooping => vel = to_center * speed * 0.5 + noise * speed,
        Behavior::Erratic => vel = to_center * speed * 0.7 + noise * speed * 1.5,
        Behavior::Ambush => vel = to_center * speed * 0.3,
        Behavior::Defensive => vel = side * speed * 1.2,
    }

    let size = (8.0 + spawn.rolls.size * 8.0) * (1.0 + difficulty * 0.1) * stats.size_mult;
    let base_hp = (size / 3.0).ceil();
    let hp = (base_hp * stats.hp_mult * level_hp_multiplier(spawn.level)).ceil() as i32
        + difficulty.floor() as i32;

    let special = if stats.targets_player {
        EnemySpecial::Hunter { seeking: false }
    } else if stats.teleports {
        EnemySpecial::Teleporter {
            cooldown_ms: TELEPORT_COOLDOWN_MS,
            last_teleport_ms: now_ms,
        }
    } else if stats.shielded {
        EnemySpecial::Shielded { shield_up: true }
    } else {
        EnemySpecial::Plain
    };

    Actor {
        id,
        pos: spawn.pos,
        vel,
        radius: size,
        hp: hp.max(1),
        spawned_ms: now_ms,
        target: Some(center),
        class: ActorClass::Enemy(Enemy {
            kind: spawn.kind,
            behavior: spawn.behavior,
            special,
        }),
    }
}

/// Roll a complete random spawn for the given difficulty and level
pub fn random_spawn<R: Rng + ?Sized>(
    bounds: Vec2,
    difficulty: f32,
    level: u32,
    rng: &mut R,
) -> EnemySpawn {
    let kind = select_enemy_kind(difficulty, level, rng);
    let behavior = select_behavior(difficulty, rng);
    let pos = edge_spawn_point(bounds, SPAWN_BUFFER, rng);
    let rolls = SpawnRolls::random(rng);
    EnemySpawn {
        kind,
        behavior,
        pos,
        difficulty,
        level,
        rolls,
    }
}
