//! Game state and core simulation types
//!
//! Every simulated actor shares one data shape ([`Actor`]); kind-specific
//! state rides in the [`ActorClass`] payload so each variant's extra fields are
//! checked at compile time.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::director::{self, WaveState};
use super::governor::{ExplosionPool, FrameGovernor};
use super::powerups::ActiveEffects;
use super::schedule::Timers;
use crate::consts::*;
use crate::settings::{HostOverrides, Settings, clamp_difficulty};

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Simulation frozen, clock does not advance
    Paused,
    /// Obelisk destroyed
    GameOver,
}

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Tank,
    Hunter,
    Bomber,
    Sniper,
    Teleporter,
    Shielded,
}

impl EnemyKind {
    /// All kinds in unlock order
    pub const ALL: [EnemyKind; 8] = [
        EnemyKind::Basic,
        EnemyKind::Fast,
        EnemyKind::Tank,
        EnemyKind::Hunter,
        EnemyKind::Bomber,
        EnemyKind::Sniper,
        EnemyKind::Teleporter,
        EnemyKind::Shielded,
    ];

    /// Display color (0xRRGGBB), a render hint only
    pub fn color(self) -> u32 {
        match self {
            EnemyKind::Basic => 0xEF4444,
            EnemyKind::Fast => 0xF97316,
            EnemyKind::Tank => 0x6366F1,
            EnemyKind::Hunter => 0xEC4899,
            EnemyKind::Bomber => 0x10B981,
            EnemyKind::Sniper => 0x8B5CF6,
            EnemyKind::Teleporter => 0x3B82F6,
            EnemyKind::Shielded => 0xA3A3A3,
        }
    }
}

/// Steering strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    Direct,
    Circling,
    Swooping,
    Erratic,
    Ambush,
    Defensive,
}

impl Behavior {
    pub const ALL: [Behavior; 6] = [
        Behavior::Direct,
        Behavior::Circling,
        Behavior::Swooping,
        Behavior::Erratic,
        Behavior::Ambush,
        Behavior::Defensive,
    ];
}

/// Per-archetype mutable state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemySpecial {
    /// No extra state
    Plain,
    /// Locks onto the player when close enough
    Hunter { seeking: bool },
    /// Relocates on a fixed cooldown
    Teleporter { cooldown_ms: f64, last_teleport_ms: f64 },
    /// Takes reduced damage and deals reduced obelisk damage
    Shielded { shield_up: bool },
}

/// Enemy payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub behavior: Behavior,
    pub special: EnemySpecial,
}

impl Enemy {
    pub fn is_shielded(&self) -> bool {
        matches!(self.special, EnemySpecial::Shielded { shield_up: true })
    }

    pub fn targets_player(&self) -> bool {
        matches!(self.special, EnemySpecial::Hunter { .. })
    }
}

/// Projectile variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Regular,
    Special,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    Shield,
    RapidFire,
    InfiniteSpecial,
    HealthPack,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 4] = [
        PowerupKind::Shield,
        PowerupKind::RapidFire,
        PowerupKind::InfiniteSpecial,
        PowerupKind::HealthPack,
    ];

    pub fn color(self) -> u32 {
        match self {
            PowerupKind::Shield => 0x38BDF8,
            PowerupKind::RapidFire => 0x4ADE80,
            PowerupKind::InfiniteSpecial => 0xA78BFA,
            PowerupKind::HealthPack => 0xFB7185,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            PowerupKind::Shield => "🛡️",
            PowerupKind::RapidFire => "🔥",
            PowerupKind::InfiniteSpecial => "⚡",
            PowerupKind::HealthPack => "❤️",
        }
    }
}

/// Kind tag plus kind-specific payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActorClass {
    Enemy(Enemy),
    Projectile(ProjectileKind),
    /// `duration` is the lifetime the explosion started with (frames)
    Explosion { duration: i32 },
    Powerup(PowerupKind),
}

/// A simulated actor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: u32,
    pub pos: Vec2,
    /// Pixels per 60 Hz frame
    pub vel: Vec2,
    pub radius: f32,
    /// Hit points; remaining lifetime in frames for explosions
    pub hp: i32,
    pub spawned_ms: f64,
    /// Current steering target (render/AI hint)
    pub target: Option<Vec2>,
    pub class: ActorClass,
}

impl Actor {
    /// Logically alive (may not have been compacted out yet)
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Identity comparison
    #[inline]
    pub fn same_actor(&self, other: &Actor) -> bool {
        self.id == other.id
    }

    pub fn enemy(&self) -> Option<&Enemy> {
        match &self.class {
            ActorClass::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn enemy_mut(&mut self) -> Option<&mut Enemy> {
        match &mut self.class {
            ActorClass::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.class, ActorClass::Enemy(_))
    }

    pub fn is_projectile(&self) -> bool {
        matches!(self.class, ActorClass::Projectile(_))
    }

    pub fn is_explosion(&self) -> bool {
        matches!(self.class, ActorClass::Explosion { .. })
    }

    pub fn powerup_kind(&self) -> Option<PowerupKind> {
        match self.class {
            ActorClass::Powerup(kind) => Some(kind),
            _ => None,
        }
    }

    /// Display color derived from the class
    pub fn color(&self) -> u32 {
        match self.class {
            ActorClass::Enemy(enemy) => enemy.kind.color(),
            ActorClass::Projectile(ProjectileKind::Regular) => 0x60A5FA,
            ActorClass::Projectile(ProjectileKind::Special) => 0x8B5CF6,
            ActorClass::Explosion { .. } => 0xF59E0B,
            ActorClass::Powerup(kind) => kind.color(),
        }
    }
}

/// The player's avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    /// Facing angle (radians)
    pub angle: f32,
    /// Pixels per 60 Hz frame
    pub speed: f32,
    /// Milliseconds between regular shots
    pub fire_rate_ms: u32,
    pub last_shot_ms: f64,
    pub special_ammo: u8,
    pub ammo_cap: u8,
    pub last_refill_ms: f64,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            radius: PLAYER_RADIUS,
            angle: 0.0,
            speed: PLAYER_SPEED,
            fire_rate_ms: PLAYER_FIRE_RATE_MS,
            last_shot_ms: f64::NEG_INFINITY,
            special_ammo: SPECIAL_AMMO_CAP,
            ammo_cap: SPECIAL_AMMO_CAP,
            last_refill_ms: 0.0,
        }
    }
}

/// The defended structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obelisk {
    pub pos: Vec2,
    pub radius: f32,
    /// Percentage health in [0, 100]
    pub health: f32,
}

impl Obelisk {
    pub fn damage(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(OBELISK_MAX_HEALTH);
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }
}

/// Why an enemy died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillCause {
    Obelisk,
    Player,
    Projectile,
    Splash,
}

/// Discrete events for audio/persistence collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemyKilled { id: u32, kind: EnemyKind, cause: KillCause },
    ObeliskHit { damage: f32 },
    PlayerHit { damage: f32 },
    WaveStarted { wave: u32 },
    PowerupCollected { kind: PowerupKind },
    EffectExpired { kind: PowerupKind },
    GameOver { score: u64 },
}

/// Complete simulation state for one match
#[derive(Debug, Clone)]
pub struct GameState {
    /// Difficulty scalar (1-10)
    pub difficulty: f32,
    /// Visible play area (top-left origin)
    pub bounds: Vec2,
    /// Simulation clock (ms since match start)
    pub now_ms: f64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub score: u64,
    pub player: Player,
    pub obelisk: Obelisk,
    pub wave: WaveState,
    /// Live actors, ascending id order
    pub actors: Vec<Actor>,
    pub effects: ActiveEffects,
    pub governor: FrameGovernor,
    pub explosions: ExplosionPool,
    pub timers: Timers,
    /// Population floor kept by the director
    pub min_enemies: u32,
    pub powerup_drop_chance: f32,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a fresh match from settings and spawn the opening enemies
    pub fn new(settings: &Settings) -> Self {
        let settings = settings.clone().clamped();
        let bounds = Vec2::new(settings.arena_width, settings.arena_height);
        let center = bounds * 0.5;

        let mut state = Self {
            difficulty: settings.difficulty,
            bounds,
            now_ms: 0.0,
            rng: Pcg32::seed_from_u64(settings.seed),
            phase: GamePhase::Playing,
            score: 0,
            player: Player::new(center + Vec2::new(0.0, PLAYER_START_OFFSET)),
            obelisk: Obelisk {
                pos: center,
                radius: OBELISK_RADIUS,
                health: settings.starting_health,
            },
            wave: WaveState::new(settings.starting_wave, settings.difficulty, 0.0),
            actors: Vec::new(),
            effects: ActiveEffects::default(),
            governor: FrameGovernor::default(),
            explosions: ExplosionPool::default(),
            timers: Timers::new(0.0),
            min_enemies: settings.min_enemies,
            powerup_drop_chance: settings.powerup_drop_chance,
            events: Vec::new(),
            next_id: 1,
        };

        for _ in 0..settings.initial_enemies {
            director::spawn_enemy(&mut state);
        }

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Center of the play area
    pub fn center(&self) -> Vec2 {
        self.bounds * 0.5
    }

    pub fn enemy_count(&self) -> usize {
        self.actors
            .iter()
            .filter(|a| a.is_enemy() && a.is_alive())
            .count()
    }

    /// Look up a live actor by id
    pub fn actor(&self, id: u32) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id && a.is_alive())
    }

    pub fn is_degraded(&self) -> bool {
        self.governor.is_degraded()
    }

    pub fn add_score(&mut self, points: f32) {
        self.score += points.max(0.0).round() as u64;
    }

    /// Apply host-pushed wave/health overrides (clamped)
    pub fn apply_overrides(&mut self, overrides: &HostOverrides) {
        if let Some(wave) = overrides.wave {
            self.wave = WaveState::new(wave.max(1), self.difficulty, self.now_ms);
        }
        if let Some(health) = overrides.obelisk_health.filter(|h| h.is_finite()) {
            self.obelisk.health = health.clamp(0.0, OBELISK_MAX_HEALTH);
        }
    }

    /// Change difficulty mid-match (clamped)
    pub fn set_difficulty(&mut self, difficulty: f32) {
        self.difficulty = clamp_difficulty(difficulty);
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
