//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick`
//! - Seeded RNG only (carried on `GameState`)
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod behavior;
pub mod catalog;
pub mod collision;
pub mod director;
pub mod governor;
pub mod powerups;
pub mod schedule;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{circles_overlap, collides};
pub use governor::{ExplosionPool, FrameGovernor, QualityTier, RenderPath};
pub use powerups::ActiveEffects;
pub use snapshot::{GameOverPayload, Snapshot};
pub use state::{
    Actor, ActorClass, Behavior, Enemy, EnemyKind, EnemySpecial, GameEvent, GamePhase, GameState,
    KillCause, Obelisk, Player, PowerupKind, ProjectileKind,
};
pub use tick::{TickInput, fire_projectile, tick};
