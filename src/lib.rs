//! Obelisk Defense - simulation and combat engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (actors, steering, collisions, waves, effects)
//! - `session`: Match lifecycle around the simulation (frame clock, restart, events)
//! - `settings`: Host-supplied configuration and overrides
//!
//! Drawing, input capture, audio and persistence live outside this crate. The
//! engine consumes plain input values each frame and emits a [`sim::Snapshot`]
//! plus discrete [`sim::GameEvent`]s.

pub mod session;
pub mod settings;
pub mod sim;

pub use session::{FrameOutput, Session};
pub use settings::{HostOverrides, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Reference frame length; velocities are expressed in pixels per 60 Hz frame
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Upper bound on a single simulation step (stalled/backgrounded frames)
    pub const MAX_FRAME_DT_MS: f64 = 33.0;

    /// Default arena dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Obelisk defaults
    pub const OBELISK_RADIUS: f32 = 30.0;
    pub const OBELISK_MAX_HEALTH: f32 = 100.0;

    /// Player avatar defaults
    pub const PLAYER_RADIUS: f32 = 15.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    /// Spawn offset below the obelisk
    pub const PLAYER_START_OFFSET: f32 = 100.0;
    /// Milliseconds between regular shots
    pub const PLAYER_FIRE_RATE_MS: u32 = 200;
    pub const SPECIAL_AMMO_CAP: u8 = 3;
    pub const SPECIAL_AMMO_REFILL_MS: f64 = 10_000.0;
    /// Distance the pointer must be away before the avatar moves
    pub const PLAYER_DEADZONE: f32 = 5.0;
    /// Arena edge padding for the avatar
    pub const PLAYER_PADDING: f32 = 20.0;
    /// Max avatar distance from the obelisk as a fraction of min(width, height)
    pub const PLAYER_LEASH: f32 = 0.4;

    /// Projectile defaults
    pub const REGULAR_SHOT_SPEED: f32 = 8.0;
    pub const REGULAR_SHOT_RADIUS: f32 = 4.0;
    pub const REGULAR_SHOT_DAMAGE: i32 = 1;
    pub const SPECIAL_SHOT_SPEED: f32 = 5.0;
    pub const SPECIAL_SHOT_RADIUS: f32 = 10.0;
    pub const SPECIAL_SHOT_DAMAGE: i32 = 5;
    /// Special shots wait this many fire-rate intervals
    pub const SPECIAL_SHOT_COOLDOWN_FACTOR: u32 = 3;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Unit vector from `from` toward `to`, or `None` when the points coincide
#[inline]
pub fn direction_toward(from: Vec2, to: Vec2) -> Option<Vec2> {
    let delta = to - from;
    let len_sq = delta.length_squared();
    if len_sq <= f32::EPSILON || !len_sq.is_finite() {
        return None;
    }
    Some(delta / len_sq.sqrt())
}

/// Perpendicular (counter-clockwise) of a direction
#[inline]
pub fn perpendicular(dir: Vec2) -> Vec2 {
    Vec2::new(-dir.y, dir.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_toward_degenerate() {
        assert!(direction_toward(Vec2::new(3.0, 4.0), Vec2::new(3.0, 4.0)).is_none());
        let dir = direction_toward(Vec2::ZERO, Vec2::new(3.0, 4.0)).unwrap();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!((dir.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_perpendicular() {
        let p = perpendicular(Vec2::new(1.0, 0.0));
        assert_eq!(p, Vec2::new(0.0, 1.0));
    }
}
