//! Performance governor and explosion pooling
//!
//! The governor keeps a short rolling window of frame durations. When the
//! average climbs past the threshold the match switches to a degraded tier:
//! fewer and smaller explosions, capped splash and no off-screen relocation.
//! Degrading only trades visual/behavioral fidelity; scoring and damage rules
//! never change.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Actor, ActorClass};

/// Frame samples kept in the rolling window
pub const FRAME_WINDOW: usize = 10;
/// Average frame time above which quality degrades (~30 fps)
pub const DEGRADED_FRAME_MS: f64 = 33.0;

/// Explosion lifetime in 60 Hz frames
pub const EXPLOSION_LIFETIME: i32 = 10;
pub const MAX_EXPLOSIONS: usize = 15;
pub const MAX_EXPLOSIONS_DEGRADED: usize = 8;
pub const DEGRADED_EXPLOSION_SIZE: f32 = 12.0;
/// Records the pool retains for reuse
pub const POOL_CAPACITY: usize = 30;
/// Above this many live explosions the renderer should use flat fills
pub const FLAT_RENDER_THRESHOLD: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityTier {
    Full,
    Degraded,
}

/// Render hint for explosion drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderPath {
    Gradient,
    Flat,
}

/// Rolling frame-time monitor
#[derive(Debug, Clone, Default)]
pub struct FrameGovernor {
    samples: VecDeque<f64>,
    degraded: bool,
}

impl FrameGovernor {
    /// Record one inter-frame duration and re-evaluate the tier
    pub fn record(&mut self, frame_ms: f64) {
        if !frame_ms.is_finite() || frame_ms < 0.0 {
            return;
        }
        self.samples.push_back(frame_ms);
        while self.samples.len() > FRAME_WINDOW {
            self.samples.pop_front();
        }

        let degraded = self.average_ms() > DEGRADED_FRAME_MS;
        if degraded != self.degraded {
            self.degraded = degraded;
            log::info!(
                "quality tier -> {:?} (avg frame {:.1} ms)",
                self.tier(),
                self.average_ms()
            );
        }
    }

    /// Mean of the window, 0 when empty
    pub fn average_ms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn tier(&self) -> QualityTier {
        if self.degraded {
            QualityTier::Degraded
        } else {
            QualityTier::Full
        }
    }

    pub fn render_path(&self, explosion_count: usize) -> RenderPath {
        if self.degraded || explosion_count > FLAT_RENDER_THRESHOLD {
            RenderPath::Flat
        } else {
            RenderPath::Gradient
        }
    }
}

/// Recycles explosion records and enforces the live cap
#[derive(Debug, Clone, Default)]
pub struct ExplosionPool {
    free: Vec<Actor>,
    active: usize,
}

impl ExplosionPool {
    /// Take a record from the pool (or allocate) and reset it.
    ///
    /// Returns `None` when the live cap for the current tier is reached.
    pub fn spawn(
        &mut self,
        id: u32,
        pos: Vec2,
        size: f32,
        degraded: bool,
        now_ms: f64,
    ) -> Option<Actor> {
        let cap = if degraded {
            MAX_EXPLOSIONS_DEGRADED
        } else {
            MAX_EXPLOSIONS
        };
        if self.active >= cap {
            log::trace!("explosion cap {cap} reached");
            return None;
        }

        let radius = if degraded {
            size.min(DEGRADED_EXPLOSION_SIZE)
        } else {
            size
        };
        let mut actor = self.free.pop().unwrap_or_else(|| blank_explosion(id));
        actor.id = id;
        actor.pos = pos;
        actor.vel = Vec2::ZERO;
        actor.radius = radius;
        actor.hp = EXPLOSION_LIFETIME;
        actor.spawned_ms = now_ms;
        actor.target = None;
        actor.class = ActorClass::Explosion {
            duration: EXPLOSION_LIFETIME,
        };
        self.active += 1;
        Some(actor)
    }

    /// Return a finished explosion to the pool
    pub fn recycle(&mut self, actor: Actor) {
        if !actor.is_explosion() {
            return;
        }
        self.active = self.active.saturating_sub(1);
        if self.free.len() < POOL_CAPACITY {
            self.free.push(actor);
        }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn pooled(&self) -> usize {
        self.free.len()
    }
}

fn blank_explosion(id: u32) -> Actor {
    Actor {
        id,
        pos: Vec2::ZERO,
        vel: Vec2::ZERO,
        radius: 0.0,
        hp: 0,
        spawned_ms: 0.0,
        target: None,
        class: ActorClass::Explosion { duration: 0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_switches_on_rolling_average() {
        let mut governor = FrameGovernor::default();
        for _ in 0..FRAME_WINDOW {
            governor.record(16.0);
        }
        assert_eq!(governor.tier(), QualityTier::Full);

        for _ in 0..FRAME_WINDOW {
            governor.record(50.0);
        }
        assert!(governor.is_degraded());
        assert_eq!(governor.render_path(0), RenderPath::Flat);

        for _ in 0..FRAME_WINDOW {
            governor.record(16.0);
        }
        assert!(!governor.is_degraded());
    }

    #[test]
    fn test_window_is_bounded() {
        let mut governor = FrameGovernor::default();
        governor.record(1000.0);
        for _ in 0..FRAME_WINDOW {
            governor.record(10.0);
        }
        assert_eq!(governor.average_ms(), 10.0);
    }

    #[test]
    fn test_flat_render_with_many_explosions() {
        let governor = FrameGovernor::default();
        assert_eq!(governor.render_path(20), RenderPath::Gradient);
        assert_eq!(governor.render_path(21), RenderPath::Flat);
    }

    #[test]
    fn test_pool_caps_and_resets() {
        let mut pool = ExplosionPool::default();
        let mut live = Vec::new();
        for id in 0..MAX_EXPLOSIONS as u32 {
            live.push(pool.spawn(id, Vec2::ZERO, 30.0, false, 0.0).unwrap());
        }
        assert!(pool.spawn(99, Vec2::ZERO, 30.0, false, 0.0).is_none());

        let mut spent = live.pop().unwrap();
        spent.hp = 0;
        spent.pos = Vec2::new(5.0, 5.0);
        pool.recycle(spent);
        assert_eq!(pool.pooled(), 1);

        // 14 live explosions exceed the degraded cap
        assert!(pool.spawn(100, Vec2::ZERO, 40.0, true, 500.0).is_none());

        let reused = pool.spawn(100, Vec2::new(1.0, 2.0), 40.0, false, 500.0).unwrap();
        assert_eq!(reused.id, 100);
        assert_eq!(reused.pos, Vec2::new(1.0, 2.0));
        assert_eq!(reused.hp, EXPLOSION_LIFETIME);
        assert_eq!(reused.radius, 40.0);
        assert_eq!(pool.pooled(), 0);
    }

    #[test]
    fn test_degraded_size_cap() {
        let mut pool = ExplosionPool::default();
        let actor = pool.spawn(1, Vec2::ZERO, 40.0, true, 0.0).unwrap();
        assert_eq!(actor.radius, DEGRADED_EXPLOSION_SIZE);
    }
}
