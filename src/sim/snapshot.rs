//! Read-only view of a match for the render collaborator

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::governor::{QualityTier, RenderPath};
use super::state::{Actor, ActorClass, EnemyKind, GamePhase, GameState, PowerupKind, ProjectileKind};

/// Draw intent for one actor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActorView {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub color: u32,
}

impl From<&Actor> for ActorView {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            pos: actor.pos,
            radius: actor.radius,
            color: actor.color(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnemyView {
    #[serde(flatten)]
    pub actor: ActorView,
    pub kind: EnemyKind,
    pub hp: i32,
    pub target: Option<Vec2>,
    pub shielded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectileView {
    #[serde(flatten)]
    pub actor: ActorView,
    pub kind: ProjectileKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExplosionView {
    #[serde(flatten)]
    pub actor: ActorView,
    /// Remaining lifetime in [0, 1]; the drawn size scales with it
    pub life: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PickupView {
    #[serde(flatten)]
    pub actor: ActorView,
    pub kind: PowerupKind,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectView {
    pub kind: PowerupKind,
    pub remaining_ms: f64,
}

/// Everything the renderer needs for one frame, live actors in id order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub wave: u32,
    pub obelisk_health: f32,
    pub obelisk_pos: Vec2,
    pub obelisk_radius: f32,
    pub player_pos: Vec2,
    pub player_radius: f32,
    pub player_angle: f32,
    pub special_ammo: u8,
    pub ammo_cap: u8,
    pub effects: Vec<EffectView>,
    pub quality: QualityTier,
    pub render_path: RenderPath,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub explosions: Vec<ExplosionView>,
    pub pickups: Vec<PickupView>,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let mut enemies = Vec::new();
        let mut projectiles = Vec::new();
        let mut explosions = Vec::new();
        let mut pickups = Vec::new();

        for actor in state.actors.iter().filter(|a| a.is_alive()) {
            let view = ActorView::from(actor);
            match actor.class {
                ActorClass::Enemy(enemy) => enemies.push(EnemyView {
                    actor: view,
                    kind: enemy.kind,
                    hp: actor.hp,
                    target: actor.target,
                    shielded: enemy.is_shielded(),
                }),
                ActorClass::Projectile(kind) => projectiles.push(ProjectileView { actor: view, kind }),
                ActorClass::Explosion { duration } => {
                    let life = if duration > 0 {
                        (actor.hp as f32 / duration as f32).clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                    explosions.push(ExplosionView {
                        actor: ActorView {
                            radius: actor.radius * life,
                            ..view
                        },
                        life,
                    });
                }
                ActorClass::Powerup(kind) => pickups.push(PickupView {
                    actor: view,
                    kind,
                    icon: kind.icon(),
                }),
            }
        }

        Self {
            phase: state.phase,
            score: state.score,
            wave: state.wave.number,
            obelisk_health: state.obelisk.health,
            obelisk_pos: state.obelisk.pos,
            obelisk_radius: state.obelisk.radius,
            player_pos: state.player.pos,
            player_radius: state.player.radius,
            player_angle: state.player.angle,
            special_ammo: state.player.special_ammo,
            ammo_cap: state.player.ammo_cap,
            effects: state
                .effects
                .running(state.now_ms)
                .into_iter()
                .map(|(kind, remaining_ms)| EffectView { kind, remaining_ms })
                .collect(),
            quality: state.governor.tier(),
            render_path: state.governor.render_path(explosions.len()),
            enemies,
            projectiles,
            explosions,
            pickups,
        }
    }
}

/// Terminal payload sent to the host when the obelisk falls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverPayload {
    pub score: u64,
}

impl GameOverPayload {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_snapshot_groups_by_kind() {
        let mut state = GameState::new(&Settings::default());
        let id = state.next_entity_id();
        let explosion = state.explosions.spawn(id, Vec2::new(10.0, 10.0), 20.0, false, 0.0);
        state.actors.extend(explosion);
        if let Some(explosion) = state.actors.last_mut() {
            explosion.hp = 5;
        }

        let snapshot = Snapshot::capture(&state);
        assert_eq!(snapshot.enemies.len(), 10);
        assert_eq!(snapshot.explosions.len(), 1);
        assert_eq!(snapshot.explosions[0].actor.radius, 10.0);
        assert_eq!(snapshot.render_path, RenderPath::Gradient);
        assert_eq!(snapshot.obelisk_health, 100.0);

        let ids: Vec<u32> = snapshot.enemies.iter().map(|e| e.actor.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_game_over_payload_json() {
        let payload = GameOverPayload { score: 1234 };
        assert_eq!(payload.to_json().unwrap(), r#"{"score":1234}"#);
    }
}
