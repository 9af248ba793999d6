//! Match session: frame clock, restart/teardown and event delivery
//!
//! The host calls [`Session::frame`] from its animation callback with a
//! timestamp. The session turns timestamps into frame deltas and hands the
//! render snapshot plus drained events back to the caller.

use crate::consts::FRAME_MS;
use crate::settings::{HostOverrides, Settings};
use crate::sim::{GameEvent, GameOverPayload, GameState, Snapshot, TickInput, tick};

/// Result of one frame
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub snapshot: Snapshot,
    pub events: Vec<GameEvent>,
    /// Set on the frame the obelisk falls
    pub game_over: Option<GameOverPayload>,
}

/// One running match
#[derive(Debug, Clone)]
pub struct Session {
    settings: Settings,
    state: GameState,
    /// Timestamp of the previous frame; `None` right after start/restart
    last_frame_ms: Option<f64>,
    running: bool,
    restarts: u64,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        let settings = settings.clamped();
        log::info!(
            "session start: difficulty {} seed {:#x}",
            settings.difficulty,
            settings.seed
        );
        Self {
            state: GameState::new(&settings),
            settings,
            last_frame_ms: None,
            running: true,
            restarts: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance one animation frame stamped `timestamp_ms`
    pub fn frame(&mut self, timestamp_ms: f64, input: &TickInput) -> FrameOutput {
        if self.running {
            let delta = match self.last_frame_ms {
                Some(last) => timestamp_ms - last,
                None => FRAME_MS,
            };
            self.last_frame_ms = Some(timestamp_ms);
            tick(&mut self.state, input, delta);
        }

        let events = self.state.drain_events();
        let game_over = events.iter().find_map(|event| match event {
            GameEvent::GameOver { score } => Some(GameOverPayload { score: *score }),
            _ => None,
        });
        if game_over.is_some() {
            self.running = false;
        }

        FrameOutput {
            snapshot: Snapshot::capture(&self.state),
            events,
            game_over,
        }
    }

    /// Tear down the current match and start a fresh one.
    ///
    /// Pending timers are cancelled and the frame clock is reset so the next
    /// frame does not span the idle gap.
    pub fn restart(&mut self) {
        self.state.timers.cancel_all();
        self.last_frame_ms = None;
        self.restarts += 1;

        let settings = Settings {
            seed: self.settings.seed.wrapping_add(self.restarts),
            ..self.settings.clone()
        };
        self.state = GameState::new(&settings);
        self.running = true;
        log::info!("session restarted (seed {:#x})", settings.seed);
    }

    /// Stop scheduling frames; the state is kept for display
    pub fn stop(&mut self) {
        self.running = false;
        self.last_frame_ms = None;
        self.state.timers.cancel_all();
    }

    pub fn apply_overrides(&mut self, overrides: &HostOverrides) {
        log::debug!("host overrides: {overrides:?}");
        self.state.apply_overrides(overrides);
    }

    pub fn set_difficulty(&mut self, difficulty: f32) {
        self.state.set_difficulty(difficulty);
        self.settings.difficulty = self.state.difficulty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_FRAME_DT_MS;
    use crate::sim::GamePhase;

    fn quiet() -> Settings {
        Settings {
            initial_enemies: 0,
            min_enemies: 0,
            ..Settings::default()
        }
    }

    #[test]
    fn test_frame_deltas_from_timestamps() {
        let mut session = Session::new(quiet());
        let input = TickInput::default();

        session.frame(1000.0, &input);
        assert!((session.state().now_ms - FRAME_MS).abs() < 1e-9);

        session.frame(1010.0, &input);
        assert!((session.state().now_ms - (FRAME_MS + 10.0)).abs() < 1e-9);

        // A long gap is clamped
        session.frame(9000.0, &input);
        assert!((session.state().now_ms - (FRAME_MS + 10.0 + MAX_FRAME_DT_MS)).abs() < 1e-9);
    }

    #[test]
    fn test_restart_resets_clock_and_state() {
        let mut session = Session::new(Settings::default());
        let input = TickInput::default();
        for i in 0..30 {
            session.frame(i as f64 * 16.0, &input);
        }
        session.restart();
        assert_eq!(session.state().now_ms, 0.0);
        assert_eq!(session.state().score, 0);
        assert_eq!(session.state().timers.pending_count(), 0);

        // First frame after restart does not span the gap
        session.frame(1_000_000.0, &input);
        assert!((session.state().now_ms - FRAME_MS).abs() < 1e-9);
    }

    #[test]
    fn test_game_over_payload_delivered_once() {
        let mut session = Session::new(quiet());
        session.apply_overrides(&HostOverrides {
            wave: None,
            obelisk_health: Some(0.0),
        });

        let out = session.frame(0.0, &TickInput::default());
        assert_eq!(out.game_over, Some(GameOverPayload { score: 0 }));
        assert_eq!(out.snapshot.phase, GamePhase::GameOver);
        assert!(!session.is_running());

        let out = session.frame(16.0, &TickInput::default());
        assert!(out.game_over.is_none());
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_stop_freezes_match() {
        let mut session = Session::new(quiet());
        session.frame(0.0, &TickInput::default());
        let t = session.state().now_ms;
        session.stop();
        session.frame(16.0, &TickInput::default());
        assert_eq!(session.state().now_ms, t);
    }
}
