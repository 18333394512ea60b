//! The four head-to-head games
//!
//! Each game is a [`Simulation`]: it registers its entities with the
//! [`Engine`], applies its own collision and scoring rules once per frame
//! after the engine has moved everything, and draws an overlay on top.
//! The orchestrator drives the active one through [`SimulationHook`].

pub mod air_hockey;
pub mod breakout;
pub mod pong;
pub mod tanks;

pub use air_hockey::AirHockey;
pub use breakout::Breakout;
pub use pong::Pong;
pub use tanks::TankBattle;

pub use crate::sim::Player;

use std::fmt;
use std::str::FromStr;

use glam::Vec2;

use crate::error::ArcadeError;
use crate::geometry::Rect;
use crate::input::InputSurface;
use crate::renderer::{Canvas, Font, colors};
use crate::settings::Settings;
use crate::sim::{Ball, Engine, EntityId, FrameHook, SimEvent};

/// Lifecycle every game implements
pub trait Simulation {
    fn kind(&self) -> GameKind;

    /// Register entities and serve; called once on a fresh engine
    fn init(&mut self, engine: &mut Engine, settings: &Settings);

    /// Apply game rules for the frame just stepped (Δt from `engine.delta()`).
    /// No-op once the match is over.
    fn update(&mut self, engine: &mut Engine, input: &dyn InputSurface);

    /// Overlay drawn after entities and particles
    fn render(&self, engine: &Engine, canvas: &mut dyn Canvas);

    /// Zero the scores and put everything back at its spawn point
    fn restart(&mut self, engine: &mut Engine);

    /// Deregister every owned entity; safe to call more than once
    fn cleanup(&mut self, engine: &mut Engine);

    /// Re-derive sizes and speeds without touching positions or scores
    fn update_settings(&mut self, engine: &mut Engine, settings: &Settings);

    fn scores(&self) -> Scoreboard;
    fn is_game_over(&self) -> bool;
    fn winner(&self) -> Option<Player>;
}

/// Selectable game types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    Pong,
    AirHockey,
    Breakout,
    Tanks,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::Pong,
        GameKind::AirHockey,
        GameKind::Breakout,
        GameKind::Tanks,
    ];

    /// Name used by the UI shell and as the high-score key
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Pong => "pong",
            GameKind::AirHockey => "airhockey",
            GameKind::Breakout => "breakout",
            GameKind::Tanks => "tanks",
        }
    }

    /// `seed` drives serve directions; Tank Battle has no randomness
    pub fn create(&self, seed: u64) -> Box<dyn Simulation> {
        match self {
            GameKind::Pong => Box::new(Pong::new(seed)),
            GameKind::AirHockey => Box::new(AirHockey::new(seed)),
            GameKind::Breakout => Box::new(Breakout::new(seed)),
            GameKind::Tanks => Box::new(TankBattle::new()),
        }
    }
}

impl FromStr for GameKind {
    type Err = ArcadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ArcadeError::UnknownGame(s.to_string()))
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scoreboard {
    pub player_one: u32,
    pub player_two: u32,
}

impl Scoreboard {
    pub fn get(&self, player: Player) -> u32 {
        match player {
            Player::One => self.player_one,
            Player::Two => self.player_two,
        }
    }

    pub fn award(&mut self, player: Player, points: u32) {
        match player {
            Player::One => self.player_one += points,
            Player::Two => self.player_two += points,
        }
    }

    /// First player (one checked before two) at or past `target`
    pub fn reached(&self, target: u32) -> Option<Player> {
        if self.player_one >= target {
            Some(Player::One)
        } else if self.player_two >= target {
            Some(Player::Two)
        } else {
            None
        }
    }

    /// Player with fewer points, if anyone is behind
    pub fn trailing(&self) -> Option<Player> {
        match self.player_one.cmp(&self.player_two) {
            std::cmp::Ordering::Less => Some(Player::One),
            std::cmp::Ordering::Greater => Some(Player::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Scores plus the sticky game-over flag shared by every game
#[derive(Debug, Clone, Default)]
pub struct MatchState {
    scores: Scoreboard,
    winner: Option<Player>,
}

impl MatchState {
    pub fn scores(&self) -> Scoreboard {
        self.scores
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Add points and report the new totals
    pub fn award(&mut self, engine: &mut Engine, player: Player, points: u32) {
        self.scores.award(player, points);
        log::debug!(
            "Score {}:{}",
            self.scores.player_one,
            self.scores.player_two
        );
        engine.emit(SimEvent::Score {
            player_one: self.scores.player_one,
            player_two: self.scores.player_two,
        });
    }

    /// End the match. Only the first call has any effect.
    pub fn finish(&mut self, engine: &mut Engine, winner: Player) -> bool {
        if self.winner.is_some() {
            return false;
        }
        self.winner = Some(winner);
        log::info!("Player {} wins", winner.number());
        engine.emit(SimEvent::GameOver { winner });
        true
    }

    pub fn reset(&mut self, engine: &mut Engine) {
        *self = Self::default();
        engine.emit(SimEvent::Score {
            player_one: 0,
            player_two: 0,
        });
    }
}

/// Adapts the active game to the engine's frame hook slot
pub struct SimulationHook<'a> {
    sim: &'a mut dyn Simulation,
    input: &'a dyn InputSurface,
}

impl<'a> SimulationHook<'a> {
    pub fn new(sim: &'a mut dyn Simulation, input: &'a dyn InputSurface) -> Self {
        Self { sim, input }
    }
}

impl FrameHook for SimulationHook<'_> {
    fn update(&mut self, engine: &mut Engine) {
        self.sim.update(engine, self.input);
    }

    fn render(&self, engine: &Engine, canvas: &mut dyn Canvas) {
        self.sim.render(engine, canvas);
    }
}

/// Dimmed full-screen "Player N Wins!" banner
pub fn draw_winner_banner(
    canvas: &mut dyn Canvas,
    viewport: Vec2,
    winner: Player,
    subtitle: Option<&str>,
) {
    let center = viewport / 2.0;
    canvas.fill_rect(Rect::new(0.0, 0.0, viewport.x, viewport.y), colors::SHADE);
    canvas.text(
        &format!("Player {} Wins!", winner.number()),
        center,
        Font::bold(48.0),
        colors::WHITE,
    );
    let prompt_y = match subtitle {
        Some(line) => {
            canvas.text(line, center + Vec2::new(0.0, 40.0), Font::regular(24.0), colors::WHITE);
            80.0
        }
        None => 50.0,
    };
    canvas.text(
        "Tap to continue",
        center + Vec2::new(0.0, prompt_y),
        Font::regular(24.0),
        colors::WHITE,
    );
}

pub(crate) fn ball_mut(engine: &mut Engine, id: EntityId) -> Option<&mut Ball> {
    engine.get_mut(id)?.as_ball_mut()
}

pub(crate) fn ball_ref(engine: &Engine, id: EntityId) -> Option<&Ball> {
    engine.get(id)?.as_ball()
}

/// Seconds per simulated frame in scenario tests
#[cfg(test)]
pub(crate) const TEST_DT: f32 = 1.0 / 60.0;

/// Empty pointer list
#[cfg(test)]
pub(crate) fn no_input() -> Vec<crate::input::Pointer> {
    Vec::new()
}

/// Step `engine` with `sim` hooked in for `frames` frames of `TEST_DT`
#[cfg(test)]
pub(crate) fn run_frames(
    engine: &mut Engine,
    sim: &mut dyn Simulation,
    input: &dyn InputSurface,
    frames: usize,
) {
    for _ in 0..frames {
        let mut hook = SimulationHook::new(&mut *sim, input);
        engine.step(TEST_DT, Some(&mut hook));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::CommandBuffer;

    #[test]
    fn test_game_names() {
        for kind in GameKind::ALL {
            assert_eq!(kind.as_str().parse::<GameKind>().unwrap(), kind);
            assert_eq!(kind.create(1).kind(), kind);
        }
        assert!(matches!(
            "chess".parse::<GameKind>(),
            Err(ArcadeError::UnknownGame(name)) if name == "chess"
        ));
    }

    #[test]
    fn test_scoreboard_helpers() {
        let mut s = Scoreboard::default();
        assert_eq!(s.trailing(), None);
        s.award(Player::Two, 3);
        assert_eq!(s.trailing(), Some(Player::One));
        assert_eq!(s.reached(3), Some(Player::Two));
        assert_eq!(s.reached(4), None);
        assert_eq!(s.get(Player::Two), 3);
    }

    #[test]
    fn test_winner_set_once() {
        let mut engine = Engine::new(Vec2::new(800.0, 400.0), 1);
        let mut state = MatchState::default();
        state.award(&mut engine, Player::One, 1);
        assert!(state.finish(&mut engine, Player::One));
        assert!(!state.finish(&mut engine, Player::Two));
        assert_eq!(state.winner(), Some(Player::One));
        assert_eq!(
            engine.drain_events(),
            vec![
                SimEvent::Score {
                    player_one: 1,
                    player_two: 0
                },
                SimEvent::GameOver { winner: Player::One },
            ]
        );
        state.reset(&mut engine);
        assert!(!state.is_over());
        assert_eq!(state.scores(), Scoreboard::default());
    }

    #[test]
    fn test_banner_lines() {
        let mut canvas = CommandBuffer::new();
        draw_winner_banner(&mut canvas, Vec2::new(800.0, 400.0), Player::Two, Some("Done!"));
        let texts: Vec<_> = canvas.texts().collect();
        assert_eq!(texts, vec!["Player 2 Wins!", "Done!", "Tap to continue"]);
    }
}
