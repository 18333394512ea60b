//! Session orchestrator
//!
//! Owns the engine, the active game and the persisted settings and stats.
//! The UI shell calls the command methods (start, pause, resume, restart,
//! end) and feeds one [`Arcade::frame`] per animation frame; everything the
//! games report comes back through the engine's event queue and is turned
//! into sound, vibration, score updates and stats here.

use glam::Vec2;

use crate::audio::{AudioSink, Sound};
use crate::consts::GAME_OVER_VIBRATION;
use crate::error::ArcadeError;
use crate::games::{GameKind, Player, Scoreboard, Simulation, SimulationHook};
use crate::input::InputSurface;
use crate::platform::{Haptics, KeyValueStore};
use crate::renderer::Canvas;
use crate::settings::Settings;
use crate::sim::{Engine, SimEvent};
use crate::stats::GameStats;

/// Top-level session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Menu => "menu",
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
            SessionState::GameOver => "gameOver",
        }
    }
}

pub struct Arcade {
    engine: Engine,
    game: Option<Box<dyn Simulation>>,
    kind: Option<GameKind>,
    state: SessionState,
    settings: Settings,
    stats: GameStats,
    scores: Scoreboard,
    store: Box<dyn KeyValueStore>,
    audio: Box<dyn AudioSink>,
    haptics: Box<dyn Haptics>,
    seed: u64,
    /// Engine clock when the current match began
    started_at: f64,
}

impl Arcade {
    pub fn new(
        store: Box<dyn KeyValueStore>,
        mut audio: Box<dyn AudioSink>,
        haptics: Box<dyn Haptics>,
        viewport: Vec2,
        seed: u64,
    ) -> Self {
        let settings = Settings::load(store.as_ref());
        let stats = GameStats::load(store.as_ref());
        audio.set_enabled(settings.sound_fx);
        log::info!(
            "Arcade ready: {} games played, speed {:.1}x, paddles {:.1}x",
            stats.games_played,
            settings.game_speed,
            settings.paddle_size
        );
        Self {
            engine: Engine::new(viewport, seed),
            game: None,
            kind: None,
            state: SessionState::Menu,
            settings,
            stats,
            scores: Scoreboard::default(),
            store,
            audio,
            haptics,
            seed,
            started_at: 0.0,
        }
    }

    // === Commands ===

    /// Start the game named `name`. An unknown name drops back to the menu.
    pub fn start_game(&mut self, name: &str) -> Result<(), ArcadeError> {
        match name.parse::<GameKind>() {
            Ok(kind) => {
                self.start(kind);
                Ok(())
            }
            Err(e) => {
                log::error!("Error starting game: {e}");
                self.end_game();
                Err(e)
            }
        }
    }

    /// Tear down whatever is running and start a fresh `kind` match
    pub fn start(&mut self, kind: GameKind) {
        self.teardown();
        self.engine.clear();
        self.engine.stop();

        self.seed = self.seed.wrapping_add(1);
        let mut game = kind.create(self.seed);
        game.init(&mut self.engine, &self.settings);
        self.game = Some(game);
        self.kind = Some(kind);
        self.scores = Scoreboard::default();
        self.state = SessionState::Playing;
        self.started_at = self.engine.clock();

        self.audio.resume();
        self.play(Sound::MenuSelect);
        self.dispatch_events();
        log::info!("Started {kind}");
    }

    pub fn pause(&mut self) {
        if self.state == SessionState::Playing {
            self.state = SessionState::Paused;
            log::info!("Paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state == SessionState::Paused {
            self.state = SessionState::Playing;
            log::info!("Resumed");
        }
    }

    pub fn restart(&mut self) {
        let Some(game) = self.game.as_deref_mut() else {
            return;
        };
        game.restart(&mut self.engine);
        self.state = SessionState::Playing;
        self.started_at = self.engine.clock();
        self.play(Sound::MenuSelect);
        self.dispatch_events();
    }

    /// Back to the menu, releasing the active game
    pub fn end_game(&mut self) {
        self.teardown();
        self.engine.clear();
        self.engine.stop();
        self.kind = None;
        self.scores = Scoreboard::default();
        self.state = SessionState::Menu;
    }

    /// Escape / hardware back button
    pub fn back_action(&mut self) {
        match self.state {
            SessionState::Playing => self.pause(),
            SessionState::Paused => self.resume(),
            SessionState::GameOver => self.end_game(),
            SessionState::Menu => {}
        }
    }

    /// A tap anywhere; dismisses the winner banner
    pub fn on_tap(&mut self) {
        if self.state == SessionState::GameOver {
            self.end_game();
        }
    }

    fn teardown(&mut self) {
        if let Some(mut game) = self.game.take() {
            game.cleanup(&mut self.engine);
        }
        // Stale events from the old match must not reach the new one
        self.engine.drain_events();
    }

    // === Settings ===

    pub fn set_game_speed(&mut self, value: f32) {
        self.settings.set_game_speed(value);
        self.apply_settings();
    }

    pub fn set_paddle_size(&mut self, value: f32) {
        self.settings.set_paddle_size(value);
        self.apply_settings();
    }

    pub fn set_sound(&mut self, enabled: bool) {
        self.settings.sound_fx = enabled;
        self.audio.set_enabled(enabled);
    }

    pub fn set_vibration(&mut self, enabled: bool) {
        self.settings.vibration = enabled;
    }

    pub fn save_settings(&mut self) -> Result<(), ArcadeError> {
        self.settings.save(self.store.as_mut())
    }

    fn apply_settings(&mut self) {
        if let Some(game) = self.game.as_deref_mut() {
            game.update_settings(&mut self.engine, &self.settings);
        }
    }

    // === Frame ===

    /// One animation frame at `now_ms`. Steps while playing and after the
    /// match ends (so effects settle); renders without stepping while paused.
    pub fn frame(&mut self, now_ms: f64, input: &dyn InputSurface, canvas: &mut dyn Canvas) {
        if self.state == SessionState::Menu {
            return;
        }
        if !self.engine.is_running() {
            self.engine.start(now_ms);
        }
        let Some(game) = self.game.as_deref_mut() else {
            return;
        };
        let mut hook = SimulationHook::new(game, input);
        match self.state {
            SessionState::Playing | SessionState::GameOver => {
                self.engine.frame(now_ms, Some(&mut hook), canvas);
            }
            SessionState::Paused => {
                self.engine.idle_frame(now_ms, Some(&hook), canvas);
            }
            SessionState::Menu => {}
        }
        self.dispatch_events();
    }

    /// Canvas size changed; applies from the next frame
    pub fn resize(&mut self, width: f32, height: f32) {
        self.engine.resize(width, height);
    }

    fn dispatch_events(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                SimEvent::Sound(sound) => self.play(sound),
                SimEvent::Score {
                    player_one,
                    player_two,
                } => {
                    self.scores = Scoreboard {
                        player_one,
                        player_two,
                    };
                }
                SimEvent::GameOver { winner } => self.game_over(winner),
            }
        }
    }

    fn play(&mut self, sound: Sound) {
        if self.settings.sound_fx {
            self.audio.play(sound);
        }
    }

    fn game_over(&mut self, winner: Player) {
        if self.state == SessionState::GameOver {
            return;
        }
        self.state = SessionState::GameOver;
        self.play(Sound::GameOver);
        if self.settings.vibration {
            self.haptics.vibrate(&GAME_OVER_VIBRATION);
        }

        let Some(kind) = self.kind else {
            return;
        };
        let duration_ms = (self.engine.clock() - self.started_at) * 1000.0;
        let score = self.scores.get(winner);
        if self.stats.record(kind.as_str(), duration_ms, score) {
            log::info!("New {kind} high score: {score}");
        }
        if let Err(e) = self.stats.save(self.store.as_mut()) {
            log::warn!("Could not save stats: {e}");
        }
    }

    // === Accessors ===

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn kind(&self) -> Option<GameKind> {
        self.kind
    }

    pub fn scores(&self) -> Scoreboard {
        self.scores
    }

    pub fn winner(&self) -> Option<Player> {
        self.game.as_ref().and_then(|g| g.winner())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{SETTINGS_KEY, STATS_KEY};
    use crate::input::Pointer;
    use crate::platform::MemoryStore;
    use crate::renderer::CommandBuffer;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        sounds: Rc<RefCell<Vec<Sound>>>,
        enabled: bool,
    }

    impl AudioSink for Recorder {
        fn play(&mut self, sound: Sound) {
            if self.enabled {
                self.sounds.borrow_mut().push(sound);
            }
        }
        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }
        fn is_enabled(&self) -> bool {
            self.enabled
        }
        fn set_volume(&mut self, _volume: f32) {}
        fn volume(&self) -> f32 {
            1.0
        }
    }

    #[derive(Default)]
    struct Buzzer {
        patterns: Rc<RefCell<Vec<Vec<u32>>>>,
    }

    impl Haptics for Buzzer {
        fn vibrate(&mut self, pattern: &[u32]) {
            self.patterns.borrow_mut().push(pattern.to_vec());
        }
    }

    struct Rig {
        arcade: Arcade,
        sounds: Rc<RefCell<Vec<Sound>>>,
        patterns: Rc<RefCell<Vec<Vec<u32>>>>,
        now: f64,
    }

    impl Rig {
        fn with_store(store: MemoryStore) -> Self {
            let audio = Recorder::default();
            let haptics = Buzzer::default();
            let (sounds, patterns) = (audio.sounds.clone(), haptics.patterns.clone());
            let arcade = Arcade::new(
                Box::new(store),
                Box::new(audio),
                Box::new(haptics),
                Vec2::new(800.0, 600.0),
                11,
            );
            Self {
                arcade,
                sounds,
                patterns,
                now: 1000.0,
            }
        }

        fn new() -> Self {
            Self::with_store(MemoryStore::new())
        }

        fn frames(&mut self, count: usize) {
            let input: Vec<Pointer> = Vec::new();
            let mut canvas = CommandBuffer::new();
            for _ in 0..count {
                self.now += 1000.0 / 60.0;
                self.arcade.frame(self.now, &input, &mut canvas);
            }
        }
    }

    #[test]
    fn test_unknown_game_returns_to_menu() {
        let mut rig = Rig::new();
        rig.arcade.start_game("pong").unwrap();
        assert_eq!(rig.arcade.state(), SessionState::Playing);
        let err = rig.arcade.start_game("snake").unwrap_err();
        assert!(matches!(err, ArcadeError::UnknownGame(_)));
        assert_eq!(rig.arcade.state(), SessionState::Menu);
        assert_eq!(rig.arcade.engine().entity_count(), 0);
    }

    #[test]
    fn test_start_swaps_games_cleanly() {
        let mut rig = Rig::new();
        rig.arcade.start_game("breakout").unwrap();
        rig.frames(5);
        rig.arcade.start_game("tanks").unwrap();
        assert_eq!(rig.arcade.kind(), Some(GameKind::Tanks));
        // Two tanks and six obstacles, nothing left over from Breakout
        assert_eq!(rig.arcade.engine().entity_count(), 8);
        assert_eq!(rig.arcade.scores(), Scoreboard::default());
        assert_eq!(rig.sounds.borrow()[0], Sound::MenuSelect);
    }

    #[test]
    fn test_pause_freezes_the_world() {
        let mut rig = Rig::new();
        rig.arcade.start_game("pong").unwrap();
        rig.frames(3);
        let clock = rig.arcade.engine().clock();
        rig.arcade.back_action();
        assert_eq!(rig.arcade.state(), SessionState::Paused);
        rig.frames(30);
        assert_eq!(rig.arcade.engine().clock(), clock);

        rig.arcade.back_action();
        assert_eq!(rig.arcade.state(), SessionState::Playing);
        rig.frames(1);
        // No catch-up jump after the pause
        assert!(rig.arcade.engine().clock() - clock < 0.02);
    }

    #[test]
    fn test_pause_only_from_playing() {
        let mut rig = Rig::new();
        rig.arcade.pause();
        assert_eq!(rig.arcade.state(), SessionState::Menu);
        rig.arcade.resume();
        assert_eq!(rig.arcade.state(), SessionState::Menu);
        rig.arcade.on_tap();
        assert_eq!(rig.arcade.state(), SessionState::Menu);
    }

    #[test]
    fn test_game_over_records_stats() {
        let mut rig = Rig::new();
        rig.arcade.start_game("tanks").unwrap();
        rig.frames(60);
        rig.sounds.borrow_mut().clear();

        // Drive the match to its end through the tanks' own hit path
        rig.arcade.game = None;
        let mut tanks = crate::games::TankBattle::new();
        rig.arcade.engine.clear();
        tanks.init(&mut rig.arcade.engine, &Settings::default());
        for _ in 0..5 {
            tanks.tank_hit(&mut rig.arcade.engine, Player::Two);
        }
        rig.arcade.game = Some(Box::new(tanks));
        rig.frames(1);

        assert_eq!(rig.arcade.state(), SessionState::GameOver);
        assert_eq!(rig.arcade.scores().player_one, 5);
        assert_eq!(rig.arcade.winner(), Some(Player::One));
        assert!(rig.sounds.borrow().contains(&Sound::GameOver));
        assert_eq!(*rig.patterns.borrow(), vec![GAME_OVER_VIBRATION.to_vec()]);

        let stats = rig.arcade.stats();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.high_score("tanks"), 5);
        assert!(stats.total_play_time > 900.0);
        assert!(rig.arcade.store().get(STATS_KEY).is_some());

        rig.arcade.on_tap();
        assert_eq!(rig.arcade.state(), SessionState::Menu);
    }

    #[test]
    fn test_muted_and_still() {
        let mut rig = Rig::new();
        rig.arcade.set_sound(false);
        rig.arcade.set_vibration(false);
        rig.arcade.start_game("airhockey").unwrap();
        rig.frames(10);
        assert!(rig.sounds.borrow().is_empty());
        assert!(rig.patterns.borrow().is_empty());
    }

    #[test]
    fn test_settings_persist() {
        let mut rig = Rig::new();
        rig.arcade.start_game("pong").unwrap();
        rig.arcade.set_game_speed(1.5);
        rig.arcade.set_paddle_size(9.0);
        rig.arcade.save_settings().unwrap();
        let json = rig.arcade.store().get(SETTINGS_KEY).unwrap();

        let mut store = MemoryStore::new();
        store.set(SETTINGS_KEY, &json).unwrap();
        let rig = Rig::with_store(store);
        assert_eq!(rig.arcade.settings().game_speed, 1.5);
        assert_eq!(rig.arcade.settings().paddle_size, 2.0);
    }

    #[test]
    fn test_restart_resets_scores() {
        let mut rig = Rig::new();
        rig.arcade.start_game("pong").unwrap();
        rig.arcade.scores = Scoreboard {
            player_one: 3,
            player_two: 1,
        };
        rig.arcade.restart();
        assert_eq!(rig.arcade.scores(), Scoreboard::default());
        assert_eq!(rig.arcade.state(), SessionState::Playing);
    }
}
