//! Duel Arcade - four head-to-head games on one shared screen
//!
//! Core modules:
//! - `geometry`: Vectors, rectangles, circles and their intersection tests
//! - `sim`: Entities, particles, physics helpers and the frame engine
//! - `games`: The four simulations (Pong, Air Hockey, Breakout Duel, Tank Battle)
//! - `input`: Pointer tracking and the split-screen player zones
//! - `renderer`: Immediate-mode 2D drawing surface
//! - `platform`: Browser/native capabilities (storage, haptics)
//! - `arcade`: Session orchestrator tying it all together

pub mod arcade;
pub mod audio;
pub mod error;
pub mod games;
pub mod geometry;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod tuning;

pub use arcade::{Arcade, SessionState};
pub use error::ArcadeError;
pub use games::{GameKind, Player};
pub use settings::Settings;
pub use stats::GameStats;

/// Engine configuration constants
pub mod consts {
    /// Longest frame step the engine will simulate (seconds)
    pub const MAX_FRAME_DT: f32 = 1.0 / 30.0;
    /// Window over which the frame rate is measured (ms)
    pub const FPS_WINDOW_MS: f64 = 1000.0;

    /// Hard cap on live particles; the oldest are dropped first
    pub const MAX_PARTICLES: usize = 512;
    /// Downward pull applied to every particle (px/s²)
    pub const PARTICLE_GRAVITY: f32 = 200.0;

    /// Storage keys for the persisted blobs
    pub const SETTINGS_KEY: &str = "gameSettings";
    pub const STATS_KEY: &str = "gameStats";

    /// Haptic pattern played when a match ends (ms on/off/on)
    pub const GAME_OVER_VIBRATION: [u32; 3] = [200, 100, 200];
}
