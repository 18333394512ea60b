//! Simulation core
//!
//! Entity model, particles, collision response, deferred tasks and the frame
//! engine that drives them. Nothing in here touches the browser: rendering
//! goes through the `Canvas` trait and randomness through seeded PCG streams.

pub mod ball;
pub mod brick;
pub mod engine;
pub mod entity;
pub mod paddle;
pub mod particles;
pub mod physics;
pub mod tank;
pub mod timer;

pub use ball::{Ball, BallStyle};
pub use brick::Brick;
pub use engine::{Engine, FrameHook, SimEvent};
pub use entity::{Body, Entity, EntityId, GameObject};
pub use paddle::{Mallet, Paddle};
pub use particles::{Particle, ParticleSystem};
pub use tank::{Bullet, Obstacle, Tank};
pub use timer::Timers;

use serde::{Deserialize, Serialize};

use crate::renderer::{Color, colors};

/// One of the two seats at the table
///
/// Player one sits at the bottom (or left) edge and sees the screen rotated
/// 180 degrees; player two sits at the top (or right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn number(&self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    pub fn opponent(&self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Player::One => colors::PLAYER_ONE,
            Player::Two => colors::PLAYER_TWO,
        }
    }
}
