//! Entity model
//!
//! Every simulated thing carries a [`Body`] (kinematic state plus the
//! active/visible flags) and implements [`GameObject`]. The closed set of
//! concrete kinds lives in the [`Entity`] enum so the engine registry can hold
//! them side by side without trait objects.

use glam::Vec2;

use super::ball::Ball;
use super::brick::Brick;
use super::paddle::{Mallet, Paddle};
use super::tank::{Bullet, Obstacle, Tank};
use crate::geometry::Shape;
use crate::renderer::Canvas;

/// Stable handle into the engine registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

/// Kinematic state shared by every entity
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
    pub active: bool,
    pub visible: bool,
}

impl Body {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            active: true,
            visible: true,
        }
    }

    /// Semi-implicit Euler step; inactive bodies do not move
    pub fn integrate(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Mark for removal at the next registry sweep. Idempotent.
    pub fn destroy(&mut self) {
        self.active = false;
    }
}

/// Capability set every simulated object provides
pub trait GameObject {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    /// Advance by `dt` seconds
    fn update(&mut self, dt: f32);

    /// Draw in local coordinates (origin at the body position)
    fn draw(&self, canvas: &mut dyn Canvas);

    /// Collision shape in world coordinates
    fn bounds(&self) -> Shape;

    /// Apply the body transform and draw; hidden objects draw nothing
    fn render(&self, canvas: &mut dyn Canvas) {
        let body = self.body();
        if !body.visible {
            return;
        }
        canvas.save();
        canvas.translate(body.position);
        canvas.rotate(body.rotation);
        canvas.scale(body.scale);
        self.draw(canvas);
        canvas.restore();
    }

    fn is_active(&self) -> bool {
        self.body().active
    }

    fn destroy(&mut self) {
        self.body_mut().destroy();
    }
}

/// Closed set of entity kinds the engine can host
#[derive(Debug, Clone)]
pub enum Entity {
    Paddle(Paddle),
    Mallet(Mallet),
    Ball(Ball),
    Brick(Brick),
    Tank(Tank),
    Bullet(Bullet),
    Obstacle(Obstacle),
}

macro_rules! entity_kind {
    ($variant:ident, $ty:ty, $as_ref:ident, $as_mut:ident) => {
        impl From<$ty> for Entity {
            fn from(value: $ty) -> Self {
                Entity::$variant(value)
            }
        }

        impl Entity {
            pub fn $as_ref(&self) -> Option<&$ty> {
                match self {
                    Entity::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            pub fn $as_mut(&mut self) -> Option<&mut $ty> {
                match self {
                    Entity::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

entity_kind!(Paddle, Paddle, as_paddle, as_paddle_mut);
entity_kind!(Mallet, Mallet, as_mallet, as_mallet_mut);
entity_kind!(Ball, Ball, as_ball, as_ball_mut);
entity_kind!(Brick, Brick, as_brick, as_brick_mut);
entity_kind!(Tank, Tank, as_tank, as_tank_mut);
entity_kind!(Bullet, Bullet, as_bullet, as_bullet_mut);
entity_kind!(Obstacle, Obstacle, as_obstacle, as_obstacle_mut);

impl Entity {
    fn object(&self) -> &dyn GameObject {
        match self {
            Entity::Paddle(e) => e,
            Entity::Mallet(e) => e,
            Entity::Ball(e) => e,
            Entity::Brick(e) => e,
            Entity::Tank(e) => e,
            Entity::Bullet(e) => e,
            Entity::Obstacle(e) => e,
        }
    }

    fn object_mut(&mut self) -> &mut dyn GameObject {
        match self {
            Entity::Paddle(e) => e,
            Entity::Mallet(e) => e,
            Entity::Ball(e) => e,
            Entity::Brick(e) => e,
            Entity::Tank(e) => e,
            Entity::Bullet(e) => e,
            Entity::Obstacle(e) => e,
        }
    }
}

impl GameObject for Entity {
    fn body(&self) -> &Body {
        self.object().body()
    }

    fn body_mut(&mut self) -> &mut Body {
        self.object_mut().body_mut()
    }

    fn update(&mut self, dt: f32) {
        self.object_mut().update(dt);
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        self.object().draw(canvas);
    }

    fn bounds(&self) -> Shape {
        self.object().bounds()
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        self.object().render(canvas);
    }
}
