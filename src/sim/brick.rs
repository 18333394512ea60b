//! Breakout Duel brick

use glam::Vec2;

use super::Player;
use super::entity::{Body, GameObject};
use crate::geometry::{Rect, Shape};
use crate::renderer::{Canvas, Color, colors};

const GLOW_DECAY: f32 = 4.0;

#[derive(Debug, Clone)]
pub struct Brick {
    pub body: Body,
    pub size: Vec2,
    /// Player whose wall this brick belongs to
    pub owner: Player,
    pub color: Color,
    health: u32,
    max_health: u32,
    glow: f32,
}

impl Brick {
    /// `center` is the brick centre; bounds are derived from it
    pub fn new(center: Vec2, size: Vec2, owner: Player, max_health: u32) -> Self {
        let max_health = max_health.max(1);
        Self {
            body: Body::new(center),
            size,
            owner,
            color: owner.color(),
            health: max_health,
            max_health,
            glow: 0.0,
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.body.position, self.size)
    }

    /// Take one point of damage; returns true when this destroyed the brick
    pub fn hit(&mut self) -> bool {
        if !self.body.active {
            return false;
        }
        self.health = self.health.saturating_sub(1);
        self.glow = 1.0;
        if self.health == 0 {
            self.body.destroy();
            return true;
        }
        false
    }
}

impl GameObject for Brick {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update(&mut self, dt: f32) {
        self.glow = (self.glow - dt * GLOW_DECAY).max(0.0);
        self.body.integrate(dt);
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        if self.glow > 0.0 {
            canvas.set_glow(self.color, 20.0 * self.glow);
        }
        let rect = Rect::centered(Vec2::ZERO, self.size);
        canvas.set_alpha(self.health as f32 / self.max_health as f32);
        canvas.fill_rect(rect, self.color);
        canvas.fill_rect(
            Rect::new(rect.x, rect.y, rect.width / 3.0, rect.height / 3.0),
            colors::HIGHLIGHT,
        );
        canvas.set_alpha(1.0);
        canvas.stroke_rect(rect, colors::WHITE.with_alpha(0.6), 1.0);
        canvas.set_glow(self.color, 0.0);
    }

    fn bounds(&self) -> Shape {
        Shape::Rect(self.rect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_decreases_until_destroyed() {
        let mut brick = Brick::new(Vec2::new(100.0, 100.0), Vec2::new(38.0, 18.0), Player::Two, 2);
        assert!(!brick.hit());
        assert_eq!(brick.health(), 1);
        assert!(brick.is_active());
        assert!(brick.hit());
        assert_eq!(brick.health(), 0);
        assert!(!brick.is_active());
        // Further hits on a dead brick change nothing
        assert!(!brick.hit());
        assert_eq!(brick.health(), 0);
    }

    #[test]
    fn test_rect_is_centered() {
        let brick = Brick::new(Vec2::new(100.0, 100.0), Vec2::new(38.0, 18.0), Player::One, 1);
        let rect = brick.rect();
        assert_eq!(rect.left(), 81.0);
        assert_eq!(rect.top(), 91.0);
    }
}
