//! Ball and puck
//!
//! Speed is capped after every velocity mutation, not only on integration,
//! so nothing observable ever exceeds `max_speed`.

use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_4;

use glam::Vec2;

use super::Player;
use super::entity::{Body, GameObject};
use super::paddle::Paddle;
use crate::geometry::{Circle, Shape, VecExt, reflect};
use crate::renderer::{Canvas, Color, colors};

/// Speed multiplier applied on every wall bounce
pub const WALL_BOUNCE_BOOST: f32 = 1.02;
/// Speed multiplier applied on every paddle hit
pub const PADDLE_BOUNCE_BOOST: f32 = 1.05;
/// Steepest deflection off a paddle edge
pub const MAX_BOUNCE_ANGLE: f32 = FRAC_PI_4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallStyle {
    Ball,
    Puck,
}

#[derive(Debug, Clone)]
pub struct Ball {
    pub body: Body,
    pub radius: f32,
    /// Rally speed; grows on paddle hits up to `max_speed`
    pub speed: f32,
    pub max_speed: f32,
    pub color: Color,
    pub style: BallStyle,
    pub bounce_count: u32,
    pub last_paddle_hit: Option<Player>,
    trail: VecDeque<Vec2>,
    trail_length: usize,
}

impl Ball {
    pub fn new(position: Vec2, radius: f32, speed: f32, max_speed: f32) -> Self {
        Self {
            body: Body::new(position),
            radius,
            speed,
            max_speed,
            color: colors::WHITE,
            style: BallStyle::Ball,
            bounce_count: 0,
            last_paddle_hit: None,
            trail: VecDeque::with_capacity(10),
            trail_length: 10,
        }
    }

    pub fn puck(position: Vec2, radius: f32, speed: f32, max_speed: f32) -> Self {
        Self {
            style: BallStyle::Puck,
            trail_length: 8,
            ..Self::new(position, radius, speed, max_speed)
        }
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.body.position, self.radius)
    }

    pub fn trail(&self) -> impl Iterator<Item = &Vec2> {
        self.trail.iter()
    }

    /// Scale velocity down to `max_speed` if it is faster
    pub fn limit_speed(&mut self) {
        let speed = self.body.velocity.length();
        if speed > self.max_speed {
            self.body.velocity = self.body.velocity.unit() * self.max_speed;
        }
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.body.velocity = velocity;
        self.limit_speed();
    }

    /// Place at `position` and launch along `direction` at the rally speed
    pub fn serve(&mut self, position: Vec2, direction: Vec2) {
        self.body.position = position;
        self.body.visible = true;
        self.trail.clear();
        self.bounce_count = 0;
        self.last_paddle_hit = None;
        self.speed = self.speed.min(self.max_speed);
        self.set_velocity(direction.unit() * self.speed);
    }

    /// Hold still and hidden at `position` until the next serve
    pub fn park(&mut self, position: Vec2) {
        self.body.position = position;
        self.body.velocity = Vec2::ZERO;
        self.body.visible = false;
        self.trail.clear();
    }

    pub fn is_parked(&self) -> bool {
        !self.body.visible
    }

    /// Mirror off a surface with unit `normal`, gaining a little speed
    pub fn bounce_off_wall(&mut self, normal: Vec2) {
        self.body.velocity = reflect(self.body.velocity, normal) * WALL_BOUNCE_BOOST;
        self.bounce_count += 1;
        self.limit_speed();
    }

    /// Deflect off a paddle: the contact offset from the paddle centre maps
    /// linearly onto ±45°, and the rally speed grows by 5% up to the cap.
    pub fn bounce_off_paddle(&mut self, paddle: &mut Paddle) {
        let lateral = paddle.lateral();
        let offset = (self.body.position - paddle.body.position).dot(lateral);
        let normalized = if paddle.half_extent() > 0.0 {
            (offset / paddle.half_extent()).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let angle = normalized * MAX_BOUNCE_ANGLE;
        let direction = paddle.face * angle.cos() + lateral * angle.sin();

        self.speed = (self.speed * PADDLE_BOUNCE_BOOST).min(self.max_speed);
        self.set_velocity(direction.unit() * self.speed);
        self.bounce_count += 1;
        self.last_paddle_hit = Some(paddle.owner);
        paddle.hit();
    }

    fn draw_trail(&self, canvas: &mut dyn Canvas) {
        let (opacity, shrink) = match self.style {
            BallStyle::Ball => (0.3, 1.0),
            BallStyle::Puck => (0.4, 0.8),
        };
        let len = self.trail.len() as f32;
        for (i, point) in self.trail.iter().enumerate() {
            let fade = i as f32 / len;
            canvas.set_alpha(fade * opacity);
            canvas.fill_circle(
                *point - self.body.position,
                self.radius * fade * shrink,
                self.color,
            );
        }
        canvas.set_alpha(1.0);
    }
}

impl GameObject for Ball {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update(&mut self, dt: f32) {
        if !self.is_parked() {
            self.trail.push_back(self.body.position);
            while self.trail.len() > self.trail_length {
                self.trail.pop_front();
            }
        }
        self.limit_speed();
        self.body.integrate(dt);
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        self.draw_trail(canvas);
        canvas.fill_circle(Vec2::ZERO, self.radius, self.color);
        match self.style {
            BallStyle::Ball => {
                canvas.set_glow(self.color, 10.0);
                canvas.stroke_circle(Vec2::ZERO, self.radius, colors::WHITE.with_alpha(0.8), 2.0);
                canvas.set_glow(self.color, 0.0);
            }
            BallStyle::Puck => {
                canvas.fill_circle(
                    Vec2::splat(-self.radius * 0.3),
                    self.radius * 0.3,
                    colors::WHITE.with_alpha(0.6),
                );
                canvas.stroke_circle(Vec2::ZERO, self.radius, colors::WHITE.with_alpha(0.8), 2.0);
            }
        }
    }

    fn bounds(&self) -> Shape {
        Shape::Circle(self.circle())
    }
}
