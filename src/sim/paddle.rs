//! Player-steered movers: rectangular paddles and round air-hockey mallets
//!
//! Both chase a target point at a fixed speed, never overshoot it, and clamp
//! their whole body inside an optional bounds rectangle.

use glam::Vec2;

use super::Player;
use super::entity::{Body, GameObject};
use crate::geometry::{Circle, Rect, Shape, VecExt};
use crate::renderer::{Canvas, Color, colors};

/// Distance under which a mover is considered arrived
const ARRIVE_EPSILON: f32 = 1.0;
/// Glow decay for paddles (units per second)
const GLOW_DECAY: f32 = 3.0;

/// Move `body` toward `target` by at most `speed * dt`
fn step_toward(body: &mut Body, target: Vec2, speed: f32, dt: f32) {
    let diff = target - body.position;
    let distance = diff.length();
    if distance > ARRIVE_EPSILON && dt > 0.0 {
        let step = diff.unit() * (speed * dt).min(distance);
        body.velocity = step / dt;
    } else {
        body.velocity = Vec2::ZERO;
    }
    body.integrate(dt);
}

/// Rectangular paddle (Pong, Breakout Duel)
#[derive(Debug, Clone)]
pub struct Paddle {
    pub body: Body,
    pub size: Vec2,
    pub owner: Player,
    /// Unit normal pointing from the paddle into the field
    pub face: Vec2,
    pub speed: f32,
    pub bounds: Option<Rect>,
    pub color: Color,
    target: Vec2,
    glow: f32,
}

impl Paddle {
    pub fn new(position: Vec2, size: Vec2, owner: Player, face: Vec2, speed: f32) -> Self {
        Self {
            body: Body::new(position),
            size,
            owner,
            face,
            speed,
            bounds: None,
            color: owner.color(),
            target: position,
            glow: 0.0,
        }
    }

    pub fn move_to(&mut self, target: Vec2) {
        self.target = target;
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Snap to a position and stop there
    pub fn place(&mut self, position: Vec2) {
        self.body.position = position;
        self.body.velocity = Vec2::ZERO;
        self.target = position;
    }

    /// Flash after contact with the ball
    pub fn hit(&mut self) {
        self.glow = 1.0;
    }

    pub fn glow(&self) -> f32 {
        self.glow
    }

    /// Axis the paddle extends along (+x or +y)
    pub fn lateral(&self) -> Vec2 {
        if self.face.x.abs() > self.face.y.abs() {
            Vec2::Y
        } else {
            Vec2::X
        }
    }

    /// Half the paddle length along its lateral axis
    pub fn half_extent(&self) -> f32 {
        self.size.dot(self.lateral()) / 2.0
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.body.position, self.size)
    }

    fn travel_area(&self) -> Option<Rect> {
        self.bounds.map(|b| b.inset(self.size / 2.0))
    }
}

impl GameObject for Paddle {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update(&mut self, dt: f32) {
        let area = self.travel_area();
        if let Some(area) = area {
            self.target = area.clamp_point(self.target);
        }
        step_toward(&mut self.body, self.target, self.speed, dt);
        if let Some(area) = area {
            self.body.position = area.clamp_point(self.body.position);
        }
        self.glow = (self.glow - dt * GLOW_DECAY).max(0.0);
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        if self.glow > 0.0 {
            canvas.set_glow(self.color, 20.0 * self.glow);
        }
        let rect = Rect::centered(Vec2::ZERO, self.size);
        canvas.fill_rect(rect, self.color);
        canvas.stroke_rect(rect, colors::WHITE, 2.0);
        canvas.set_glow(self.color, 0.0);
    }

    fn bounds(&self) -> Shape {
        Shape::Rect(self.rect())
    }
}

/// Round air-hockey striker
#[derive(Debug, Clone)]
pub struct Mallet {
    pub body: Body,
    pub radius: f32,
    pub owner: Player,
    pub speed: f32,
    pub bounds: Option<Rect>,
    pub color: Color,
    target: Vec2,
    glow: f32,
}

impl Mallet {
    pub fn new(position: Vec2, radius: f32, owner: Player, speed: f32) -> Self {
        Self {
            body: Body::new(position),
            radius,
            owner,
            speed,
            bounds: None,
            color: owner.color(),
            target: position,
            glow: 0.0,
        }
    }

    pub fn move_to(&mut self, target: Vec2) {
        self.target = target;
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn place(&mut self, position: Vec2) {
        self.body.position = position;
        self.body.velocity = Vec2::ZERO;
        self.target = position;
    }

    pub fn hit(&mut self) {
        self.glow = 1.0;
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.body.position, self.radius)
    }

    fn travel_area(&self) -> Option<Rect> {
        self.bounds.map(|b| b.inset(Vec2::splat(self.radius)))
    }
}

impl GameObject for Mallet {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Velocity afterwards is the actual displacement over `dt`, so a mallet
    /// pinned against its bounds donates no momentum.
    fn update(&mut self, dt: f32) {
        let last = self.body.position;
        let area = self.travel_area();
        if let Some(area) = area {
            self.target = area.clamp_point(self.target);
        }
        step_toward(&mut self.body, self.target, self.speed, dt);
        if let Some(area) = area {
            self.body.position = area.clamp_point(self.body.position);
        }
        if dt > 0.0 {
            self.body.velocity = (self.body.position - last) / dt;
        }
        self.glow = (self.glow - dt * GLOW_DECAY).max(0.0);
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        if self.glow > 0.0 {
            canvas.set_glow(self.color, 30.0 * self.glow);
        }
        canvas.fill_circle(Vec2::ZERO, self.radius, self.color);
        canvas.fill_circle(
            Vec2::splat(-self.radius * 0.3),
            self.radius * 0.4,
            colors::HIGHLIGHT,
        );
        canvas.stroke_circle(Vec2::ZERO, self.radius, colors::WHITE, 3.0);
        canvas.set_glow(self.color, 0.0);
    }

    fn bounds(&self) -> Shape {
        Shape::Circle(self.circle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pong_paddle() -> Paddle {
        let mut p = Paddle::new(
            Vec2::new(50.0, 200.0),
            Vec2::new(15.0, 80.0),
            Player::One,
            Vec2::X,
            480.0,
        );
        p.bounds = Some(Rect::new(20.0, 20.0, 80.0, 360.0));
        p
    }

    #[test]
    fn test_paddle_never_overshoots() {
        let mut p = pong_paddle();
        p.move_to(Vec2::new(50.0, 210.0));
        p.update(1.0);
        assert_eq!(p.body.position, Vec2::new(50.0, 210.0));
    }

    #[test]
    fn test_paddle_moves_at_speed() {
        let mut p = pong_paddle();
        p.move_to(Vec2::new(50.0, 360.0));
        p.update(0.1);
        assert!((p.body.position.y - 248.0).abs() < 1e-3);
    }

    #[test]
    fn test_paddle_clamped_inside_bounds() {
        let mut p = pong_paddle();
        p.move_to(Vec2::new(50.0, 5000.0));
        for _ in 0..100 {
            p.update(0.05);
        }
        let rect = p.rect();
        let bounds = Rect::new(20.0, 20.0, 80.0, 360.0);
        assert!(rect.bottom() <= bounds.bottom() + 1e-3);
        assert!(rect.top() >= bounds.top() - 1e-3);
        assert_eq!(p.target().y, bounds.bottom() - 40.0);
    }

    #[test]
    fn test_paddle_glow_decays() {
        let mut p = pong_paddle();
        p.hit();
        p.update(0.2);
        assert!((p.glow() - 0.4).abs() < 1e-5);
        p.update(1.0);
        assert_eq!(p.glow(), 0.0);
    }

    #[test]
    fn test_lateral_axis() {
        let p = pong_paddle();
        assert_eq!(p.lateral(), Vec2::Y);
        assert_eq!(p.half_extent(), 40.0);
        let b = Paddle::new(Vec2::ZERO, Vec2::new(60.0, 15.0), Player::One, Vec2::NEG_Y, 480.0);
        assert_eq!(b.lateral(), Vec2::X);
        assert_eq!(b.half_extent(), 30.0);
    }

    #[test]
    fn test_mallet_velocity_is_displacement() {
        let mut m = Mallet::new(Vec2::new(200.0, 200.0), 25.0, Player::One, 720.0);
        m.bounds = Some(Rect::new(20.0, 20.0, 360.0, 360.0));
        m.move_to(Vec2::new(300.0, 200.0));
        m.update(0.1);
        assert!((m.body.velocity.x - 720.0).abs() < 1e-2);

        // Pinned against the wall: target clamped, no phantom velocity
        m.place(Vec2::new(355.0, 200.0));
        m.move_to(Vec2::new(1000.0, 200.0));
        m.update(0.1);
        assert_eq!(m.body.position.x, 355.0);
        assert_eq!(m.body.velocity, Vec2::ZERO);
    }
}
