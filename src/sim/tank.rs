//! Tank Battle entities: tanks, bullets and static obstacles

use glam::Vec2;

use super::Player;
use super::entity::{Body, GameObject};
use crate::geometry::{Circle, Rect, Shape, VecExt};
use crate::renderer::{Canvas, Color, colors};

/// Distance under which a tank stops steering
const ARRIVE_EPSILON: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct Tank {
    pub body: Body,
    /// Edge length of the square hull
    pub size: f32,
    pub owner: Player,
    pub speed: f32,
    pub bounds: Option<Rect>,
    pub color: Color,
    target: Vec2,
}

impl Tank {
    pub fn new(position: Vec2, size: f32, owner: Player, speed: f32) -> Self {
        Self {
            body: Body::new(position),
            size,
            owner,
            speed,
            bounds: None,
            color: owner.color(),
            target: position,
        }
    }

    pub fn move_to(&mut self, target: Vec2) {
        self.target = target;
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Snap to `position` facing `heading`, at rest
    pub fn respawn(&mut self, position: Vec2, heading: f32) {
        self.body.position = position;
        self.body.velocity = Vec2::ZERO;
        self.body.rotation = heading;
        self.target = position;
    }

    /// Point at the barrel tip where bullets spawn
    pub fn muzzle(&self) -> Vec2 {
        self.body.position + Vec2::from_angle(self.body.rotation) * self.size
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.body.position, Vec2::splat(self.size))
    }
}

impl GameObject for Tank {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Drive toward the target, turning to face the direction of travel
    fn update(&mut self, dt: f32) {
        let diff = self.target - self.body.position;
        let distance = diff.length();
        if distance > ARRIVE_EPSILON && dt > 0.0 {
            self.body.rotation = diff.heading();
            let step = diff.unit() * (self.speed * dt).min(distance);
            self.body.velocity = step / dt;
        } else {
            self.body.velocity = Vec2::ZERO;
        }
        self.body.integrate(dt);
        if let Some(bounds) = self.bounds {
            let area = bounds.inset(Vec2::splat(self.size));
            self.body.position = area.clamp_point(self.body.position);
        }
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        let hull = Rect::centered(Vec2::ZERO, Vec2::splat(self.size));
        canvas.fill_rect(hull, self.color);
        canvas.line(Vec2::ZERO, Vec2::new(self.size * 0.8, 0.0), self.color, 4.0, None);
        canvas.fill_rect(
            Rect::new(hull.x, hull.y, self.size / 3.0, self.size / 3.0),
            colors::HIGHLIGHT,
        );
        canvas.stroke_rect(hull, colors::WHITE, 2.0);
    }

    fn bounds(&self) -> Shape {
        Shape::Rect(self.rect())
    }
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub body: Body,
    pub radius: f32,
    pub color: Color,
    owner: Player,
}

impl Bullet {
    pub fn new(position: Vec2, direction: Vec2, speed: f32, owner: Player) -> Self {
        let mut body = Body::new(position);
        body.velocity = direction.unit() * speed;
        Self {
            body,
            radius: 3.0,
            color: owner.color(),
            owner,
        }
    }

    /// Team that fired this bullet; fixed for its lifetime
    pub fn owner(&self) -> Player {
        self.owner
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.body.position, self.radius)
    }
}

impl GameObject for Bullet {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update(&mut self, dt: f32) {
        self.body.integrate(dt);
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.fill_circle(Vec2::ZERO, self.radius, self.color);
        canvas.stroke_circle(Vec2::ZERO, self.radius, colors::WHITE, 1.0);
    }

    fn bounds(&self) -> Shape {
        Shape::Circle(self.circle())
    }
}

#[derive(Debug, Clone)]
pub struct Obstacle {
    pub body: Body,
    pub size: Vec2,
}

impl Obstacle {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            body: Body::new(center),
            size,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.body.position, self.size)
    }
}

impl GameObject for Obstacle {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update(&mut self, _dt: f32) {}

    fn draw(&self, canvas: &mut dyn Canvas) {
        let rect = Rect::centered(Vec2::ZERO, self.size);
        canvas.fill_rect(rect, colors::OBSTACLE);
        canvas.fill_rect(
            Rect::new(rect.x, rect.y, rect.width / 3.0, rect.height / 3.0),
            colors::WHITE.with_alpha(0.2),
        );
        canvas.stroke_rect(rect, colors::WHITE.with_alpha(0.4), 1.0);
    }

    fn bounds(&self) -> Shape {
        Shape::Rect(self.rect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_tank_turns_toward_travel() {
        let mut tank = Tank::new(Vec2::new(100.0, 100.0), 25.0, Player::Two, 150.0);
        tank.move_to(Vec2::new(100.0, 200.0));
        tank.update(0.1);
        assert!((tank.body.rotation - FRAC_PI_2).abs() < 1e-5);
        assert!((tank.body.position.y - 115.0).abs() < 1e-3);
        assert!((tank.body.velocity.y - 150.0).abs() < 1e-2);
    }

    #[test]
    fn test_tank_stops_near_target() {
        let mut tank = Tank::new(Vec2::new(100.0, 100.0), 25.0, Player::One, 150.0);
        tank.move_to(Vec2::new(101.0, 100.0));
        tank.update(0.1);
        assert_eq!(tank.body.position, Vec2::new(100.0, 100.0));
        assert_eq!(tank.body.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_tank_integrates_acceleration() {
        let mut tank = Tank::new(Vec2::new(100.0, 100.0), 25.0, Player::One, 150.0);
        tank.body.acceleration = Vec2::new(0.0, 100.0);
        tank.update(0.1);
        assert!((tank.body.velocity.y - 10.0).abs() < 1e-4);
        assert!((tank.body.position.y - 101.0).abs() < 1e-4);

        // A destroyed tank stays put
        tank.body.destroy();
        tank.move_to(Vec2::new(300.0, 100.0));
        tank.update(0.1);
        assert!((tank.body.position.x - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_tank_kept_inside_bounds() {
        let mut tank = Tank::new(Vec2::new(200.0, 300.0), 25.0, Player::One, 150.0);
        tank.bounds = Some(Rect::new(20.0, 220.0, 760.0, 160.0));
        tank.move_to(Vec2::new(200.0, 0.0));
        for _ in 0..60 {
            tank.update(0.05);
        }
        assert_eq!(tank.body.position.y, 245.0);
    }

    #[test]
    fn test_bullet_keeps_owner_and_direction() {
        let bullet = Bullet::new(Vec2::ZERO, Vec2::new(0.0, -2.0), 400.0, Player::One);
        assert_eq!(bullet.owner(), Player::One);
        assert_eq!(bullet.body.velocity, Vec2::new(0.0, -400.0));
    }

    #[test]
    fn test_muzzle_in_front_of_hull() {
        let mut tank = Tank::new(Vec2::new(100.0, 100.0), 25.0, Player::One, 150.0);
        tank.body.rotation = 0.0;
        assert!((tank.muzzle() - Vec2::new(125.0, 100.0)).length() < 1e-4);
    }
}
