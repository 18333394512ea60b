//! Collision response shared by the simulations
//!
//! Detection is plain shape overlap from `geometry`; this module decides what
//! happens after an overlap: which axis a brick deflects along, and the
//! impulse exchanged between a puck and a mallet.

use glam::Vec2;

use super::ball::Ball;
use super::paddle::Mallet;
use crate::geometry::{Circle, Rect};

/// Share of the mallet's velocity handed to the puck on contact
pub const MALLET_CARRY: f32 = 0.3;
/// Share of the impulse pushed back into the mallet
pub const MALLET_RECOIL: f32 = 0.1;

/// Result of a circle/circle overlap check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the second circle toward the first
    pub normal: Vec2,
    /// Overlap depth along the normal
    pub penetration: f32,
}

/// Overlap between two circles. Concentric circles have no usable normal and
/// report no contact.
pub fn circle_contact(a: &Circle, b: &Circle) -> Option<Contact> {
    let delta = a.center - b.center;
    let distance = delta.length();
    let min_distance = a.radius + b.radius;
    if distance >= min_distance || distance <= 0.0 {
        return None;
    }
    Some(Contact {
        normal: delta / distance,
        penetration: min_distance - distance,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Axis along which a ball should bounce off a struck block: the one with the
/// larger centre offset.
pub fn deflection_axis(ball_center: Vec2, block: &Rect) -> Axis {
    let offset = ball_center - block.center();
    if offset.x.abs() > offset.y.abs() {
        Axis::Horizontal
    } else {
        Axis::Vertical
    }
}

/// Negate the velocity component along `axis`
pub fn flip(velocity: Vec2, axis: Axis) -> Vec2 {
    match axis {
        Axis::Horizontal => Vec2::new(-velocity.x, velocity.y),
        Axis::Vertical => Vec2::new(velocity.x, -velocity.y),
    }
}

/// Resolve a puck/mallet overlap. The puck is pushed out along the contact
/// normal; an impulse is exchanged only while the two are approaching, so a
/// separating contact never gains energy. Returns true if an impulse applied.
pub fn strike_puck(puck: &mut Ball, mallet: &mut Mallet, restitution: f32) -> bool {
    let Some(contact) = circle_contact(&puck.circle(), &mallet.circle()) else {
        return false;
    };
    puck.body.position += contact.normal * contact.penetration;

    let relative = puck.body.velocity - mallet.body.velocity;
    let along_normal = relative.dot(contact.normal);
    if along_normal > 0.0 {
        return false;
    }

    let impulse = -(1.0 + restitution) * along_normal / 2.0;
    puck.body.velocity += contact.normal * impulse;
    mallet.body.velocity -= contact.normal * impulse * MALLET_RECOIL;
    puck.body.velocity += mallet.body.velocity * MALLET_CARRY;
    puck.limit_speed();
    mallet.hit();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Player;
    use proptest::prelude::*;

    fn puck_at(position: Vec2, velocity: Vec2) -> Ball {
        let mut puck = Ball::puck(position, 12.0, 250.0, 600.0);
        puck.body.velocity = velocity;
        puck
    }

    #[test]
    fn test_circle_contact_normal() {
        let a = Circle::new(Vec2::new(30.0, 0.0), 12.0);
        let b = Circle::new(Vec2::ZERO, 25.0);
        let c = circle_contact(&a, &b).unwrap();
        assert_eq!(c.normal, Vec2::X);
        assert!((c.penetration - 7.0).abs() < 1e-5);
        assert!(circle_contact(&b, &b).is_none());
    }

    #[test]
    fn test_deflection_axis() {
        let brick = Rect::new(100.0, 100.0, 38.0, 18.0);
        assert_eq!(deflection_axis(Vec2::new(150.0, 109.0), &brick), Axis::Horizontal);
        assert_eq!(deflection_axis(Vec2::new(119.0, 125.0), &brick), Axis::Vertical);
        assert_eq!(flip(Vec2::new(3.0, 4.0), Axis::Vertical), Vec2::new(3.0, -4.0));
    }

    #[test]
    fn test_head_on_strike_slows_approach() {
        let mut mallet = Mallet::new(Vec2::ZERO, 25.0, Player::One, 720.0);
        let mut puck = puck_at(Vec2::new(30.0, 0.0), Vec2::new(-200.0, 0.0));
        assert!(strike_puck(&mut puck, &mut mallet, 0.8));
        // Pushed clear of the mallet
        assert!((puck.body.position.x - 37.0).abs() < 1e-4);
        let approach_after = -(puck.body.velocity - mallet.body.velocity).x;
        assert!(approach_after < 200.0);
    }

    proptest! {
        #[test]
        fn prop_separating_contact_gets_no_impulse(
            angle in 0.0f32..6.28,
            speed in 0.0f32..500.0,
            mallet_speed in 0.0f32..300.0,
        ) {
            let normal = Vec2::from_angle(angle);
            let mut mallet = Mallet::new(Vec2::ZERO, 25.0, Player::Two, 720.0);
            // Mallet drifting away while the puck flies away along the normal
            mallet.body.velocity = -normal * mallet_speed;
            let puck_velocity = normal * speed;
            let mut puck = puck_at(normal * 30.0, puck_velocity);
            let mallet_velocity = mallet.body.velocity;

            let applied = strike_puck(&mut puck, &mut mallet, 0.8);
            let separating = (puck_velocity - mallet_velocity).dot(normal) > 0.0;
            if separating {
                prop_assert!(!applied);
                prop_assert_eq!(puck.body.velocity, puck_velocity);
                prop_assert_eq!(mallet.body.velocity, mallet_velocity);
            }
        }
    }
}
