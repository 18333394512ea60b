//! Pointer input surface
//!
//! Touches and a pressed mouse button both become [`Pointer`]s. Simulations
//! only see the [`InputSurface`] trait: a snapshot of the live pointers in
//! canvas coordinates. The split-screen helpers map a pointer to the player
//! whose side of the table it is on.

use glam::Vec2;

use crate::sim::Player;

/// Largest drift (px) a press may have and still count as a tap
pub const TAP_MAX_DISTANCE: f32 = 10.0;
/// Longest press (ms) that still counts as a tap
pub const TAP_MAX_MS: f64 = 300.0;

/// Identifier the platform assigns to a touch or the mouse
pub type PointerId = i32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub id: PointerId,
    pub position: Vec2,
    pub start: Vec2,
    pub start_ms: f64,
}

/// Read-only view of the active pointers. Order carries no meaning.
pub trait InputSurface {
    fn pointers(&self) -> &[Pointer];
}

impl InputSurface for Vec<Pointer> {
    fn pointers(&self) -> &[Pointer] {
        self
    }
}

/// Collects pointer events from the platform
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    pointers: Vec<Pointer>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_down(&mut self, id: PointerId, position: Vec2, now_ms: f64) {
        self.pointer_up(id);
        self.pointers.push(Pointer {
            id,
            position,
            start: position,
            start_ms: now_ms,
        });
    }

    /// Moves of pointers that are not pressed are ignored
    pub fn pointer_move(&mut self, id: PointerId, position: Vec2) {
        if let Some(p) = self.pointers.iter_mut().find(|p| p.id == id) {
            p.position = position;
        }
    }

    pub fn pointer_up(&mut self, id: PointerId) {
        self.pointers.retain(|p| p.id != id);
    }

    /// Forget every pointer (orientation change, state transitions)
    pub fn clear(&mut self) {
        self.pointers.clear();
    }

    pub fn get(&self, id: PointerId) -> Option<&Pointer> {
        self.pointers.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn duration_ms(&self, id: PointerId, now_ms: f64) -> f64 {
        self.get(id).map_or(0.0, |p| now_ms - p.start_ms)
    }

    pub fn travel(&self, id: PointerId) -> f32 {
        self.get(id).map_or(0.0, |p| p.position.distance(p.start))
    }

    /// Short press that barely moved
    pub fn is_tap(&self, id: PointerId, now_ms: f64) -> bool {
        self.get(id).is_some()
            && self.travel(id) <= TAP_MAX_DISTANCE
            && self.duration_ms(id, now_ms) <= TAP_MAX_MS
    }
}

impl InputSurface for PointerTracker {
    fn pointers(&self) -> &[Pointer] {
        &self.pointers
    }
}

/// How the screen is divided between the two players
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// Bottom half for player one, top half for player two
    Halves,
    /// Bottom-left quadrant for player one, top-right for player two
    Quadrants,
}

impl Split {
    pub fn owner(&self, point: Vec2, viewport: Vec2) -> Option<Player> {
        let half = viewport / 2.0;
        match self {
            Split::Halves => {
                if point.y > half.y {
                    Some(Player::One)
                } else if point.y < half.y {
                    Some(Player::Two)
                } else {
                    None
                }
            }
            Split::Quadrants => {
                if point.y > half.y && point.x < half.x {
                    Some(Player::One)
                } else if point.y < half.y && point.x > half.x {
                    Some(Player::Two)
                } else {
                    None
                }
            }
        }
    }
}

/// Rotate a point 180° about the viewport centre
#[inline]
pub fn mirror(point: Vec2, viewport: Vec2) -> Vec2 {
    viewport - point
}

/// Effective control point for `player`: the first pointer on their side,
/// rotated into their frame (player one faces the screen upside down).
pub fn control_point(
    input: &dyn InputSurface,
    viewport: Vec2,
    player: Player,
    split: Split,
) -> Option<Vec2> {
    let pointer = input
        .pointers()
        .iter()
        .find(|p| split.owner(p.position, viewport) == Some(player))?;
    Some(match player {
        Player::One => mirror(pointer.position, viewport),
        Player::Two => pointer.position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Vec2 = Vec2::new(800.0, 400.0);

    #[test]
    fn test_down_move_up() {
        let mut t = PointerTracker::new();
        t.pointer_down(1, Vec2::new(10.0, 10.0), 0.0);
        t.pointer_move(1, Vec2::new(20.0, 10.0));
        t.pointer_move(9, Vec2::new(99.0, 99.0));
        assert_eq!(t.len(), 1);
        assert_eq!(t.get(1).unwrap().position, Vec2::new(20.0, 10.0));
        assert_eq!(t.travel(1), 10.0);
        t.pointer_up(1);
        assert!(t.is_empty());
    }

    #[test]
    fn test_tap_detection() {
        let mut t = PointerTracker::new();
        t.pointer_down(1, Vec2::new(100.0, 100.0), 1000.0);
        t.pointer_move(1, Vec2::new(105.0, 100.0));
        assert!(t.is_tap(1, 1200.0));
        assert!(!t.is_tap(1, 1400.0));
        t.pointer_move(1, Vec2::new(120.0, 100.0));
        assert!(!t.is_tap(1, 1200.0));
        assert!(!t.is_tap(2, 1200.0));
    }

    #[test]
    fn test_halves_split_and_mirror() {
        let pointers = vec![Pointer {
            id: 1,
            position: Vec2::new(100.0, 300.0),
            start: Vec2::ZERO,
            start_ms: 0.0,
        }];
        let p1 = control_point(&pointers, VIEW, Player::One, Split::Halves);
        assert_eq!(p1, Some(Vec2::new(700.0, 100.0)));
        assert_eq!(control_point(&pointers, VIEW, Player::Two, Split::Halves), None);
    }

    #[test]
    fn test_quadrants_ignore_off_diagonal() {
        assert_eq!(Split::Quadrants.owner(Vec2::new(600.0, 300.0), VIEW), None);
        assert_eq!(Split::Quadrants.owner(Vec2::new(100.0, 100.0), VIEW), None);
        assert_eq!(Split::Quadrants.owner(Vec2::new(100.0, 300.0), VIEW), Some(Player::One));
        assert_eq!(Split::Quadrants.owner(Vec2::new(600.0, 100.0), VIEW), Some(Player::Two));
        // Exactly on the divider belongs to nobody
        assert_eq!(Split::Halves.owner(Vec2::new(100.0, 200.0), VIEW), None);
    }
}
