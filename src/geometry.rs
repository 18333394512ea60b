//! Geometry kernel
//!
//! Screen-space vectors (y grows downward), axis-aligned rectangles and
//! circles. Every shape query here is pure; nothing mutates in place.

use glam::Vec2;

/// Vector helpers not provided directly by glam
pub trait VecExt {
    /// Rotate by `angle` radians (screen space, clockwise for positive angles)
    fn rotated(self, angle: f32) -> Vec2;
    /// Heading in radians, `atan2(y, x)`
    fn heading(self) -> f32;
    /// Unit vector in the same direction, or zero for the zero vector
    fn unit(self) -> Vec2;
}

impl VecExt for Vec2 {
    #[inline]
    fn rotated(self, angle: f32) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    #[inline]
    fn heading(self) -> f32 {
        self.y.atan2(self.x)
    }

    #[inline]
    fn unit(self) -> Vec2 {
        self.normalize_or_zero()
    }
}

/// Vector of length `magnitude` pointing along `angle`
#[inline]
pub fn from_angle(angle: f32, magnitude: f32) -> Vec2 {
    Vec2::from_angle(angle) * magnitude
}

/// Reflect a velocity about a unit surface normal: v - 2(v·n)n
#[inline]
pub fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Clamp that tolerates an inverted range (min wins), unlike `f32::clamp`
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min)
}

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centred on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Edges are inclusive
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Overlap test; touching edges count as intersecting
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right() < other.left()
            || self.left() > other.right()
            || self.bottom() < other.top()
            || self.top() > other.bottom())
    }

    pub fn intersects_circle(&self, circle: &Circle) -> bool {
        circle.intersects_rect(self)
    }

    /// Point inside the rectangle nearest to `point`
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            clamp(point.x, self.left(), self.right()),
            clamp(point.y, self.top(), self.bottom()),
        )
    }

    /// Shrink on every side by `amount`
    pub fn inset(&self, amount: Vec2) -> Rect {
        Rect::new(
            self.x + amount.x,
            self.y + amount.y,
            self.width - 2.0 * amount.x,
            self.height - 2.0 * amount.y,
        )
    }

    /// Clamp a point so it lies inside the rectangle
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        self.closest_point(point)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance(point) <= self.radius
    }

    pub fn intersects_circle(&self, other: &Circle) -> bool {
        self.center.distance(other.center) <= self.radius + other.radius
    }

    /// Distance from the centre to the rectangle's closest point against the radius
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        self.center.distance(rect.closest_point(self.center)) <= self.radius
    }
}

/// Collision bounds an entity reports
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect(Rect),
    Circle(Circle),
}

impl Shape {
    /// Symmetric intersection across every shape pairing
    pub fn intersects(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Rect(a), Shape::Rect(b)) => a.intersects(b),
            (Shape::Circle(a), Shape::Circle(b)) => a.intersects_circle(b),
            (Shape::Circle(c), Shape::Rect(r)) | (Shape::Rect(r), Shape::Circle(c)) => {
                c.intersects_rect(r)
            }
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Shape::Rect(r) => r.contains(point),
            Shape::Circle(c) => c.contains(point),
        }
    }

    pub fn center(&self) -> Vec2 {
        match self {
            Shape::Rect(r) => r.center(),
            Shape::Circle(c) => c.center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(Vec2::ZERO.unit(), Vec2::ZERO);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = Vec2::new(1.0, 0.0).rotated(PI / 2.0);
        assert!((v - Vec2::new(0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_from_angle_and_heading() {
        let v = from_angle(PI / 4.0, 10.0);
        assert!((v.length() - 10.0).abs() < 1e-4);
        assert!((v.heading() - PI / 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_reflect_off_floor() {
        let v = reflect(Vec2::new(3.0, 4.0), Vec2::new(0.0, -1.0));
        assert_eq!(v, Vec2::new(3.0, -4.0));
    }

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Vec2::new(25.0, 40.0));
        assert!(r.contains(Vec2::new(10.0, 60.0)));
        assert!(!r.contains(Vec2::new(9.9, 30.0)));
    }

    #[test]
    fn test_touching_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(10.1, 0.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_circle_rect_corner() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Corner at (10,10); centre 3,4 away diagonally = distance 5
        let near = Circle::new(Vec2::new(13.0, 14.0), 5.0);
        let far = Circle::new(Vec2::new(13.0, 14.0), 4.9);
        assert!(near.intersects_rect(&r));
        assert!(!far.intersects_rect(&r));
    }

    #[test]
    fn test_clamp_inverted_range() {
        assert_eq!(clamp(5.0, 10.0, 0.0), 10.0);
        assert_eq!(clamp(-1.0, 0.0, 4.0), 0.0);
    }

    fn arb_shape() -> impl Strategy<Value = Shape> {
        prop_oneof![
            (-100.0f32..100.0, -100.0f32..100.0, 0.0f32..50.0, 0.0f32..50.0)
                .prop_map(|(x, y, w, h)| Shape::Rect(Rect::new(x, y, w, h))),
            (-100.0f32..100.0, -100.0f32..100.0, 0.0f32..50.0)
                .prop_map(|(x, y, r)| Shape::Circle(Circle::new(Vec2::new(x, y), r))),
        ]
    }

    proptest! {
        #[test]
        fn prop_normalize_is_unit_or_zero(x in -1e4f32..1e4, y in -1e4f32..1e4) {
            let v = Vec2::new(x, y);
            let n = v.unit();
            if v.length() > 1e-6 {
                prop_assert!((n.length() - 1.0).abs() < 1e-3);
            } else {
                prop_assert!(n == Vec2::ZERO || (n.length() - 1.0).abs() < 1e-3);
            }
        }

        #[test]
        fn prop_intersection_is_symmetric(a in arb_shape(), b in arb_shape()) {
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn prop_reflect_preserves_speed(vx in -500.0f32..500.0, vy in -500.0f32..500.0, angle in 0.0f32..6.28) {
            let v = Vec2::new(vx, vy);
            let n = Vec2::from_angle(angle);
            prop_assert!((reflect(v, n).length() - v.length()).abs() < 1e-2);
        }
    }
}
