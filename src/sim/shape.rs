//! Geometry primitives: axis-aligned rectangles, circles and penetration vectors
//!
//! Rectangles are stored as top-left position plus size in screen space
//! (y grows downward), so `top() < bottom()`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn top_left(&self) -> Vec2 {
        self.pos
    }

    pub fn top_right(&self) -> Vec2 {
        Vec2::new(self.right(), self.top())
    }

    pub fn bottom_left(&self) -> Vec2 {
        Vec2::new(self.left(), self.bottom())
    }

    pub fn bottom_right(&self) -> Vec2 {
        Vec2::new(self.right(), self.bottom())
    }

    /// Same rectangle moved by `offset`
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            pos: self.pos + offset,
            size: self.size,
        }
    }

    /// Point containment (edges inclusive on the top-left, exclusive on the bottom-right)
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Strict overlap: rectangles that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Inclusive overlap: shared edges count (used by the broad-phase)
    pub fn touches(&self, other: &Rect) -> bool {
        self.left() <= other.right()
            && self.right() >= other.left()
            && self.top() <= other.bottom()
            && self.bottom() >= other.top()
    }

    /// Closest point inside the rectangle to `point`
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.left(), self.right()),
            point.y.clamp(self.top(), self.bottom()),
        )
    }

    /// True when both dimensions are finite and strictly positive
    pub fn is_well_formed(&self) -> bool {
        self.pos.is_finite() && self.size.is_finite() && self.size.x > 0.0 && self.size.y > 0.0
    }
}

/// A circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Axis-aligned bounds of the circle
    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(
            self.center - Vec2::splat(self.radius),
            Vec2::splat(self.radius * 2.0),
        )
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        let closest = rect.closest_point(self.center);
        self.center.distance_squared(closest) < self.radius * self.radius
    }

    pub fn intersects_circle(&self, other: &Circle) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) < reach * reach
    }
}

/// A collision shape in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect(Rect),
    Circle(Circle),
}

impl Shape {
    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rect(rect) => *rect,
            Shape::Circle(circle) => circle.bounds(),
        }
    }

    /// Exact overlap test against a rectangle
    pub fn overlaps_rect(&self, rect: &Rect) -> bool {
        match self {
            Shape::Rect(own) => own.intersects(rect),
            Shape::Circle(circle) => circle.intersects_rect(rect),
        }
    }

    /// Exact overlap test between two shapes
    pub fn overlaps(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Rect(a), Shape::Rect(b)) => a.intersects(b),
            (Shape::Rect(r), Shape::Circle(c)) | (Shape::Circle(c), Shape::Rect(r)) => {
                c.intersects_rect(r)
            }
            (Shape::Circle(a), Shape::Circle(b)) => a.intersects_circle(b),
        }
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        match self {
            Shape::Rect(rect) => rect.contains_point(point),
            Shape::Circle(circle) => circle.contains_point(point),
        }
    }
}

/// Side on which the other participant lies, relative to self
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    /// Other is below self (a supporting surface in screen space)
    Up,
    /// Other is above self
    Down,
}

impl Side {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

/// Classify a penetration vector. The x axis is tested before y; a zero vector
/// has no side.
pub fn side_of(penetration: Vec2) -> Option<Side> {
    if penetration.x > 0.0 {
        Some(Side::Right)
    } else if penetration.x < 0.0 {
        Some(Side::Left)
    } else if penetration.y > 0.0 {
        Some(Side::Up)
    } else if penetration.y < 0.0 {
        Some(Side::Down)
    } else {
        None
    }
}

/// Minimum separating vector of `other` relative to `own`
///
/// Moving `own` by `-penetration` separates the two rectangles. Overlap is
/// measured independently on each axis and the axis with the smaller overlap
/// wins; equal overlaps resolve to the horizontal axis. The sign points from
/// `own` toward `other`. Non-overlapping rectangles yield zero.
pub fn penetration(own: &Rect, other: &Rect) -> Vec2 {
    let overlap_x = own.right().min(other.right()) - own.left().max(other.left());
    let overlap_y = own.bottom().min(other.bottom()) - own.top().max(other.top());
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return Vec2::ZERO;
    }

    let own_center = own.center();
    let other_center = other.center();
    if overlap_x <= overlap_y {
        let dx = if own_center.x < other_center.x {
            overlap_x
        } else {
            -overlap_x
        };
        Vec2::new(dx, 0.0)
    } else {
        let dy = if own_center.y < other_center.y {
            overlap_y
        } else {
            -overlap_y
        };
        Vec2::new(0.0, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Vec2::new(25.0, 40.0));
    }

    #[test]
    fn test_rect_intersects_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        let overlapping = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(!a.intersects(&touching));
        assert!(a.touches(&touching));
        assert!(a.intersects(&overlapping));
    }

    #[test]
    fn test_circle_rect_corner_miss() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Bounds overlap the corner but the circle itself does not
        let circle = Circle::new(Vec2::new(13.0, 13.0), 4.0);
        assert!(circle.bounds().intersects(&rect));
        assert!(!circle.intersects_rect(&rect));

        let circle = Circle::new(Vec2::new(12.0, 5.0), 4.0);
        assert!(circle.intersects_rect(&rect));
    }

    #[test]
    fn test_penetration_picks_least_overlap_axis() {
        let body = Rect::new(0.0, 0.0, 16.0, 24.0);
        // Floor below, 2 px of vertical overlap
        let floor = Rect::new(-100.0, 22.0, 300.0, 50.0);
        assert_eq!(penetration(&body, &floor), Vec2::new(0.0, 2.0));
        // Wall to the left, 3 px of horizontal overlap
        let wall = Rect::new(-50.0, -100.0, 53.0, 300.0);
        assert_eq!(penetration(&body, &wall), Vec2::new(-3.0, 0.0));
    }

    #[test]
    fn test_penetration_tie_resolves_horizontally() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(8.0, 8.0, 10.0, 10.0);
        let p = penetration(&a, &b);
        assert_eq!(p, Vec2::new(2.0, 0.0));
        assert_eq!(side_of(p), Some(Side::Right));
    }

    #[test]
    fn test_penetration_none_when_separate() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert_eq!(penetration(&a, &b), Vec2::ZERO);
        assert_eq!(side_of(Vec2::ZERO), None);
    }

    #[test]
    fn test_side_of_checks_x_first() {
        assert_eq!(side_of(Vec2::new(1.0, 5.0)), Some(Side::Right));
        assert_eq!(side_of(Vec2::new(-1.0, -5.0)), Some(Side::Left));
        assert_eq!(side_of(Vec2::new(0.0, 5.0)), Some(Side::Up));
        assert_eq!(side_of(Vec2::new(0.0, -5.0)), Some(Side::Down));
    }

    #[test]
    fn test_shape_overlaps() {
        let rect = Shape::Rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let near = Shape::Circle(Circle::new(Vec2::new(5.0, -2.0), 3.0));
        let far = Shape::Circle(Circle::new(Vec2::new(50.0, 50.0), 3.0));
        assert!(rect.overlaps(&near));
        assert!(near.overlaps(&rect));
        assert!(!rect.overlaps(&far));
        assert!(near.contains_point(Vec2::new(5.0, -1.0)));
    }
}
