//! Axis-aligned bounding-box overlap tests
//!
//! Every entity in the simulation is a rectangle; two rectangles intersect
//! iff each one's near edge is strictly before the other's far edge on both
//! axes. Touching edges do not count as contact.

use glam::Vec2;

/// An axis-aligned rectangle: top-left corner plus extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
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

    /// Center point, used to place explosions
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        rects_intersect(self, other)
    }
}

/// Strict AABB overlap test
#[inline]
pub fn rects_intersect(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}
