//! Geometry shared between the window model and its collaborators
//!
//! Logical coordinates are `f64` so animated positions and scaled legacy
//! surfaces can be represented without rounding.

use std::ops::{Add, AddAssign, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A 2D point or size in logical coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise clamp. Unlike `f64::clamp` this never panics: when
    /// `min > max` on an axis, `min` wins.
    pub fn clamp(self, min: Vec2, max: Vec2) -> Self {
        Self {
            x: self.x.min(max.x).max(min.x),
            y: self.y.min(max.y).max(min.y),
        }
    }

    pub fn floor(self) -> Self {
        Self::new(self.x.floor(), self.y.floor())
    }

    pub fn round(self) -> Self {
        Self::new(self.x.round(), self.y.round())
    }

    /// Width over height, `None` for degenerate sizes
    pub fn aspect(self) -> Option<f64> {
        if self.x <= 0.0 || self.y <= 0.0 {
            None
        } else {
            Some(self.x / self.y)
        }
    }

    pub fn max_components(self, other: Vec2) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;

    fn div(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

/// Space a decoration (or a reserved area) occupies around a box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Extents {
    /// Left/top thickness
    pub top_left: Vec2,
    /// Right/bottom thickness
    pub bottom_right: Vec2,
}

impl Extents {
    pub const fn uniform(size: f64) -> Self {
        Self {
            top_left: Vec2::new(size, size),
            bottom_right: Vec2::new(size, size),
        }
    }

    pub fn add_extents(&mut self, other: Extents) {
        self.top_left += other.top_left;
        self.bottom_right += other.bottom_right;
    }

    /// Component-wise maximum, used when decorations overlap instead of stacking
    pub fn max_extents(self, other: Extents) -> Extents {
        Extents {
            top_left: self.top_left.max_components(other.top_left),
            bottom_right: self.bottom_right.max_components(other.bottom_right),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top_left == Vec2::ZERO && self.bottom_right == Vec2::ZERO
    }
}

/// An axis-aligned box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_parts(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn middle(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Grow the box outward by `extents`
    pub fn add_extents(self, extents: Extents) -> Rect {
        Rect {
            x: self.x - extents.top_left.x,
            y: self.y - extents.top_left.y,
            width: self.width + extents.top_left.x + extents.bottom_right.x,
            height: self.height + extents.top_left.y + extents.bottom_right.y,
        }
    }

    /// Shrink the box inward by `extents` (reserved areas, gaps)
    pub fn shrink_by(self, extents: Extents) -> Rect {
        Rect {
            x: self.x + extents.top_left.x,
            y: self.y + extents.top_left.y,
            width: (self.width - extents.top_left.x - extents.bottom_right.x).max(0.0),
            height: (self.height - extents.top_left.y - extents.bottom_right.y).max(0.0),
        }
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}
