//! Axis-aligned rectangles in screen space (y grows downward)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{ArcadeError, Result};

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    /// Create a rectangle, rejecting zero, negative or non-finite sizes
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Result<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) || !x.is_finite() || !y.is_finite() {
            return Err(ArcadeError::InvalidGeometry { width, height });
        }
        Ok(Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        })
    }

    /// Create a rectangle centered on `center`
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Result<Self> {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
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

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.pos = center - self.size * 0.5;
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// True if `other` lies entirely within this rectangle
    pub fn contains(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    /// Overlap depth along each axis (zero or negative when apart)
    pub fn penetration(&self, other: &Rect) -> Vec2 {
        Vec2::new(
            (self.right() - other.left()).min(other.right() - self.left()),
            (self.bottom() - other.top()).min(other.bottom() - self.top()),
        )
    }

    /// Move this rectangle so it lies inside `(0, 0)..(width, height)`.
    /// Rectangles larger than the area are pinned to the top-left.
    pub fn clamp_inside(&mut self, width: f32, height: f32) {
        self.pos.x = self.pos.x.min(width - self.size.x).max(0.0);
        self.pos.y = self.pos.y.min(height - self.size.y).max(0.0);
    }
}
