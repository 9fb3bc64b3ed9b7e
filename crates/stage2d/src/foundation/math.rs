//! Math utilities and types
//!
//! Provides the fundamental math types for 2D simulation and game development.

pub use nalgebra::{Rotation2, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// Shorthand constructor for [`Vec2`]
pub fn vec2(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}

/// Axis-aligned rectangle given as offset plus size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Horizontal offset of the left edge
    pub x: f32,
    /// Vertical offset of the top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rectangle at the origin from a size
    pub fn from_size(size: Vec2) -> Self {
        Self::new(0.0, 0.0, size.x, size.y)
    }

    /// The size of the rectangle
    pub fn size(&self) -> Vec2 {
        vec2(self.w, self.h)
    }

    /// The rectangle translated by the given displacement
    pub fn offset(&self, by: Vec2) -> Self {
        Self::new(self.x + by.x, self.y + by.y, self.w, self.h)
    }

    /// The left edge coordinate
    pub fn left(&self) -> f32 {
        self.x
    }

    /// The right edge coordinate
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// The top edge coordinate
    pub fn top(&self) -> f32 {
        self.y
    }

    /// The bottom edge coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Whether two rectangles overlap
    ///
    /// Touching edges do not count as overlapping; the comparison is strict
    /// on every side.
    pub fn intersects(&self, other: &Self) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Whether the given point lies inside the rectangle (edges inclusive)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Rotation2, Vec2};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Rotate a vector by an angle given in degrees
    pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
        Rotation2::new(deg_to_rad(degrees)) * v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_rotate_deg_quarter_turn() {
        let rotated = utils::rotate_deg(vec2(1.0, 0.0), 90.0);
        assert_relative_eq!(rotated.x, 0.0, epsilon = EPSILON);
        assert_relative_eq!(rotated.y, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_rect_overlap_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        let overlapping = Rect::new(9.0, 0.0, 10.0, 10.0);
        let apart = Rect::new(20.0, 20.0, 5.0, 5.0);

        assert!(!a.intersects(&touching));
        assert!(a.intersects(&overlapping));
        assert!(!a.intersects(&apart));
    }

    #[test]
    fn test_rect_offset() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        let moved = r.offset(vec2(10.0, 20.0));
        assert_relative_eq!(moved.left(), 11.0);
        assert_relative_eq!(moved.bottom(), 26.0);
        assert_relative_eq!(moved.size().x, 3.0);
    }
}
