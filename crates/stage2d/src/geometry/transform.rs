//! 2D transform value algebra
//!
//! [`Transform`] packs position, rotation, origin, and zoom into one value
//! with composition and inversion operators. Rotation is stored in degrees
//! and converted to radians only at the point of use. Every operation
//! returns a new value; nothing here mutates in place.

use crate::foundation::math::{utils, Vec2};

/// A 2D spatial transform: translate, rotate (degrees), and zoom, with an
/// origin acting as the pivot when composing onto child transforms.
///
/// `origin` is deliberately not part of the invertible group: [`inverse`]
/// resets it to zero rather than inverting it. See the method docs.
///
/// [`inverse`]: Transform::inverse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation applied after rotation and zoom
    pub position: Vec2,
    /// Rotation in degrees, counterclockwise
    pub rotation: f32,
    /// Pivot subtracted from a child's position when composing
    pub origin: Vec2,
    /// Uniform scale factor; this layer never checks it for zero
    pub zoom: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            origin: Vec2::zeros(),
            zoom: 1.0,
        }
    }
}

impl Transform {
    /// The identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only a position
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with only a rotation in degrees
    pub fn from_rotation(rotation: f32) -> Self {
        Self {
            rotation,
            ..Default::default()
        }
    }

    /// Builder-style position replacement
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Builder-style rotation replacement, in degrees
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder-style origin replacement
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Builder-style zoom replacement
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Apply the transform to a point: rotate, zoom, then translate.
    ///
    /// The origin plays no part here; it only matters in [`compose`].
    ///
    /// [`compose`]: Transform::compose
    pub fn apply(&self, point: Vec2) -> Vec2 {
        self.position + utils::rotate_deg(point, self.rotation) * self.zoom
    }

    /// Compose two transforms such that
    /// `self.compose(other).apply(p) == self.apply(other.apply(p))`
    /// whenever `self.origin` is zero.
    ///
    /// The child's position is shifted into this transform's origin-relative
    /// space before rotating and zooming. Rotations add, zooms multiply, and
    /// the resulting origin is inherited from `other`.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            position: self.position
                + utils::rotate_deg(other.position - self.origin, self.rotation) * self.zoom,
            rotation: self.rotation + other.rotation,
            origin: other.origin,
            zoom: self.zoom * other.zoom,
        }
    }

    /// The transform undoing this one's position, rotation, and zoom.
    ///
    /// The origin is reset to zero, not inverted, so this is only a true
    /// inverse for transforms whose origin is zero. Zoom is reciprocated
    /// without a zero check; inverting a zero-zoom transform is a caller
    /// error.
    pub fn inverse(&self) -> Self {
        let inv_zoom = 1.0 / self.zoom;
        Self {
            position: utils::rotate_deg(-self.position, -self.rotation) * inv_zoom,
            rotation: -self.rotation,
            origin: Vec2::zeros(),
            zoom: inv_zoom,
        }
    }
}
