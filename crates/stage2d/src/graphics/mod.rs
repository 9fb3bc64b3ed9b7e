//! Drawable capability and the canvas boundary
//!
//! Rendering is split across two traits. [`Graphic`] is the capability an
//! entity's visuals implement: report a size, toggle visibility, and emit
//! draw commands for a given camera-space placement. [`Canvas`] is the
//! output device those commands target. The engine core never talks to a
//! windowing or GPU API directly; a backend implements [`Canvas`] and the
//! core stays platform-free.
//!
//! [`RecordingCanvas`] is the built-in backend: it stores every command it
//! receives, which serves both headless runs and draw-order assertions in
//! tests.

mod recording;
mod shapes;

pub use recording::{DrawCall, RecordingCanvas};
pub use shapes::{CircleShape, RectangleShape};

use crate::foundation::math::Vec2;
use crate::geometry::Transform;

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel, 255 is opaque
    pub a: u8,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque red
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Opaque color from red, green, and blue channels
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from all four channels
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Capability implemented by anything an entity can display.
///
/// `placement` in [`draw`](Self::draw) is the graphic's full camera-space
/// transform, already resolved through the owning entity's coordinate frame;
/// implementations only translate their own geometry into canvas commands.
pub trait Graphic {
    /// Axis-aligned extent of the graphic in its own coordinates
    fn size(&self) -> Vec2;

    /// Whether the graphic is currently drawn
    fn is_visible(&self) -> bool;

    /// Show or hide the graphic without detaching it
    fn set_visible(&mut self, visible: bool);

    /// Emit this graphic's draw commands onto the canvas
    fn draw(&self, placement: &Transform, canvas: &mut dyn Canvas);
}

/// Output device for draw commands emitted by [`Graphic`] implementations
pub trait Canvas {
    /// Draw an axis-sized rectangle at the given placement
    fn rect(&mut self, placement: &Transform, size: Vec2, color: Color);

    /// Draw a circle of the given radius at the given placement
    fn circle(&mut self, placement: &Transform, radius: f32, color: Color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_constructors() {
        assert_eq!(Color::rgb(1, 2, 3).a, 255);
        assert_eq!(Color::rgba(1, 2, 3, 4).a, 4);
        assert_eq!(Color::default(), Color::WHITE);
    }
}
