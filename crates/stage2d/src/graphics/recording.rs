//! Canvas backend that records draw commands instead of rasterizing

use crate::foundation::math::Vec2;
use crate::geometry::Transform;

use super::{Canvas, Color};

/// One recorded draw command
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// A rectangle was drawn
    Rect {
        /// Camera-space placement the rectangle was drawn at
        placement: Transform,
        /// Rectangle extent
        size: Vec2,
        /// Fill color
        color: Color,
    },
    /// A circle was drawn
    Circle {
        /// Camera-space placement the circle was drawn at
        placement: Transform,
        /// Circle radius
        radius: f32,
        /// Fill color
        color: Color,
    },
}

impl DrawCall {
    /// Camera-space placement of the command
    pub fn placement(&self) -> &Transform {
        match self {
            Self::Rect { placement, .. } | Self::Circle { placement, .. } => placement,
        }
    }
}

/// Canvas that appends every command to a list.
///
/// The backend for headless runs and for asserting on draw order in tests:
/// commands land in `calls` in the order the world emitted them.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    /// Commands received so far, oldest first
    pub calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    /// Create an empty recording canvas
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all recorded commands
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn rect(&mut self, placement: &Transform, size: Vec2, color: Color) {
        self.calls.push(DrawCall::Rect {
            placement: *placement,
            size,
            color,
        });
    }

    fn circle(&mut self, placement: &Transform, radius: f32, color: Color) {
        self.calls.push(DrawCall::Circle {
            placement: *placement,
            radius,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::vec2;
    use crate::graphics::{Graphic, RectangleShape};

    #[test]
    fn test_records_commands_in_order() {
        let mut canvas = RecordingCanvas::new();
        let shape = RectangleShape::new(vec2(2.0, 2.0));
        let near = Transform::from_position(vec2(1.0, 0.0));
        let far = Transform::from_position(vec2(5.0, 0.0));

        shape.draw(&near, &mut canvas);
        shape.draw(&far, &mut canvas);

        assert_eq!(canvas.calls.len(), 2);
        assert_eq!(canvas.calls[0].placement().position, vec2(1.0, 0.0));
        assert_eq!(canvas.calls[1].placement().position, vec2(5.0, 0.0));
    }
}
