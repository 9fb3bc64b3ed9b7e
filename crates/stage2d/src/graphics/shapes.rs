//! Primitive shape graphics

use crate::foundation::math::{vec2, Vec2};
use crate::geometry::Transform;

use super::{Canvas, Color, Graphic};

/// Solid axis-aligned rectangle
#[derive(Debug, Clone)]
pub struct RectangleShape {
    size: Vec2,
    color: Color,
    visible: bool,
}

impl RectangleShape {
    /// Create a rectangle with the given extent, drawn in white
    #[must_use]
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            color: Color::WHITE,
            visible: true,
        }
    }

    /// Set the fill color
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Current fill color
    pub fn color(&self) -> Color {
        self.color
    }

    /// Change the fill color in place
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

impl Graphic for RectangleShape {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn draw(&self, placement: &Transform, canvas: &mut dyn Canvas) {
        canvas.rect(placement, self.size, self.color);
    }
}

/// Solid circle, sized by radius
#[derive(Debug, Clone)]
pub struct CircleShape {
    radius: f32,
    color: Color,
    visible: bool,
}

impl CircleShape {
    /// Create a circle with the given radius, drawn in white
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            color: Color::WHITE,
            visible: true,
        }
    }

    /// Set the fill color
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Circle radius
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Graphic for CircleShape {
    fn size(&self) -> Vec2 {
        vec2(self.radius * 2.0, self.radius * 2.0)
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn draw(&self, placement: &Transform, canvas: &mut dyn Canvas) {
        canvas.circle(placement, self.radius, self.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_size_spans_diameter() {
        let circle = CircleShape::new(4.0);
        assert_eq!(circle.size(), vec2(8.0, 8.0));
    }

    #[test]
    fn test_visibility_toggles() {
        let mut rect = RectangleShape::new(vec2(2.0, 3.0));
        assert!(rect.is_visible());
        rect.set_visible(false);
        assert!(!rect.is_visible());
    }

    #[test]
    fn test_builder_sets_color() {
        let rect = RectangleShape::new(vec2(1.0, 1.0)).with_color(Color::RED);
        assert_eq!(rect.color(), Color::RED);
    }
}
