//! Mouse state tracking

use std::collections::HashSet;

use crate::foundation::math::Vec2;

/// Mouse buttons the engine tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// The left mouse button
    Left,
    /// The right mouse button
    Right,
    /// The middle mouse button or wheel click
    Middle,
}

/// Polled mouse state for the current frame.
///
/// Position is in window coordinates. Button edge sets and the wheel delta
/// reset when the next frame begins; the held-button set and position carry
/// across frames.
#[derive(Debug)]
pub struct Mouse {
    position: Vec2,
    down: HashSet<MouseButton>,
    pressed: HashSet<MouseButton>,
    released: HashSet<MouseButton>,
    wheel_delta: f32,
}

impl Default for Mouse {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            down: HashSet::new(),
            pressed: HashSet::new(),
            released: HashSet::new(),
            wheel_delta: 0.0,
        }
    }
}

impl Mouse {
    /// Current cursor position in window coordinates
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Whether the button is currently held
    pub fn is_down(&self, button: MouseButton) -> bool {
        self.down.contains(&button)
    }

    /// Whether the button went down this frame
    pub fn was_pressed(&self, button: MouseButton) -> bool {
        self.pressed.contains(&button)
    }

    /// Whether the button came up this frame
    pub fn was_released(&self, button: MouseButton) -> bool {
        self.released.contains(&button)
    }

    /// Total wheel movement this frame, positive away from the user
    pub fn wheel_delta(&self) -> f32 {
        self.wheel_delta
    }

    pub(crate) fn begin_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
        self.wheel_delta = 0.0;
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub(crate) fn press(&mut self, button: MouseButton) {
        if self.down.insert(button) {
            self.pressed.insert(button);
        }
    }

    pub(crate) fn release(&mut self, button: MouseButton) {
        if self.down.remove(&button) {
            self.released.insert(button);
        }
    }

    pub(crate) fn scroll(&mut self, delta: f32) {
        self.wheel_delta += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::vec2;

    #[test]
    fn test_position_survives_frame_boundary() {
        let mut mouse = Mouse::default();
        mouse.set_position(vec2(10.0, 20.0));
        mouse.begin_frame();
        assert_eq!(mouse.position(), vec2(10.0, 20.0));
    }

    #[test]
    fn test_wheel_accumulates_within_a_frame() {
        let mut mouse = Mouse::default();
        mouse.scroll(1.0);
        mouse.scroll(0.5);
        assert_eq!(mouse.wheel_delta(), 1.5);
        mouse.begin_frame();
        assert_eq!(mouse.wheel_delta(), 0.0);
    }

    #[test]
    fn test_button_edges() {
        let mut mouse = Mouse::default();
        mouse.press(MouseButton::Left);
        assert!(mouse.was_pressed(MouseButton::Left));
        mouse.begin_frame();
        mouse.release(MouseButton::Left);
        assert!(mouse.was_released(MouseButton::Left));
        assert!(!mouse.is_down(MouseButton::Left));
    }
}
