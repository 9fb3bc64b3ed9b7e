//! Input events and polled per-frame state
//!
//! The engine does not open a window, so input arrives as [`InputEvent`]
//! values fed in by the host, a platform shell in production or a script in
//! tests. Fed events queue up and are applied in order when the next frame
//! begins; during the frame, game code polls the resulting [`Input`]
//! snapshot. Held state persists across frames while pressed/released edges
//! are valid for exactly one frame.
//!
//! The factory functions at the bottom build ready-made event conditions
//! from input queries, for wiring keys straight into an event handler:
//!
//! ```ignore
//! world.connect_boxed(input::key_pressed(Key::Escape), Box::new(|_, cx| {
//!     cx.requests.pop_world();
//! }));
//! ```

mod keyboard;
mod mouse;

pub use keyboard::{Key, Keyboard, Modifiers};
pub use mouse::{Mouse, MouseButton};

use crate::context::Context;
use crate::events::Condition;
use crate::foundation::math::Vec2;
use crate::world::World;

/// An input occurrence reported by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A key went down
    KeyPressed {
        /// The key that went down
        key: Key,
        /// Modifiers held at the time
        modifiers: Modifiers,
    },
    /// A key came up
    KeyReleased {
        /// The key that came up
        key: Key,
        /// Modifiers held at the time
        modifiers: Modifiers,
    },
    /// The cursor moved
    MouseMoved {
        /// New cursor position in window coordinates
        position: Vec2,
    },
    /// A mouse button went down
    MouseButtonPressed {
        /// The button that went down
        button: MouseButton,
    },
    /// A mouse button came up
    MouseButtonReleased {
        /// The button that came up
        button: MouseButton,
    },
    /// The wheel scrolled
    WheelScrolled {
        /// Scroll amount, positive away from the user
        delta: f32,
    },
    /// The host asked to close
    CloseRequested,
}

/// Queued events plus the polled state they produce
#[derive(Debug, Default)]
pub struct Input {
    keyboard: Keyboard,
    mouse: Mouse,
    queue: Vec<InputEvent>,
    close_requested: bool,
}

impl Input {
    /// Create input state with nothing pressed
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keyboard state for the current frame
    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    /// Mouse state for the current frame
    pub fn mouse(&self) -> &Mouse {
        &self.mouse
    }

    /// Whether the host has asked to close
    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Queue an event for the next frame
    pub fn feed(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    /// Reset the edge sets and apply all queued events
    pub(crate) fn begin_frame(&mut self) {
        self.keyboard.begin_frame();
        self.mouse.begin_frame();
        for event in self.queue.drain(..) {
            match event {
                InputEvent::KeyPressed { key, modifiers } => self.keyboard.press(key, modifiers),
                InputEvent::KeyReleased { key, modifiers } => self.keyboard.release(key, modifiers),
                InputEvent::MouseMoved { position } => self.mouse.set_position(position),
                InputEvent::MouseButtonPressed { button } => self.mouse.press(button),
                InputEvent::MouseButtonReleased { button } => self.mouse.release(button),
                InputEvent::WheelScrolled { delta } => self.mouse.scroll(delta),
                InputEvent::CloseRequested => self.close_requested = true,
            }
        }
    }
}

/// Condition that holds while the key is held down
pub fn key_down(key: Key) -> Condition {
    Box::new(move |_world: &World, cx: &Context<'_>| cx.input.keyboard().is_down(key))
}

/// Condition that holds on the frame the key goes down
pub fn key_pressed(key: Key) -> Condition {
    Box::new(move |_world: &World, cx: &Context<'_>| cx.input.keyboard().was_pressed(key))
}

/// Condition that holds on the frame the key comes up
pub fn key_released(key: Key) -> Condition {
    Box::new(move |_world: &World, cx: &Context<'_>| cx.input.keyboard().was_released(key))
}

/// Condition that holds on the frame the mouse button goes down
pub fn button_pressed(button: MouseButton) -> Condition {
    Box::new(move |_world: &World, cx: &Context<'_>| cx.input.mouse().was_pressed(button))
}
