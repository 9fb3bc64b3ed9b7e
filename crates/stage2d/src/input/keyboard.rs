//! Keyboard state tracking

use std::collections::HashSet;

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held alongside a key event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        /// Either shift key
        const SHIFT = 1;
        /// Either control key
        const CTRL = 1 << 1;
        /// Either alt key
        const ALT = 1 << 2;
    }
}

/// Physical keys the engine tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// The A key
    A,
    /// The B key
    B,
    /// The C key
    C,
    /// The D key
    D,
    /// The E key
    E,
    /// The F key
    F,
    /// The G key
    G,
    /// The H key
    H,
    /// The I key
    I,
    /// The J key
    J,
    /// The K key
    K,
    /// The L key
    L,
    /// The M key
    M,
    /// The N key
    N,
    /// The O key
    O,
    /// The P key
    P,
    /// The Q key
    Q,
    /// The R key
    R,
    /// The S key
    S,
    /// The T key
    T,
    /// The U key
    U,
    /// The V key
    V,
    /// The W key
    W,
    /// The X key
    X,
    /// The Y key
    Y,
    /// The Z key
    Z,
    /// The 0 key on the top row
    Num0,
    /// The 1 key on the top row
    Num1,
    /// The 2 key on the top row
    Num2,
    /// The 3 key on the top row
    Num3,
    /// The 4 key on the top row
    Num4,
    /// The 5 key on the top row
    Num5,
    /// The 6 key on the top row
    Num6,
    /// The 7 key on the top row
    Num7,
    /// The 8 key on the top row
    Num8,
    /// The 9 key on the top row
    Num9,
    /// The up arrow key
    Up,
    /// The down arrow key
    Down,
    /// The left arrow key
    Left,
    /// The right arrow key
    Right,
    /// The space bar
    Space,
    /// The enter key
    Enter,
    /// The escape key
    Escape,
    /// The tab key
    Tab,
    /// The backspace key
    Backspace,
}

/// Polled keyboard state for the current frame.
///
/// `is_down` reflects held keys across frames; `was_pressed` and
/// `was_released` are edge sets that hold only the transitions seen this
/// frame and reset when the next frame begins.
#[derive(Debug, Default)]
pub struct Keyboard {
    down: HashSet<Key>,
    pressed: HashSet<Key>,
    released: HashSet<Key>,
    modifiers: Modifiers,
}

impl Keyboard {
    /// Whether the key is currently held
    pub fn is_down(&self, key: Key) -> bool {
        self.down.contains(&key)
    }

    /// Whether the key went down this frame
    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Whether the key came up this frame
    pub fn was_released(&self, key: Key) -> bool {
        self.released.contains(&key)
    }

    /// Modifiers reported by the most recent key event
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub(crate) fn begin_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    pub(crate) fn press(&mut self, key: Key, modifiers: Modifiers) {
        if self.down.insert(key) {
            self.pressed.insert(key);
        }
        self.modifiers = modifiers;
    }

    pub(crate) fn release(&mut self, key: Key, modifiers: Modifiers) {
        if self.down.remove(&key) {
            self.released.insert(key);
        }
        self.modifiers = modifiers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_sets_down_and_edge() {
        let mut keyboard = Keyboard::default();
        keyboard.press(Key::W, Modifiers::empty());
        assert!(keyboard.is_down(Key::W));
        assert!(keyboard.was_pressed(Key::W));
    }

    #[test]
    fn test_edges_clear_but_held_keys_persist() {
        let mut keyboard = Keyboard::default();
        keyboard.press(Key::W, Modifiers::empty());
        keyboard.begin_frame();
        assert!(keyboard.is_down(Key::W));
        assert!(!keyboard.was_pressed(Key::W));
    }

    #[test]
    fn test_repeat_press_is_not_an_edge() {
        let mut keyboard = Keyboard::default();
        keyboard.press(Key::Space, Modifiers::empty());
        keyboard.begin_frame();
        keyboard.press(Key::Space, Modifiers::empty());
        assert!(!keyboard.was_pressed(Key::Space));
    }

    #[test]
    fn test_release_records_edge_and_modifiers() {
        let mut keyboard = Keyboard::default();
        keyboard.press(Key::A, Modifiers::SHIFT);
        keyboard.begin_frame();
        keyboard.release(Key::A, Modifiers::SHIFT | Modifiers::CTRL);
        assert!(!keyboard.is_down(Key::A));
        assert!(keyboard.was_released(Key::A));
        assert_eq!(keyboard.modifiers(), Modifiers::SHIFT | Modifiers::CTRL);
    }
}
