use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Keys the runtime understands, independent of the windowing crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Space,
    ShiftLeft,
    ControlLeft,
    Escape,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    /// Parse a key name as written in config files and on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "w" => Self::W,
            "a" => Self::A,
            "s" => Self::S,
            "d" => Self::D,
            "q" => Self::Q,
            "e" => Self::E,
            "space" => Self::Space,
            "shift" | "shiftleft" => Self::ShiftLeft,
            "ctrl" | "controlleft" => Self::ControlLeft,
            "escape" | "esc" => Self::Escape,
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            _ => return None,
        };
        Some(key)
    }
}

/// Current key and cursor state, sampled synchronously each frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    mouse: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as held. Returns true if it was not held before.
    pub fn press(&mut self, key: Key) -> bool {
        self.held.insert(key)
    }

    /// Mark a key as released. Returns true if it was held before.
    pub fn release(&mut self, key: Key) -> bool {
        self.held.remove(&key)
    }

    pub fn set_key(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.press(key);
        } else {
            self.release(key);
        }
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Release everything, e.g. when the window loses focus mid-press.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    pub fn set_mouse(&mut self, x: f32, y: f32) {
        self.mouse = (x, y);
    }

    pub fn mouse(&self) -> (f32, f32) {
        self.mouse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut input = InputState::new();
        assert!(input.press(Key::W));
        assert!(!input.press(Key::W));
        assert!(input.is_key_pressed(Key::W));
        assert!(input.release(Key::W));
        assert!(!input.is_key_pressed(Key::W));
        assert!(!input.release(Key::W));
    }

    #[test]
    fn clear_releases_all() {
        let mut input = InputState::new();
        input.set_key(Key::W, true);
        input.set_key(Key::Space, true);
        assert_eq!(input.held_count(), 2);
        input.clear();
        assert_eq!(input.held_count(), 0);
    }

    #[test]
    fn key_names_parse_case_insensitively() {
        assert_eq!(Key::from_name("W"), Some(Key::W));
        assert_eq!(Key::from_name("space"), Some(Key::Space));
        assert_eq!(Key::from_name("Esc"), Some(Key::Escape));
        assert_eq!(Key::from_name("F13"), None);
    }

    #[test]
    fn mouse_position_is_stored() {
        let mut input = InputState::new();
        input.set_mouse(420.0, 255.0);
        assert_eq!(input.mouse(), (420.0, 255.0));
    }
}
