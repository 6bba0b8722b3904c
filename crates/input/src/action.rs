use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{InputState, Key};

/// A movement intent a controlled entity reacts to.
///
/// Entities consume actions, never raw keys, so any key layout can drive
/// the same movement code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    MoveForward,
    MoveLeft,
    MoveBackward,
    MoveRight,
    Jump,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::MoveForward,
        Action::MoveLeft,
        Action::MoveBackward,
        Action::MoveRight,
        Action::Jump,
    ];
}

/// Action → key map. Unbound actions are simply never active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBindings {
    map: BTreeMap<Action, Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut map = BTreeMap::new();
        map.insert(Action::MoveForward, Key::W);
        map.insert(Action::MoveLeft, Key::A);
        map.insert(Action::MoveBackward, Key::S);
        map.insert(Action::MoveRight, Key::D);
        map.insert(Action::Jump, Key::Space);
        Self { map }
    }
}

impl KeyBindings {
    /// Bindings with nothing bound.
    pub fn empty() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Bind `action` to `key`, returning the key it replaced.
    pub fn bind(&mut self, action: Action, key: Key) -> Option<Key> {
        let old = self.map.insert(action, key);
        if let Some(old) = old {
            tracing::debug!(?action, ?old, new = ?key, "action rebound");
        }
        old
    }

    pub fn unbind(&mut self, action: Action) -> Option<Key> {
        self.map.remove(&action)
    }

    pub fn key_for(&self, action: Action) -> Option<Key> {
        self.map.get(&action).copied()
    }

    /// Whether the key bound to `action` is currently held.
    pub fn is_active(&self, action: Action, input: &InputState) -> bool {
        self.key_for(action)
            .is_some_and(|key| input.is_key_pressed(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_wasd_and_space() {
        let b = KeyBindings::default();
        assert_eq!(b.key_for(Action::MoveForward), Some(Key::W));
        assert_eq!(b.key_for(Action::MoveLeft), Some(Key::A));
        assert_eq!(b.key_for(Action::MoveBackward), Some(Key::S));
        assert_eq!(b.key_for(Action::MoveRight), Some(Key::D));
        assert_eq!(b.key_for(Action::Jump), Some(Key::Space));
    }

    #[test]
    fn active_follows_bound_key() {
        let b = KeyBindings::default();
        let mut input = InputState::new();
        assert!(!b.is_active(Action::Jump, &input));
        input.press(Key::Space);
        assert!(b.is_active(Action::Jump, &input));
    }

    #[test]
    fn rebinding_replaces_old_key() {
        let mut b = KeyBindings::default();
        assert_eq!(b.bind(Action::MoveForward, Key::Up), Some(Key::W));
        let mut input = InputState::new();
        input.press(Key::W);
        assert!(!b.is_active(Action::MoveForward, &input));
        input.press(Key::Up);
        assert!(b.is_active(Action::MoveForward, &input));
    }

    #[test]
    fn unbound_action_is_never_active() {
        let mut b = KeyBindings::default();
        b.unbind(Action::Jump);
        let mut input = InputState::new();
        input.press(Key::Space);
        assert!(!b.is_active(Action::Jump, &input));
        assert!(KeyBindings::empty().key_for(Action::Jump).is_none());
    }

    #[test]
    fn bindings_deserialize_from_a_json_map() {
        let b: KeyBindings =
            serde_json::from_str(r#"{"MoveForward":"Up","Jump":"Space"}"#).unwrap();
        assert_eq!(b.key_for(Action::MoveForward), Some(Key::Up));
        assert_eq!(b.key_for(Action::MoveLeft), None);
        assert_eq!(Action::ALL.len(), 5);
    }
}
