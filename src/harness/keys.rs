//=========================================================================
// Key Bindings
//=========================================================================
//
// Maps physical keys to the names of global functions a plugin
// registered.
//
// Architecture:
//   KeyCode → HashMap → function name → HostEvent::Action
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

//=== Internal Dependencies ===============================================

use crate::core::ACTION_NAME;

//=== KeyCode =============================================================

/// Physical keyboard key, independent of layout.
///
/// Covers the keys a binding is likely to use. Anything else maps to
/// `Unidentified` and never resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    ArrowDown, ArrowLeft, ArrowRight, ArrowUp,

    Space, Enter, Escape, Tab,

    Unidentified,
}

//=== KeyBindings =========================================================

/// Key to global function table.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    bindings: HashMap<KeyCode, String>,
}

impl KeyBindings {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// `F` toggles the aim mode.
    pub fn with_defaults() -> Self {
        let mut bindings = Self::new();
        bindings.bind(KeyCode::KeyF, ACTION_NAME);
        bindings
    }

    /// Binds `key`, replacing any earlier binding. Returns the replaced name.
    pub fn bind(&mut self, key: KeyCode, function: impl Into<String>) -> Option<String> {
        if key == KeyCode::Unidentified {
            return None;
        }
        self.bindings.insert(key, function.into())
    }

    pub fn unbind(&mut self, key: KeyCode) -> Option<String> {
        self.bindings.remove(&key)
    }

    /// Function bound to `key`, if any.
    pub fn resolve(&self, key: KeyCode) -> Option<&str> {
        self.bindings.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_f_to_toggle() {
        let bindings = KeyBindings::with_defaults();
        assert_eq!(bindings.resolve(KeyCode::KeyF), Some(ACTION_NAME));
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn new_is_empty() {
        let bindings = KeyBindings::new();
        assert!(bindings.is_empty());
        assert_eq!(bindings.resolve(KeyCode::KeyF), None);
    }

    #[test]
    fn rebinding_replaces() {
        let mut bindings = KeyBindings::with_defaults();

        let old = bindings.bind(KeyCode::KeyF, "Other_Function");

        assert_eq!(old.as_deref(), Some(ACTION_NAME));
        assert_eq!(bindings.resolve(KeyCode::KeyF), Some("Other_Function"));
    }

    #[test]
    fn unidentified_never_binds() {
        let mut bindings = KeyBindings::new();

        bindings.bind(KeyCode::Unidentified, ACTION_NAME);

        assert!(bindings.is_empty());
        assert_eq!(bindings.resolve(KeyCode::Unidentified), None);
    }

    #[test]
    fn unbind_removes() {
        let mut bindings = KeyBindings::with_defaults();

        assert_eq!(bindings.unbind(KeyCode::KeyF).as_deref(), Some(ACTION_NAME));
        assert!(bindings.is_empty());
    }
}
