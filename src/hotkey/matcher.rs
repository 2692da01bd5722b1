//! Hotkey matching against the live key stream
//!
//! Control key state is tracked on every key event, whether or not the
//! configured hotkey uses it. Alt and Shift are part of the settings but do
//! not gate matching.

use super::{is_control_key, produced_char, HotkeySpec, KeyIdentifier};
use rdev::Key;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Decides which key presses trigger a toggle
#[derive(Debug)]
pub struct HotkeyMatcher {
    spec: RwLock<HotkeySpec>,
    ctrl_held: AtomicBool,
}

impl HotkeyMatcher {
    pub fn new(spec: HotkeySpec) -> Self {
        Self {
            spec: RwLock::new(spec),
            ctrl_held: AtomicBool::new(false),
        }
    }

    /// Current hotkey
    pub fn spec(&self) -> HotkeySpec {
        *self.spec.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Swap the hotkey (settings reload)
    pub fn set_spec(&self, spec: HotkeySpec) {
        *self.spec.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = spec;
    }

    /// Whether a control key is currently held
    pub fn ctrl_held(&self) -> bool {
        self.ctrl_held.load(Ordering::SeqCst)
    }

    /// Feed one key event, returns true if it should trigger a toggle
    ///
    /// `name` is the text the OS reports for the key, if any. Held keys that
    /// auto-repeat produce one match per repeated press.
    pub fn on_key(&self, key: Key, pressed: bool, name: Option<&str>) -> bool {
        if is_control_key(key) {
            self.ctrl_held.store(pressed, Ordering::SeqCst);
        }

        if !pressed {
            return false;
        }

        let spec = self.spec();
        if spec.modifiers.ctrl && !self.ctrl_held() {
            return false;
        }

        match spec.key {
            KeyIdentifier::Function(_) => spec.key.function_key() == Some(key),
            KeyIdentifier::Char(c) => produced_char(key, name) == Some(c),
        }
    }
}

impl Default for HotkeyMatcher {
    fn default() -> Self {
        Self::new(HotkeySpec::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HotkeyModifiers;

    fn spec(key: KeyIdentifier, ctrl: bool) -> HotkeySpec {
        HotkeySpec {
            key,
            modifiers: HotkeyModifiers {
                ctrl,
                alt: false,
                shift: false,
            },
        }
    }

    #[test]
    fn test_function_key_without_modifier() {
        let matcher = HotkeyMatcher::new(spec(KeyIdentifier::Function(3), false));
        assert!(matcher.on_key(Key::F3, true, None));
        assert!(!matcher.on_key(Key::F3, false, None));
        assert!(!matcher.on_key(Key::F4, true, None));
    }

    #[test]
    fn test_ctrl_required() {
        let matcher = HotkeyMatcher::new(spec(KeyIdentifier::Function(3), true));
        assert!(!matcher.on_key(Key::F3, true, None));

        matcher.on_key(Key::ControlLeft, true, None);
        assert!(matcher.ctrl_held());
        assert!(matcher.on_key(Key::F3, true, None));

        matcher.on_key(Key::ControlLeft, false, None);
        assert!(!matcher.on_key(Key::F3, true, None));

        matcher.on_key(Key::ControlRight, true, None);
        assert!(matcher.on_key(Key::F3, true, None));
    }

    #[test]
    fn test_ctrl_tracked_when_not_required() {
        let matcher = HotkeyMatcher::new(spec(KeyIdentifier::Function(3), false));
        matcher.on_key(Key::ControlRight, true, None);
        assert!(matcher.ctrl_held());
        // Ctrl held does not prevent an unmodified hotkey
        assert!(matcher.on_key(Key::F3, true, None));
    }

    #[test]
    fn test_character_match_ignores_case() {
        let matcher = HotkeyMatcher::new(spec(KeyIdentifier::Char('q'), false));
        assert!(matcher.on_key(Key::KeyQ, true, Some("q")));
        assert!(matcher.on_key(Key::KeyQ, true, Some("Q")));
        assert!(!matcher.on_key(Key::KeyW, true, Some("w")));
    }

    #[test]
    fn test_character_with_ctrl_uses_physical_key() {
        let matcher = HotkeyMatcher::new(spec(KeyIdentifier::Char('q'), true));
        matcher.on_key(Key::ControlLeft, true, None);
        assert!(matcher.on_key(Key::KeyQ, true, Some("\u{11}")));
    }

    #[test]
    fn test_alt_and_shift_not_enforced() {
        let mut hotkey = spec(KeyIdentifier::Function(5), false);
        hotkey.modifiers.alt = true;
        hotkey.modifiers.shift = true;
        let matcher = HotkeyMatcher::new(hotkey);
        assert!(matcher.on_key(Key::F5, true, None));
    }

    #[test]
    fn test_repeated_presses_all_match() {
        let matcher = HotkeyMatcher::default();
        let matches = (0..3).filter(|_| matcher.on_key(Key::F3, true, None)).count();
        assert_eq!(matches, 3);
    }

    #[test]
    fn test_set_spec() {
        let matcher = HotkeyMatcher::default();
        matcher.set_spec(spec(KeyIdentifier::Function(9), false));
        assert!(!matcher.on_key(Key::F3, true, None));
        assert!(matcher.on_key(Key::F9, true, None));
    }
}
