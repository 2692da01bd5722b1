//! Hotkey parsing and matching
//!
//! The hotkey is either a function key (F1-F12) or a single character,
//! optionally gated on a held control key. Key events come from the same
//! global rdev hook that records the pointer, so no extra permission is
//! needed beyond what capture already requires.

pub mod matcher;

pub use matcher::HotkeyMatcher;

use crate::config::HotkeyModifiers;
use crate::error::HotkeyError;
use rdev::Key;

/// The key part of a hotkey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyIdentifier {
    /// F1-F12, compared by key identity
    Function(u8),
    /// A character, compared against the text the key produces (lowercase)
    Char(char),
}

impl KeyIdentifier {
    /// Parse "f1".."f12" (any case) or a single character
    pub fn parse(name: &str) -> Result<Self, HotkeyError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HotkeyError::Empty);
        }

        let lower = name.to_lowercase();
        let mut chars = lower.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(KeyIdentifier::Char(c));
        }

        if let Some(number) = lower.strip_prefix('f') {
            if let Ok(n) = number.parse::<u8>() {
                if (1..=12).contains(&n) {
                    return Ok(KeyIdentifier::Function(n));
                }
            }
        }

        Err(HotkeyError::UnknownKey(name.to_string()))
    }

    /// rdev key for function keys
    pub fn function_key(&self) -> Option<Key> {
        match self {
            KeyIdentifier::Function(n) => function_key(*n),
            KeyIdentifier::Char(_) => None,
        }
    }
}

impl std::fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyIdentifier::Function(n) => write!(f, "f{}", n),
            KeyIdentifier::Char(c) => write!(f, "{}", c),
        }
    }
}

/// Configured hotkey
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeySpec {
    pub key: KeyIdentifier,
    pub modifiers: HotkeyModifiers,
}

impl Default for HotkeySpec {
    fn default() -> Self {
        Self {
            key: KeyIdentifier::Function(3),
            modifiers: HotkeyModifiers::default(),
        }
    }
}

impl std::fmt::Display for HotkeySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifiers.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.modifiers.alt {
            write!(f, "Alt+")?;
        }
        if self.modifiers.shift {
            write!(f, "Shift+")?;
        }
        match self.key {
            KeyIdentifier::Function(n) => write!(f, "F{}", n),
            KeyIdentifier::Char(c) => write!(f, "{}", c.to_uppercase()),
        }
    }
}

fn function_key(n: u8) -> Option<Key> {
    match n {
        1 => Some(Key::F1),
        2 => Some(Key::F2),
        3 => Some(Key::F3),
        4 => Some(Key::F4),
        5 => Some(Key::F5),
        6 => Some(Key::F6),
        7 => Some(Key::F7),
        8 => Some(Key::F8),
        9 => Some(Key::F9),
        10 => Some(Key::F10),
        11 => Some(Key::F11),
        12 => Some(Key::F12),
        _ => None,
    }
}

/// Whether a key is one of the control keys
pub fn is_control_key(key: Key) -> bool {
    matches!(key, Key::ControlLeft | Key::ControlRight)
}

/// Character printed on a physical key, for when the OS reports a
/// control character instead (e.g. Ctrl+Q arrives as "\x11")
fn key_char(key: Key) -> Option<char> {
    let c = match key {
        Key::KeyA => 'a',
        Key::KeyB => 'b',
        Key::KeyC => 'c',
        Key::KeyD => 'd',
        Key::KeyE => 'e',
        Key::KeyF => 'f',
        Key::KeyG => 'g',
        Key::KeyH => 'h',
        Key::KeyI => 'i',
        Key::KeyJ => 'j',
        Key::KeyK => 'k',
        Key::KeyL => 'l',
        Key::KeyM => 'm',
        Key::KeyN => 'n',
        Key::KeyO => 'o',
        Key::KeyP => 'p',
        Key::KeyQ => 'q',
        Key::KeyR => 'r',
        Key::KeyS => 's',
        Key::KeyT => 't',
        Key::KeyU => 'u',
        Key::KeyV => 'v',
        Key::KeyW => 'w',
        Key::KeyX => 'x',
        Key::KeyY => 'y',
        Key::KeyZ => 'z',
        Key::Num0 => '0',
        Key::Num1 => '1',
        Key::Num2 => '2',
        Key::Num3 => '3',
        Key::Num4 => '4',
        Key::Num5 => '5',
        Key::Num6 => '6',
        Key::Num7 => '7',
        Key::Num8 => '8',
        Key::Num9 => '9',
        Key::Space => ' ',
        _ => return None,
    };
    Some(c)
}

/// Lowercase character produced by a key press
pub fn produced_char(key: Key, name: Option<&str>) -> Option<char> {
    let from_name = name.and_then(|name| {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => c.to_lowercase().next(),
            _ => None,
        }
    });
    from_name.or_else(|| key_char(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_function_keys() {
        assert_eq!(KeyIdentifier::parse("f3"), Ok(KeyIdentifier::Function(3)));
        assert_eq!(KeyIdentifier::parse("F12"), Ok(KeyIdentifier::Function(12)));
        assert_eq!(KeyIdentifier::parse(" f1 "), Ok(KeyIdentifier::Function(1)));
        assert!(KeyIdentifier::parse("f13").is_err());
        assert!(KeyIdentifier::parse("f0").is_err());
    }

    #[test]
    fn test_parse_characters() {
        assert_eq!(KeyIdentifier::parse("a"), Ok(KeyIdentifier::Char('a')));
        assert_eq!(KeyIdentifier::parse("B"), Ok(KeyIdentifier::Char('b')));
        // A lone "f" is the letter, not a function key
        assert_eq!(KeyIdentifier::parse("f"), Ok(KeyIdentifier::Char('f')));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(KeyIdentifier::parse(""), Err(HotkeyError::Empty));
        assert_eq!(
            KeyIdentifier::parse("ctrl+a"),
            Err(HotkeyError::UnknownKey("ctrl+a".to_string()))
        );
    }

    #[test]
    fn test_display_round_trips() {
        for name in ["f3", "f11", "q", "7"] {
            assert_eq!(KeyIdentifier::parse(name).unwrap().to_string(), name);
        }
    }

    #[test]
    fn test_spec_display() {
        let spec = HotkeySpec {
            key: KeyIdentifier::Function(3),
            modifiers: HotkeyModifiers {
                ctrl: true,
                alt: false,
                shift: false,
            },
        };
        assert_eq!(spec.to_string(), "Ctrl+F3");
        assert_eq!(HotkeySpec::default().to_string(), "F3");
    }

    #[test]
    fn test_function_key_mapping() {
        assert_eq!(KeyIdentifier::Function(3).function_key(), Some(Key::F3));
        assert_eq!(KeyIdentifier::Char('x').function_key(), None);
    }

    #[test]
    fn test_produced_char() {
        assert_eq!(produced_char(Key::KeyQ, Some("Q")), Some('q'));
        assert_eq!(produced_char(Key::KeyQ, Some("\u{11}")), Some('q'));
        assert_eq!(produced_char(Key::F3, None), None);
        assert_eq!(produced_char(Key::Unknown(0), Some("é")), Some('é'));
    }
}
