//! Hotkey chord values and their text encoding.
//!
//! A chord is one main key plus a set of modifiers. The text form tokenizes
//! on `+`: modifier tokens accumulate case-insensitively, the remaining
//! token names the main key. Formatting always emits modifiers in the fixed
//! order Ctrl, Alt, Shift, Win, so parse/format round-trips are value-equal
//! even when the input listed modifiers differently.

use std::fmt;

// RegisterHotKey modifier flags.
const MOD_ALT: u32 = 0x0001;
const MOD_CONTROL: u32 = 0x0002;
const MOD_SHIFT: u32 = 0x0004;
const MOD_WIN: u32 = 0x0008;

/// Modifier key set for a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub win: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        win: false,
    };

    pub fn is_empty(&self) -> bool {
        !(self.ctrl || self.alt || self.shift || self.win)
    }

    /// Flags value for `RegisterHotKey`.
    pub fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.alt {
            flags |= MOD_ALT;
        }
        if self.ctrl {
            flags |= MOD_CONTROL;
        }
        if self.shift {
            flags |= MOD_SHIFT;
        }
        if self.win {
            flags |= MOD_WIN;
        }
        flags
    }
}

/// Main keys supported in a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    D0, D1, D2, D3, D4, D5, D6, D7, D8, D9,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    Space, Enter, Escape, Tab, Back, Delete, Insert,
    Home, End, PageUp, PageDown, Up, Down, Left, Right,
}

impl Key {
    /// Virtual-key code for `RegisterHotKey` / `WM_HOTKEY` matching.
    pub fn virtual_key(self) -> u32 {
        use Key::*;
        match self {
            A => 0x41, B => 0x42, C => 0x43, D => 0x44, E => 0x45,
            F => 0x46, G => 0x47, H => 0x48, I => 0x49, J => 0x4A,
            K => 0x4B, L => 0x4C, M => 0x4D, N => 0x4E, O => 0x4F,
            P => 0x50, Q => 0x51, R => 0x52, S => 0x53, T => 0x54,
            U => 0x55, V => 0x56, W => 0x57, X => 0x58, Y => 0x59,
            Z => 0x5A,
            D0 => 0x30, D1 => 0x31, D2 => 0x32, D3 => 0x33, D4 => 0x34,
            D5 => 0x35, D6 => 0x36, D7 => 0x37, D8 => 0x38, D9 => 0x39,
            F1 => 0x70, F2 => 0x71, F3 => 0x72, F4 => 0x73, F5 => 0x74,
            F6 => 0x75, F7 => 0x76, F8 => 0x77, F9 => 0x78, F10 => 0x79,
            F11 => 0x7A, F12 => 0x7B,
            Space => 0x20, Enter => 0x0D, Escape => 0x1B, Tab => 0x09,
            Back => 0x08, Delete => 0x2E, Insert => 0x2D,
            Home => 0x24, End => 0x23, PageUp => 0x21, PageDown => 0x22,
            Left => 0x25, Up => 0x26, Right => 0x27, Down => 0x28,
        }
    }

    /// Canonical display name, as used in the settings file.
    pub fn name(self) -> &'static str {
        use Key::*;
        match self {
            A => "A", B => "B", C => "C", D => "D", E => "E", F => "F",
            G => "G", H => "H", I => "I", J => "J", K => "K", L => "L",
            M => "M", N => "N", O => "O", P => "P", Q => "Q", R => "R",
            S => "S", T => "T", U => "U", V => "V", W => "W", X => "X",
            Y => "Y", Z => "Z",
            D0 => "0", D1 => "1", D2 => "2", D3 => "3", D4 => "4",
            D5 => "5", D6 => "6", D7 => "7", D8 => "8", D9 => "9",
            F1 => "F1", F2 => "F2", F3 => "F3", F4 => "F4", F5 => "F5",
            F6 => "F6", F7 => "F7", F8 => "F8", F9 => "F9", F10 => "F10",
            F11 => "F11", F12 => "F12",
            Space => "Space", Enter => "Enter", Escape => "Escape",
            Tab => "Tab", Back => "Back", Delete => "Delete",
            Insert => "Insert", Home => "Home", End => "End",
            PageUp => "PageUp", PageDown => "PageDown",
            Up => "Up", Down => "Down", Left => "Left", Right => "Right",
        }
    }

    /// Parse a single non-modifier token, case-insensitively.
    pub fn from_token(token: &str) -> Option<Key> {
        use Key::*;

        let token = token.trim();
        if token.len() == 1 {
            let c = token.chars().next().unwrap();
            if c.is_ascii_alphabetic() {
                let letters = [
                    A, B, C, D, E, F, G, H, I, J, K, L, M,
                    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
                ];
                return Some(letters[(c.to_ascii_uppercase() as u8 - b'A') as usize]);
            }
            if c.is_ascii_digit() {
                let digits = [D0, D1, D2, D3, D4, D5, D6, D7, D8, D9];
                return Some(digits[(c as u8 - b'0') as usize]);
            }
        }

        match token.to_ascii_lowercase().as_str() {
            "f1" => Some(F1), "f2" => Some(F2), "f3" => Some(F3),
            "f4" => Some(F4), "f5" => Some(F5), "f6" => Some(F6),
            "f7" => Some(F7), "f8" => Some(F8), "f9" => Some(F9),
            "f10" => Some(F10), "f11" => Some(F11), "f12" => Some(F12),
            "space" => Some(Space),
            "enter" => Some(Enter),
            "escape" => Some(Escape),
            "tab" => Some(Tab),
            "back" => Some(Back),
            "delete" => Some(Delete),
            "insert" => Some(Insert),
            "home" => Some(Home),
            "end" => Some(End),
            "pageup" => Some(PageUp),
            "pagedown" => Some(PageDown),
            "up" => Some(Up),
            "down" => Some(Down),
            "left" => Some(Left),
            "right" => Some(Right),
            _ => None,
        }
    }
}

/// A complete chord: one main key plus modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotKeyChord {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl HotKeyChord {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

impl fmt::Display for HotKeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = Vec::with_capacity(5);
        if self.modifiers.ctrl {
            parts.push("Ctrl");
        }
        if self.modifiers.alt {
            parts.push("Alt");
        }
        if self.modifiers.shift {
            parts.push("Shift");
        }
        if self.modifiers.win {
            parts.push("Win");
        }
        parts.push(self.key.name());
        write!(f, "{}", parts.join("+"))
    }
}

/// Result of parsing a chord string. `key` is `None` when no recognizable
/// main key was present; the modifiers collected so far are still returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedChord {
    pub key: Option<Key>,
    pub modifiers: Modifiers,
}

impl ParsedChord {
    /// The complete chord, if a main key was found.
    pub fn chord(&self) -> Option<HotKeyChord> {
        self.key.map(|key| HotKeyChord::new(key, self.modifiers))
    }
}

/// Parse a chord string such as "Ctrl+Shift+F1".
///
/// Tokens are split on `+` and trimmed. Modifier tokens accumulate into the
/// modifier set; anything else is parsed as the main key. If several
/// non-modifier tokens appear, the last one wins, matching the settings
/// files written by earlier versions.
pub fn parse_chord(text: &str) -> ParsedChord {
    let mut modifiers = Modifiers::NONE;
    let mut key = None;

    for part in text.split('+') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.to_ascii_lowercase().as_str() {
            "ctrl" => modifiers.ctrl = true,
            "alt" => modifiers.alt = true,
            "shift" => modifiers.shift = true,
            "win" => modifiers.win = true,
            _ => key = Key::from_token(part),
        }
    }

    ParsedChord { key, modifiers }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modifiers_and_key() {
        let parsed = parse_chord("Ctrl+Shift+F1");
        assert_eq!(parsed.key, Some(Key::F1));
        assert!(parsed.modifiers.ctrl);
        assert!(parsed.modifiers.shift);
        assert!(!parsed.modifiers.alt);
        assert!(!parsed.modifiers.win);
    }

    #[test]
    fn parsing_is_case_insensitive_and_order_independent() {
        let a = parse_chord("shift+CTRL+f1");
        let b = parse_chord("Ctrl+Shift+F1");
        assert_eq!(a, b);
    }

    #[test]
    fn empty_string_yields_no_key() {
        let parsed = parse_chord("");
        assert_eq!(parsed.key, None);
        assert!(parsed.modifiers.is_empty());
    }

    #[test]
    fn modifiers_only_yields_no_key() {
        let parsed = parse_chord("Ctrl+Alt");
        assert_eq!(parsed.key, None);
        assert!(parsed.modifiers.ctrl && parsed.modifiers.alt);
    }

    #[test]
    fn unrecognized_key_yields_no_key() {
        let parsed = parse_chord("Ctrl+Bogus");
        assert_eq!(parsed.key, None);
        assert!(parsed.modifiers.ctrl);
    }

    #[test]
    fn last_main_key_wins() {
        let parsed = parse_chord("Ctrl+A+B");
        assert_eq!(parsed.key, Some(Key::B));
    }

    #[test]
    fn format_uses_fixed_modifier_order() {
        let chord = parse_chord("win+shift+alt+ctrl+Space").chord().unwrap();
        assert_eq!(chord.to_string(), "Ctrl+Alt+Shift+Win+Space");
    }

    #[test]
    fn round_trip_is_value_equal_not_string_equal() {
        let original = "Shift+Ctrl+F1";
        let chord = parse_chord(original).chord().unwrap();
        let formatted = chord.to_string();
        assert_ne!(formatted, original);
        assert_eq!(parse_chord(&formatted).chord(), Some(chord));
    }

    #[test]
    fn digits_and_letters_round_trip() {
        for text in ["Ctrl+0", "Ctrl+9", "Alt+A", "Alt+z", "Win+PageDown"] {
            let chord = parse_chord(text).chord().unwrap();
            assert_eq!(
                parse_chord(&chord.to_string()).chord(),
                Some(chord),
                "round trip failed for {text}"
            );
        }
    }

    #[test]
    fn modifier_flags_match_win32_values() {
        let parsed = parse_chord("Ctrl+Alt+Shift+Win+F1");
        assert_eq!(parsed.modifiers.flags(), 0x1 | 0x2 | 0x4 | 0x8);
        assert_eq!(parse_chord("F1").modifiers.flags(), 0);
    }

    #[test]
    fn key_without_modifiers_formats_bare() {
        let chord = HotKeyChord::new(Key::F5, Modifiers::NONE);
        assert_eq!(chord.to_string(), "F5");
    }
}
