//! Global hotkey support.
//!
//! `chord` holds the pure chord value type and its string round-trip;
//! `service` (Windows only) owns the OS-level registrations and the
//! listener thread that turns key presses into channel events.

pub mod chord;
#[cfg(windows)]
pub mod service;

pub use chord::{parse_chord, HotKeyChord, Key, Modifiers, ParsedChord};
#[cfg(windows)]
pub use service::{HotkeyError, HotkeyService, HotkeySlot};
