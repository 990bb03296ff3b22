//! Key identifiers shared by the controllers and the platform hosts.
//!
//! Keys are identified by DOM-style numeric key codes so that the same
//! controller works behind the browser host and the winit host. Platform
//! layers map their native key codes into this space.

use std::fmt;

use winit::keyboard;

use crate::error::{ControllerError, ControllerResult};

/// Name → code table for the navigation keys the keyboard controller supports.
pub const KEYCODES: [(&str, u32); 4] = [("up", 38), ("down", 40), ("left", 37), ("right", 39)];

pub const KEY_ESCAPE: u32 = 27;
pub const KEY_SPACE: u32 = 32;
pub const KEY_ENTER: u32 = 13;
pub const KEY_TAB: u32 = 9;

/// Look up the code for a key name.
pub fn keycode(name: &str) -> Option<u32> {
    KEYCODES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| *code)
}

/// Reverse lookup of [`keycode`].
pub fn key_name(code: u32) -> Option<&'static str> {
    KEYCODES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
}

/// A key given either by name or by numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRef<'a> {
    Name(&'a str),
    Code(u32),
}

impl KeyRef<'_> {
    /// Resolve to a numeric key code.
    ///
    /// Names are resolved through [`KEYCODES`]; a name with no entry fails
    /// with [`ControllerError::UnknownKey`]. Codes are passed through as-is.
    pub fn resolve(self) -> ControllerResult<u32> {
        match self {
            KeyRef::Code(code) => Ok(code),
            KeyRef::Name(name) => {
                keycode(name).ok_or_else(|| ControllerError::UnknownKey(name.to_string()))
            }
        }
    }
}

impl<'a> From<&'a str> for KeyRef<'a> {
    fn from(name: &'a str) -> Self {
        KeyRef::Name(name)
    }
}

impl From<u32> for KeyRef<'_> {
    fn from(code: u32) -> Self {
        KeyRef::Code(code)
    }
}

impl fmt::Display for KeyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRef::Name(name) => write!(f, "{name}"),
            KeyRef::Code(code) => write!(f, "#{code}"),
        }
    }
}

/// Convert a winit [`keyboard::KeyCode`] to a DOM-style key code, if a
/// mapping exists.
pub fn map_winit_key(key: keyboard::KeyCode) -> Option<u32> {
    Some(match key {
        // Arrows
        keyboard::KeyCode::ArrowLeft => 37,
        keyboard::KeyCode::ArrowUp => 38,
        keyboard::KeyCode::ArrowRight => 39,
        keyboard::KeyCode::ArrowDown => 40,

        // Common
        keyboard::KeyCode::Tab => KEY_TAB,
        keyboard::KeyCode::Enter => KEY_ENTER,
        keyboard::KeyCode::Escape => KEY_ESCAPE,
        keyboard::KeyCode::Space => KEY_SPACE,
        keyboard::KeyCode::PageUp => 33,
        keyboard::KeyCode::PageDown => 34,
        keyboard::KeyCode::End => 35,
        keyboard::KeyCode::Home => 36,

        _ => return None,
    })
}
