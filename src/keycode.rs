//! Key code translation between raw input namespaces and canonical codes.
//!
//! Two namespaces feed the app:
//! - `KeySource::Hook` - set-1 scan codes reported by the low-level keyboard hook
//! - `KeySource::Ui` - key codes coming from the CLI / config surface
//!
//! Canonical codes are Windows virtual-key values. The supported set is
//! closed: the letters A-Z plus Alt. `translate` returns `None` for
//! everything else, and unrecognized input is dropped before it can reach
//! any tracking state.

use std::fmt;

/// A canonical key code (Windows virtual-key value) from the closed
/// supported set.
///
/// Values outside the set are not representable: the only constructors are
/// `translate`, `from_code`, and `from_name`, all of which validate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualKey(u16);

impl VirtualKey {
    /// VK_MENU, either Alt key.
    pub const ALT: Self = Self(0x12);

    /// Validate a canonical code. Used when reading codes that came from
    /// outside the process (e.g. the shortcuts file).
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x12 => Some(Self::ALT),
            0x41..=0x5A => Some(Self(code)),
            _ => None,
        }
    }

    /// Parse a key name as typed on the CLI ("q", "Q", "alt").
    pub fn from_name(name: &str) -> Option<Self> {
        let token = name.trim();
        if token.eq_ignore_ascii_case("alt") {
            return Some(Self::ALT);
        }
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => {
                Some(Self(c.to_ascii_uppercase() as u16))
            }
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        self.0
    }

    /// Human-readable name for logs and CLI output.
    pub fn display_name(self) -> String {
        if self == Self::ALT {
            "Alt".to_string()
        } else {
            // Letter virtual-key values coincide with ASCII uppercase.
            char::from(self.0 as u8).to_string()
        }
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Which namespace a raw code belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySource {
    /// Set-1 scan codes from the keyboard hook.
    Hook,
    /// Virtual-key codes from the CLI / config surface.
    Ui,
}

/// Translate a raw code from the given namespace to its canonical code.
///
/// Returns `None` for any code outside the supported set. Callers treat
/// `None` as "discard this event", so unknown keys never enter any
/// pressed-key state.
pub fn translate(source: KeySource, raw: u32) -> Option<VirtualKey> {
    match source {
        KeySource::Hook => scan_to_virtual_key(raw),
        KeySource::Ui => u16::try_from(raw).ok().and_then(VirtualKey::from_code),
    }
}

/// Set-1 scan code to virtual-key mapping for the supported keys.
fn scan_to_virtual_key(scan: u32) -> Option<VirtualKey> {
    let vk = match scan {
        16 => b'Q',
        17 => b'W',
        18 => b'E',
        19 => b'R',
        20 => b'T',
        21 => b'Y',
        22 => b'U',
        23 => b'I',
        24 => b'O',
        25 => b'P',
        30 => b'A',
        31 => b'S',
        32 => b'D',
        33 => b'F',
        34 => b'G',
        35 => b'H',
        36 => b'J',
        37 => b'K',
        38 => b'L',
        44 => b'Z',
        45 => b'X',
        46 => b'C',
        47 => b'V',
        48 => b'B',
        49 => b'N',
        50 => b'M',
        56 => return Some(VirtualKey::ALT),
        _ => return None,
    };
    Some(VirtualKey(vk as u16))
}
