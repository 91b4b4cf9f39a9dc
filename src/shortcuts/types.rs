//! Core binding types for window snapping.
//!
//! This module provides:
//! - `Position` - the seven snap targets, in fixed priority order
//! - `Chord` - the set of canonical keys that triggers a snap
//! - Parse errors detailed enough for direct CLI feedback

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::keycode::VirtualKey;

/// Errors that can occur when parsing a chord string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChordParseError {
    #[error("chord has no keys")]
    Empty,
    #[error("unknown key '{0}' (supported: letters a-z and alt)")]
    UnknownKey(String),
    #[error("unknown key code {0}")]
    UnknownCode(u16),
}

/// Error for an unrecognized position name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown position '{0}' (expected one of: top_left, top_right, bottom_left, bottom_right, top, middle, bottom)")]
pub struct PositionParseError(pub String);

/// A snap target on the focused monitor.
///
/// Declaration order is load-bearing: it is the order chords are checked
/// when several are held at once, and the order `bindings` lists them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Middle,
    Bottom,
}

impl Position {
    /// All positions in priority order.
    pub const ALL: [Position; 7] = [
        Position::TopLeft,
        Position::TopRight,
        Position::BottomLeft,
        Position::BottomRight,
        Position::Top,
        Position::Middle,
        Position::Bottom,
    ];

    /// The stable name used in the shortcuts file and on the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            Position::TopLeft => "top_left",
            Position::TopRight => "top_right",
            Position::BottomLeft => "bottom_left",
            Position::BottomRight => "bottom_right",
            Position::Top => "top",
            Position::Middle => "middle",
            Position::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "top_left" => Ok(Position::TopLeft),
            "top_right" => Ok(Position::TopRight),
            "bottom_left" => Ok(Position::BottomLeft),
            "bottom_right" => Ok(Position::BottomRight),
            "top" => Ok(Position::Top),
            "middle" => Ok(Position::Middle),
            "bottom" => Ok(Position::Bottom),
            other => Err(PositionParseError(other.to_string())),
        }
    }
}

/// A non-empty set of canonical keys. The chord fires while every member
/// is held down.
///
/// Keys are kept sorted by code, so Alt (0x12) always precedes letters in
/// iteration and display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chord {
    keys: BTreeSet<VirtualKey>,
}

impl Chord {
    /// Parse a chord as typed on the CLI, e.g. "alt+q", "Alt Q" or "18,81".
    ///
    /// Separators are `+`, `,` or whitespace. A token of digits is read as
    /// a canonical key code; anything else as a key name. The two can mix.
    pub fn parse(s: &str) -> Result<Self, ChordParseError> {
        let normalized = s.replace(['+', ','], " ");
        let mut keys = BTreeSet::new();
        for token in normalized.split_whitespace() {
            let key = if token.chars().all(|c| c.is_ascii_digit()) {
                let code = token
                    .parse::<u16>()
                    .map_err(|_| ChordParseError::UnknownKey(token.to_string()))?;
                VirtualKey::from_code(code).ok_or(ChordParseError::UnknownCode(code))?
            } else {
                VirtualKey::from_name(token)
                    .ok_or_else(|| ChordParseError::UnknownKey(token.to_string()))?
            };
            keys.insert(key);
        }
        if keys.is_empty() {
            return Err(ChordParseError::Empty);
        }
        Ok(Self { keys })
    }

    /// Build a chord from canonical codes, validating each one. Used when
    /// reading the shortcuts file.
    pub fn from_codes<I>(codes: I) -> Result<Self, ChordParseError>
    where
        I: IntoIterator<Item = u16>,
    {
        let mut keys = BTreeSet::new();
        for code in codes {
            let key =
                VirtualKey::from_code(code).ok_or(ChordParseError::UnknownCode(code))?;
            keys.insert(key);
        }
        if keys.is_empty() {
            return Err(ChordParseError::Empty);
        }
        Ok(Self { keys })
    }

    /// True when every key of the chord is in `pressed`.
    pub fn is_satisfied_by(&self, pressed: &BTreeSet<VirtualKey>) -> bool {
        self.keys.is_subset(pressed)
    }

    pub fn keys(&self) -> impl Iterator<Item = VirtualKey> + '_ {
        self.keys.iter().copied()
    }

    /// Canonical codes in sorted order, for the shortcuts file.
    pub fn codes(&self) -> impl Iterator<Item = u16> + '_ {
        self.keys.iter().map(|k| k.code())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn contains(&self, key: VirtualKey) -> bool {
        self.keys.contains(&key)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for key in &self.keys {
            if !first {
                f.write_str("+")?;
            }
            write!(f, "{}", key.display_name())?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(s: &str) -> Chord {
        Chord::parse(s).unwrap()
    }

    #[test]
    fn parse_single_key() {
        let c = chord("q");
        assert_eq!(c.len(), 1);
        assert!(c.contains(VirtualKey::from_name("q").unwrap()));
    }

    #[test]
    fn parse_modifier_combo() {
        let c = chord("alt+q");
        assert_eq!(c.len(), 2);
        assert!(c.contains(VirtualKey::ALT));
        assert!(c.contains(VirtualKey::from_name("q").unwrap()));
    }

    #[test]
    fn parse_accepts_space_separator_and_mixed_case() {
        assert_eq!(chord("Alt Q"), chord("alt+q"));
        assert_eq!(chord("ALT+q"), chord("alt+Q"));
    }

    #[test]
    fn parse_accepts_comma_separator() {
        assert_eq!(chord("alt,q"), chord("alt+q"));
    }

    #[test]
    fn parse_accepts_canonical_codes() {
        // 18 = Alt, 81 = Q; names and codes can mix.
        assert_eq!(chord("18,81"), chord("alt+q"));
        assert_eq!(chord("alt 81"), chord("alt+q"));
    }

    #[test]
    fn parse_rejects_out_of_set_codes() {
        assert_eq!(Chord::parse("18,32"), Err(ChordParseError::UnknownCode(32)));
        assert_eq!(
            Chord::parse("99999"),
            Err(ChordParseError::UnknownKey("99999".to_string()))
        );
    }

    #[test]
    fn parse_is_order_insensitive() {
        assert_eq!(chord("q+alt"), chord("alt+q"));
    }

    #[test]
    fn parse_dedupes_repeated_keys() {
        assert_eq!(chord("q+q"), chord("q"));
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(Chord::parse(""), Err(ChordParseError::Empty));
        assert_eq!(Chord::parse("   "), Err(ChordParseError::Empty));
    }

    #[test]
    fn parse_rejects_unknown_tokens() {
        assert_eq!(
            Chord::parse("alt+f1"),
            Err(ChordParseError::UnknownKey("f1".to_string()))
        );
        assert_eq!(
            Chord::parse("ctrl+q"),
            Err(ChordParseError::UnknownKey("ctrl".to_string()))
        );
    }

    #[test]
    fn from_codes_round_trips() {
        let c = Chord::from_codes([0x12, 0x51]).unwrap();
        assert_eq!(c, chord("alt+q"));
        assert_eq!(c.codes().collect::<Vec<_>>(), vec![0x12, 0x51]);
    }

    #[test]
    fn from_codes_rejects_unknown() {
        assert_eq!(
            Chord::from_codes([0x12, 0x20]),
            Err(ChordParseError::UnknownCode(0x20))
        );
        assert_eq!(Chord::from_codes([]), Err(ChordParseError::Empty));
    }

    #[test]
    fn display_orders_alt_before_letters() {
        assert_eq!(chord("q+alt").to_string(), "Alt+Q");
        assert_eq!(chord("b").to_string(), "B");
    }

    #[test]
    fn satisfaction_is_subset_not_equality() {
        let pressed: BTreeSet<VirtualKey> = chord("alt+q+w").keys().collect();
        assert!(chord("alt+q").is_satisfied_by(&pressed));
        assert!(chord("alt+q+w").is_satisfied_by(&pressed));
        assert!(!chord("alt+z").is_satisfied_by(&pressed));
        assert!(!chord("z").is_satisfied_by(&BTreeSet::new()));
    }

    #[test]
    fn positions_scan_in_declaration_order() {
        for pair in Position::ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} must precede {}", pair[0], pair[1]);
        }
        assert_eq!(Position::ALL[0], Position::TopLeft);
        assert_eq!(Position::ALL[6], Position::Bottom);
    }

    #[test]
    fn position_names_round_trip() {
        for pos in Position::ALL {
            assert_eq!(pos.as_str().parse::<Position>().unwrap(), pos);
        }
        assert!("center".parse::<Position>().is_err());
        assert!("".parse::<Position>().is_err());
    }
}
