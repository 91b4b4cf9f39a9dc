//! Chord-to-position binding system.
//!
//! This module provides:
//! - The seven layout positions and the chords bound to them
//! - Conflict checking (one chord owns at most one position)
//! - Merge-on-save persistence to the flat shortcuts file
//!
//! Matching order is deterministic: positions are always scanned in
//! `Position` declaration order, so overlapping chords resolve the same
//! way on every run.

mod persistence;
mod registry;
mod types;

pub use persistence::{default_shortcuts_path, load, save, StoreError};
pub use registry::ShortcutRegistry;
pub use types::{Chord, ChordParseError, Position, PositionParseError};
