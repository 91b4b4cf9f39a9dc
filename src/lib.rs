//! SnapKey - a background window-snapping utility for Windows
//!
//! This library provides the core functionality for turning held key chords
//! into window placements: chord recognition, snap geometry, and the
//! shortcuts file that binds one to the other. The low-level keyboard hook
//! only exists on Windows; everything else is portable and unit-testable.

pub mod arranger;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod keycode;
pub mod logging;
pub mod platform;
pub mod recognizer;
pub mod shortcuts;
pub mod watcher;

#[cfg(windows)]
pub mod hook;
