//! Held-key tracking and chord matching.
//!
//! One `ChordRecognizer` instance lives for the lifetime of the hook. It
//! owns the set of currently-held canonical keys, fed one event at a time
//! by the hook consumer. Matching runs only on press events; releases
//! just shrink the held set.

use std::collections::BTreeSet;

use crate::keycode::{self, KeySource, VirtualKey};
use crate::shortcuts::{Position, ShortcutRegistry};

/// Tracks held keys and reports the first bound position whose chord is
/// fully held.
#[derive(Debug, Default)]
pub struct ChordRecognizer {
    pressed: BTreeSet<VirtualKey>,
}

impl ChordRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a press event with a raw hook code.
    ///
    /// Unrecognized codes are discarded without touching the held set.
    /// Otherwise the key is inserted and the registry scanned once, in
    /// position priority order; the first satisfied chord wins and the
    /// scan stops there.
    pub fn on_press(&mut self, raw: u32, registry: &ShortcutRegistry) -> Option<Position> {
        let key = keycode::translate(KeySource::Hook, raw)?;
        self.pressed.insert(key);
        registry.first_match(&self.pressed)
    }

    /// Feed a release event with a raw hook code.
    ///
    /// Removal is unconditional and idempotent; releasing a key that was
    /// never tracked is a no-op. Releases never trigger matching.
    pub fn on_release(&mut self, raw: u32) {
        if let Some(key) = keycode::translate(KeySource::Hook, raw) {
            self.pressed.remove(&key);
        }
    }

    /// Number of keys currently held.
    pub fn held_count(&self) -> usize {
        self.pressed.len()
    }

    /// The currently-held keys, for logging.
    pub fn held(&self) -> impl Iterator<Item = VirtualKey> + '_ {
        self.pressed.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::Chord;

    // Set-1 scan codes fed to the recognizer in tests.
    const SCAN_Q: u32 = 16;
    const SCAN_W: u32 = 17;
    const SCAN_X: u32 = 45;
    const SCAN_ALT: u32 = 56;
    const SCAN_ESC: u32 = 1;

    fn registry(bindings: &[(Position, &str)]) -> ShortcutRegistry {
        let mut registry = ShortcutRegistry::new();
        for (position, chord) in bindings {
            registry.set(*position, Chord::parse(chord).unwrap());
        }
        registry
    }

    #[test]
    fn press_completing_chord_reports_position() {
        let registry = registry(&[(Position::TopLeft, "alt+q")]);
        let mut rec = ChordRecognizer::new();

        assert_eq!(rec.on_press(SCAN_ALT, &registry), None);
        assert_eq!(rec.on_press(SCAN_Q, &registry), Some(Position::TopLeft));
        assert_eq!(rec.held_count(), 2);
    }

    #[test]
    fn single_key_chord_fires_immediately() {
        let registry = registry(&[(Position::Bottom, "b")]);
        let mut rec = ChordRecognizer::new();

        assert_eq!(rec.on_press(48, &registry), Some(Position::Bottom));
    }

    #[test]
    fn unrecognized_codes_never_enter_the_held_set() {
        let registry = registry(&[(Position::TopLeft, "alt+q")]);
        let mut rec = ChordRecognizer::new();

        assert_eq!(rec.on_press(SCAN_ESC, &registry), None);
        assert_eq!(rec.held_count(), 0);

        // An unrecognized press mid-chord neither blocks nor fires.
        rec.on_press(SCAN_ALT, &registry);
        assert_eq!(rec.on_press(SCAN_ESC, &registry), None);
        assert_eq!(rec.held_count(), 1);
        assert_eq!(rec.on_press(SCAN_Q, &registry), Some(Position::TopLeft));
    }

    #[test]
    fn release_of_untracked_key_is_idempotent() {
        let registry = registry(&[(Position::TopLeft, "alt+q")]);
        let mut rec = ChordRecognizer::new();

        rec.on_release(SCAN_Q);
        rec.on_release(SCAN_ESC);
        assert_eq!(rec.held_count(), 0);

        rec.on_press(SCAN_ALT, &registry);
        rec.on_release(SCAN_Q);
        assert_eq!(rec.held_count(), 1);
    }

    #[test]
    fn matching_runs_only_on_press() {
        let registry = registry(&[(Position::TopLeft, "alt+q")]);
        let mut rec = ChordRecognizer::new();

        rec.on_press(SCAN_ALT, &registry);
        assert_eq!(rec.on_press(SCAN_Q, &registry), Some(Position::TopLeft));

        // Releasing and re-pressing the completing key fires again.
        rec.on_release(SCAN_Q);
        assert_eq!(rec.held_count(), 1);
        assert_eq!(rec.on_press(SCAN_Q, &registry), Some(Position::TopLeft));
    }

    #[test]
    fn extra_held_key_does_not_block_a_subset_chord() {
        let registry = registry(&[(Position::TopLeft, "alt+q")]);
        let mut rec = ChordRecognizer::new();

        rec.on_press(SCAN_ALT, &registry);
        rec.on_press(SCAN_X, &registry);
        assert_eq!(rec.on_press(SCAN_Q, &registry), Some(Position::TopLeft));
    }

    #[test]
    fn first_position_wins_when_chords_overlap() {
        let registry = registry(&[
            (Position::TopRight, "alt+q"),
            (Position::Bottom, "alt+q+w"),
        ]);
        let mut rec = ChordRecognizer::new();

        rec.on_press(SCAN_ALT, &registry);
        rec.on_press(SCAN_Q, &registry);
        // Both chords are now satisfied; the earlier position is reported.
        assert_eq!(rec.on_press(SCAN_W, &registry), Some(Position::TopRight));
    }

    #[test]
    fn empty_registry_never_matches() {
        let registry = ShortcutRegistry::new();
        let mut rec = ChordRecognizer::new();

        assert_eq!(rec.on_press(SCAN_ALT, &registry), None);
        assert_eq!(rec.on_press(SCAN_Q, &registry), None);
        assert_eq!(rec.held_count(), 2);
    }
}
