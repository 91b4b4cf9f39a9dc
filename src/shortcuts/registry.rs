//! Position-keyed chord registry.
//!
//! Uses a BTreeMap so iteration and matching always follow `Position`
//! priority order, independent of insertion order.

use std::collections::{BTreeMap, BTreeSet};

use super::types::{Chord, Position};
use crate::keycode::VirtualKey;

/// Central registry of chord bindings, one slot per position.
///
/// `cleared` remembers positions explicitly unbound during this session,
/// so a save can drop them from disk instead of resurrecting them on
/// merge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShortcutRegistry {
    bindings: BTreeMap<Position, Chord>,
    cleared: BTreeSet<Position>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `position` to `chord`, replacing any previous chord for that
    /// position.
    pub fn set(&mut self, position: Position, chord: Chord) {
        self.cleared.remove(&position);
        self.bindings.insert(position, chord);
    }

    /// Remove the binding for `position`, returning the chord that was
    /// bound there.
    pub fn clear(&mut self, position: Position) -> Option<Chord> {
        self.cleared.insert(position);
        self.bindings.remove(&position)
    }

    /// Positions unbound since this registry was loaded.
    pub fn cleared(&self) -> impl Iterator<Item = Position> + '_ {
        self.cleared.iter().copied()
    }

    pub fn chord_for(&self, position: Position) -> Option<&Chord> {
        self.bindings.get(&position)
    }

    /// Check whether `chord` is already bound to some other position.
    ///
    /// `exclude` is the position being edited; its own current binding does
    /// not count as a conflict. Returns the owning position if one exists.
    pub fn is_in_use(&self, chord: &Chord, exclude: Option<Position>) -> Option<Position> {
        self.bindings
            .iter()
            .filter(|(pos, _)| Some(**pos) != exclude)
            .find(|(_, bound)| *bound == chord)
            .map(|(pos, _)| *pos)
    }

    /// Find the first position whose chord is fully held in `pressed`.
    ///
    /// Positions are scanned in priority order and at most one match is
    /// returned, so overlapping chords resolve the same way every time.
    pub fn first_match(&self, pressed: &BTreeSet<VirtualKey>) -> Option<Position> {
        self.bindings
            .iter()
            .find(|(_, chord)| chord.is_satisfied_by(pressed))
            .map(|(pos, _)| *pos)
    }

    /// Bindings in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Chord)> {
        self.bindings.iter().map(|(pos, chord)| (*pos, chord))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(s: &str) -> Chord {
        Chord::parse(s).unwrap()
    }

    fn pressed(s: &str) -> BTreeSet<VirtualKey> {
        chord(s).keys().collect()
    }

    #[test]
    fn set_and_get() {
        let mut registry = ShortcutRegistry::new();
        assert!(registry.is_empty());

        registry.set(Position::TopLeft, chord("alt+q"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.chord_for(Position::TopLeft), Some(&chord("alt+q")));
        assert_eq!(registry.chord_for(Position::Bottom), None);
    }

    #[test]
    fn set_replaces_existing_binding() {
        let mut registry = ShortcutRegistry::new();
        registry.set(Position::Top, chord("alt+w"));
        registry.set(Position::Top, chord("alt+e"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.chord_for(Position::Top), Some(&chord("alt+e")));
    }

    #[test]
    fn clear_removes_binding() {
        let mut registry = ShortcutRegistry::new();
        registry.set(Position::Middle, chord("alt+s"));

        assert_eq!(registry.clear(Position::Middle), Some(chord("alt+s")));
        assert_eq!(registry.clear(Position::Middle), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_leaves_a_tombstone_until_rebound() {
        let mut registry = ShortcutRegistry::new();
        registry.set(Position::Middle, chord("alt+s"));
        registry.clear(Position::Middle);

        assert_eq!(registry.cleared().collect::<Vec<_>>(), vec![Position::Middle]);

        registry.set(Position::Middle, chord("alt+d"));
        assert_eq!(registry.cleared().count(), 0);
    }

    #[test]
    fn is_in_use_finds_owner() {
        let mut registry = ShortcutRegistry::new();
        registry.set(Position::TopLeft, chord("alt+q"));
        registry.set(Position::TopRight, chord("alt+w"));

        assert_eq!(
            registry.is_in_use(&chord("alt+w"), None),
            Some(Position::TopRight)
        );
        assert_eq!(registry.is_in_use(&chord("alt+z"), None), None);
    }

    #[test]
    fn is_in_use_ignores_the_position_being_edited() {
        let mut registry = ShortcutRegistry::new();
        registry.set(Position::TopLeft, chord("alt+q"));

        // Re-saving the same chord onto its own position is not a conflict.
        assert_eq!(
            registry.is_in_use(&chord("alt+q"), Some(Position::TopLeft)),
            None
        );
        // But another position claiming it is.
        assert_eq!(
            registry.is_in_use(&chord("alt+q"), Some(Position::Bottom)),
            Some(Position::TopLeft)
        );
    }

    #[test]
    fn first_match_requires_every_chord_key() {
        let mut registry = ShortcutRegistry::new();
        registry.set(Position::BottomRight, chord("alt+c"));

        assert_eq!(registry.first_match(&pressed("alt")), None);
        assert_eq!(registry.first_match(&pressed("c")), None);
        assert_eq!(
            registry.first_match(&pressed("alt+c")),
            Some(Position::BottomRight)
        );
    }

    #[test]
    fn first_match_allows_extra_held_keys() {
        let mut registry = ShortcutRegistry::new();
        registry.set(Position::Top, chord("alt+w"));

        assert_eq!(registry.first_match(&pressed("alt+w+x")), Some(Position::Top));
    }

    #[test]
    fn first_match_scans_positions_in_priority_order() {
        let mut registry = ShortcutRegistry::new();
        // Insert in reverse order; BTreeMap still scans TopLeft first.
        registry.set(Position::Bottom, chord("alt+q"));
        registry.set(Position::TopLeft, chord("alt+q"));

        assert_eq!(registry.first_match(&pressed("alt+q")), Some(Position::TopLeft));
    }

    #[test]
    fn first_match_prefers_earlier_position_over_larger_chord() {
        let mut registry = ShortcutRegistry::new();
        registry.set(Position::TopRight, chord("alt+q"));
        registry.set(Position::Bottom, chord("alt+q+w"));

        // Both chords are satisfied; the earlier position wins.
        assert_eq!(
            registry.first_match(&pressed("alt+q+w")),
            Some(Position::TopRight)
        );
    }

    #[test]
    fn iteration_follows_position_order() {
        let mut registry = ShortcutRegistry::new();
        registry.set(Position::Bottom, chord("alt+b"));
        registry.set(Position::TopLeft, chord("alt+q"));
        registry.set(Position::Middle, chord("alt+s"));

        let order: Vec<Position> = registry.iter().map(|(pos, _)| pos).collect();
        assert_eq!(
            order,
            vec![Position::TopLeft, Position::Middle, Position::Bottom]
        );
    }
}
