//! The daemon event loop: hook events in, placements out.
//!
//! A single consumer drains the hook channel, so key events are applied
//! to the recognizer strictly in arrival order and no two match
//! evaluations ever run at once.

use std::sync::mpsc::Receiver;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::arranger::WindowArranger;
use crate::platform::WindowOps;
use crate::recognizer::ChordRecognizer;
use crate::shortcuts::ShortcutRegistry;

/// Direction of a key transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEventKind {
    Press,
    Release,
}

/// One raw key transition delivered by the input hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    /// Raw code in the hook's namespace (set-1 scan code on Windows).
    pub raw: u32,
}

impl KeyEvent {
    pub fn press(raw: u32) -> Self {
        Self {
            kind: KeyEventKind::Press,
            raw,
        }
    }

    pub fn release(raw: u32) -> Self {
        Self {
            kind: KeyEventKind::Release,
            raw,
        }
    }
}

/// Consume hook events until the channel closes.
///
/// The registry lock is taken once per press, for the duration of that
/// press's match scan, so a concurrent registry reload can never be
/// observed halfway through one evaluation. Placement runs after the
/// lock is released.
pub fn run<O: WindowOps>(
    events: Receiver<KeyEvent>,
    registry: Arc<Mutex<ShortcutRegistry>>,
    mut recognizer: ChordRecognizer,
    arranger: &WindowArranger<O>,
) {
    info!("event loop started");
    while let Ok(event) = events.recv() {
        match event.kind {
            KeyEventKind::Press => {
                let matched = recognizer.on_press(event.raw, &registry.lock());
                if let Some(position) = matched {
                    debug!(%position, held = recognizer.held_count(), "chord matched");
                    let outcome = arranger.arrange(position);
                    trace!(?outcome, "arrange finished");
                } else {
                    trace!(raw = event.raw, held = recognizer.held_count(), "press");
                }
            }
            KeyEventKind::Release => {
                recognizer.on_release(event.raw);
                trace!(raw = event.raw, held = recognizer.held_count(), "release");
            }
        }
    }
    info!("event channel closed, event loop exiting");
}
