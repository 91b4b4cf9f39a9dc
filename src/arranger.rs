//! Window arranging on chord matches.
//!
//! `WindowArranger` turns a recognized position into one non-activating
//! placement call. Every failure mode short of a bug is a skip, not an
//! error: focus may be gone, the window may have closed mid-flight, or
//! the user may have paused arranging from the CLI.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::geometry;
use crate::platform::WindowOps;
use crate::shortcuts::Position;

/// Shared pause flag.
///
/// Pausing gates placement only; key tracking keeps running so the held
/// set stays accurate and resume needs no re-sync.
#[derive(Clone, Debug)]
pub struct PauseHandle {
    paused: Arc<AtomicBool>,
}

impl PauseHandle {
    pub fn new(paused: bool) -> Self {
        Self {
            paused: Arc::new(AtomicBool::new(paused)),
        }
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

impl Default for PauseHandle {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Outcome of one arrange request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrangeOutcome {
    /// The window was moved to its target rectangle.
    Placed,
    /// Arranging is paused; nothing was touched.
    Paused,
    /// No window had focus when the chord fired.
    NoFocusedWindow,
    /// An OS query or the placement call failed; logged and dropped.
    Skipped,
}

/// Applies snap positions to the currently focused window.
pub struct WindowArranger<O: WindowOps> {
    ops: O,
    pause: PauseHandle,
}

impl<O: WindowOps> WindowArranger<O> {
    pub fn new(ops: O, pause: PauseHandle) -> Self {
        Self { ops, pause }
    }

    /// Snap the focused window to `position`.
    ///
    /// Placement is never retried: window state is only valid for the
    /// instant the chord fired, so a failed call is stale by definition.
    pub fn arrange(&self, position: Position) -> ArrangeOutcome {
        if self.pause.is_paused() {
            debug!(%position, "arranging paused, chord ignored");
            return ArrangeOutcome::Paused;
        }

        let Some(window) = self.ops.focused_window() else {
            debug!(%position, "no focused window, nothing to arrange");
            return ArrangeOutcome::NoFocusedWindow;
        };

        let window_rect = match self.ops.window_rect(window) {
            Ok(rect) => rect,
            Err(e) => {
                warn!(%position, error = %e, "window rect query failed, skipping");
                return ArrangeOutcome::Skipped;
            }
        };
        let monitor = match self.ops.monitor_rect(window) {
            Ok(rect) => rect,
            Err(e) => {
                warn!(%position, error = %e, "monitor query failed, skipping");
                return ArrangeOutcome::Skipped;
            }
        };
        let resizable = self.ops.is_resizable(window);

        let target = geometry::target_rect(monitor, window_rect, resizable, position);
        match self.ops.place_window(window, target) {
            Ok(()) => {
                info!(%position, ?target, resizable, "window snapped");
                ArrangeOutcome::Placed
            }
            Err(e) => {
                warn!(%position, error = %e, "placement failed, skipping");
                ArrangeOutcome::Skipped
            }
        }
    }
}
