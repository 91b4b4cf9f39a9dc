//! OS window and monitor capabilities.
//!
//! `WindowOps` is the seam between the arranging logic and the desktop:
//! focused-window lookup, rectangle and style queries, monitor resolution,
//! and non-activating placement. The live implementation wraps Win32; a
//! scripted fake backs the unit tests.

use thiserror::Error;

use crate::geometry::Rect;

/// Opaque handle to a top-level window.
///
/// On Windows this wraps the HWND value. Handles are only ever passed
/// back to the same `WindowOps` that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowId(pub(crate) usize);

/// Error from a window query or placement call.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("window query failed: {0}")]
    Query(String),
    #[error("window placement failed: {0}")]
    Placement(String),
}

/// The window/monitor capability set the arranger depends on.
pub trait WindowOps {
    /// The window currently holding input focus, if any. Focus can vanish
    /// at any moment, so callers treat `None` as a routine no-op.
    fn focused_window(&self) -> Option<WindowId>;

    /// Current bounds of `window` in screen coordinates.
    fn window_rect(&self, window: WindowId) -> Result<Rect, PlatformError>;

    /// Whether `window` has a sizing border. Queries that fail report
    /// false, which degrades to move-without-resize.
    fn is_resizable(&self, window: WindowId) -> bool;

    /// Full bounds of the monitor nearest to `window`.
    fn monitor_rect(&self, window: WindowId) -> Result<Rect, PlatformError>;

    /// Move and resize `window` to `target` without giving it focus.
    fn place_window(&self, window: WindowId, target: Rect) -> Result<(), PlatformError>;
}

impl<T: WindowOps + ?Sized> WindowOps for &T {
    fn focused_window(&self) -> Option<WindowId> {
        (**self).focused_window()
    }

    fn window_rect(&self, window: WindowId) -> Result<Rect, PlatformError> {
        (**self).window_rect(window)
    }

    fn is_resizable(&self, window: WindowId) -> bool {
        (**self).is_resizable(window)
    }

    fn monitor_rect(&self, window: WindowId) -> Result<Rect, PlatformError> {
        (**self).monitor_rect(window)
    }

    fn place_window(&self, window: WindowId, target: Rect) -> Result<(), PlatformError> {
        (**self).place_window(window, target)
    }
}

#[cfg(windows)]
pub use win32::Win32WindowOps;

#[cfg(windows)]
mod win32 {
    use windows::Win32::Foundation::{HWND, RECT};
    use windows::Win32::Graphics::Gdi::{
        GetMonitorInfoW, MonitorFromWindow, MONITORINFO, MONITOR_DEFAULTTONEAREST,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        GetForegroundWindow, GetWindowLongW, GetWindowRect, SetWindowPos, GWL_STYLE,
        SWP_NOACTIVATE, SWP_NOZORDER, WS_SIZEBOX,
    };

    use super::{PlatformError, Rect, WindowId, WindowOps};

    /// Live Win32 window operations.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Win32WindowOps;

    fn hwnd(window: WindowId) -> HWND {
        HWND(window.0 as *mut core::ffi::c_void)
    }

    impl WindowOps for Win32WindowOps {
        fn focused_window(&self) -> Option<WindowId> {
            // SAFETY: GetForegroundWindow takes no arguments and returns
            // NULL when no window has focus.
            let handle = unsafe { GetForegroundWindow() };
            if handle.0.is_null() {
                None
            } else {
                Some(WindowId(handle.0 as usize))
            }
        }

        fn window_rect(&self, window: WindowId) -> Result<Rect, PlatformError> {
            let mut rect = RECT::default();
            // SAFETY: rect outlives the call; GetWindowRect fails cleanly
            // for a stale handle.
            unsafe { GetWindowRect(hwnd(window), &mut rect) }
                .map_err(|e| PlatformError::Query(e.to_string()))?;
            Ok(Rect::new(rect.left, rect.top, rect.right, rect.bottom))
        }

        fn is_resizable(&self, window: WindowId) -> bool {
            // SAFETY: GetWindowLongW returns 0 on failure, which reads as
            // "no sizing border" below.
            let style = unsafe { GetWindowLongW(hwnd(window), GWL_STYLE) } as u32;
            style & WS_SIZEBOX.0 != 0
        }

        fn monitor_rect(&self, window: WindowId) -> Result<Rect, PlatformError> {
            // SAFETY: with MONITOR_DEFAULTTONEAREST the call always yields
            // a real monitor, even for off-screen windows.
            let monitor = unsafe { MonitorFromWindow(hwnd(window), MONITOR_DEFAULTTONEAREST) };
            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            // SAFETY: info.cbSize is set and info outlives the call.
            if !unsafe { GetMonitorInfoW(monitor, &mut info) }.as_bool() {
                return Err(PlatformError::Query("GetMonitorInfoW failed".to_string()));
            }
            let rc = info.rcMonitor;
            Ok(Rect::new(rc.left, rc.top, rc.right, rc.bottom))
        }

        fn place_window(&self, window: WindowId, target: Rect) -> Result<(), PlatformError> {
            // SAFETY: SetWindowPos is an OS API; SWP_NOACTIVATE keeps
            // focus where it is and SWP_NOZORDER leaves stacking alone.
            unsafe {
                SetWindowPos(
                    hwnd(window),
                    None,
                    target.left,
                    target.top,
                    target.width(),
                    target.height(),
                    SWP_NOACTIVATE | SWP_NOZORDER,
                )
            }
            .map_err(|e| PlatformError::Placement(e.to_string()))
        }
    }
}
