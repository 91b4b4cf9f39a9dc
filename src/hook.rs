//! Low-level keyboard hook.
//!
//! Installs a WH_KEYBOARD_LL hook on a dedicated thread and forwards
//! every press/release, with its set-1 scan code, over a channel. The
//! hook callback does nothing but classify and send: Windows silently
//! removes hooks whose callbacks stall, so all real work happens on the
//! consumer side of the channel.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, GetMessageW, PeekMessageW, PostThreadMessageW, SetWindowsHookExW,
    UnhookWindowsHookEx, KBDLLHOOKSTRUCT, MSG, PM_NOREMOVE, WH_KEYBOARD_LL, WM_KEYDOWN,
    WM_KEYUP, WM_QUIT, WM_SYSKEYDOWN, WM_SYSKEYUP, WM_USER,
};

use crate::engine::KeyEvent;

/// Errors that can occur installing or running the keyboard hook.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("keyboard hook is already running")]
    AlreadyRunning,

    #[error("failed to install the keyboard hook: {0}")]
    Install(String),

    #[error("failed to spawn hook thread: {0}")]
    ThreadSpawn(String),
}

/// The hook callback cannot capture state, so the sender it forwards
/// into lives here for the lifetime of the running hook. One hook per
/// process: `start` claims this slot, and a second claim is refused.
static EVENT_TX: Mutex<Option<mpsc::Sender<KeyEvent>>> = Mutex::new(None);

/// System-wide keyboard event source. At most one hook can be running
/// per process, regardless of how many `KeyboardHook` values exist.
///
/// `start` spawns the hook thread and hands back the receiving end of
/// the event stream; dropping all events on the floor is the consumer's
/// prerogative. `stop` posts WM_QUIT to the pump and joins the thread,
/// which closes the channel.
pub struct KeyboardHook {
    running: Arc<AtomicBool>,
    pump_thread_id: Arc<AtomicU32>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl KeyboardHook {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            pump_thread_id: Arc::new(AtomicU32::new(0)),
            thread: Mutex::new(None),
        }
    }

    /// Install the hook and start delivering events.
    ///
    /// Returns once the hook is actually installed, so a failure here
    /// means the process has no event source and should not limp on.
    pub fn start(&self) -> Result<mpsc::Receiver<KeyEvent>, HookError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(HookError::AlreadyRunning);
        }

        let (event_tx, event_rx) = mpsc::channel();
        {
            // Claim the sender slot before spawning anything; a second
            // instance is refused here instead of stealing this stream.
            let mut slot = EVENT_TX.lock();
            if slot.is_some() {
                self.running.store(false, Ordering::SeqCst);
                return Err(HookError::AlreadyRunning);
            }
            *slot = Some(event_tx);
        }

        let (ready_tx, ready_rx) = mpsc::channel();
        let running = Arc::clone(&self.running);
        let pump_thread_id = Arc::clone(&self.pump_thread_id);

        let handle = thread::Builder::new()
            .name("keyboard-hook".to_string())
            .spawn(move || {
                run_hook_loop(ready_tx, pump_thread_id);
                running.store(false, Ordering::SeqCst);
            })
            .map_err(|e| {
                *EVENT_TX.lock() = None;
                self.running.store(false, Ordering::SeqCst);
                HookError::ThreadSpawn(e.to_string())
            })?;
        *self.thread.lock() = Some(handle);

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("keyboard hook installed");
                Ok(event_rx)
            }
            Ok(Err(e)) => {
                self.join_thread();
                *EVENT_TX.lock() = None;
                self.running.store(false, Ordering::SeqCst);
                Err(e)
            }
            Err(_) => {
                self.join_thread();
                *EVENT_TX.lock() = None;
                self.running.store(false, Ordering::SeqCst);
                Err(HookError::Install(
                    "hook thread exited before installing".to_string(),
                ))
            }
        }
    }

    /// Remove the hook and end the event stream.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let thread_id = self.pump_thread_id.load(Ordering::SeqCst);
        if thread_id != 0 {
            // SAFETY: posting to our own pump thread; the queue exists
            // because the thread peeked it before acking install.
            if let Err(e) =
                unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }
            {
                warn!(error = %e, "failed to post quit to hook thread");
            }
        }
        self.join_thread();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn join_thread(&self) {
        if let Some(handle) = self.thread.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Default for KeyboardHook {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for KeyboardHook {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Hook-thread body: install, pump, tear down. The caller has already
/// placed the event sender in EVENT_TX; this thread clears it on exit.
fn run_hook_loop(ready_tx: mpsc::Sender<Result<(), HookError>>, pump_thread_id: Arc<AtomicU32>) {
    let mut msg = MSG::default();
    // Peeking creates this thread's message queue, so stop() can post
    // WM_QUIT as soon as start() returns.
    // SAFETY: msg outlives the call; PM_NOREMOVE touches nothing.
    unsafe {
        let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
    }

    // SAFETY: keyboard_proc stays valid for the life of the hook, and
    // WH_KEYBOARD_LL takes no module handle.
    let hook = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_proc), None, 0) } {
        Ok(hook) => hook,
        Err(e) => {
            *EVENT_TX.lock() = None;
            let _ = ready_tx.send(Err(HookError::Install(e.to_string())));
            return;
        }
    };
    // SAFETY: trivial thread-id query.
    pump_thread_id.store(unsafe { GetCurrentThreadId() }, Ordering::SeqCst);
    let _ = ready_tx.send(Ok(()));
    debug!("keyboard hook thread pumping");

    loop {
        // SAFETY: msg outlives the call. Returns 0 on WM_QUIT and -1 on
        // error; both end the pump.
        let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if ret.0 <= 0 {
            break;
        }
        // No windows live on this thread; the pump exists only so the
        // hook gets called and WM_QUIT can reach us.
    }

    // SAFETY: handle came from the successful install above.
    if let Err(e) = unsafe { UnhookWindowsHookEx(hook) } {
        warn!(error = %e, "failed to remove keyboard hook");
    }
    *EVENT_TX.lock() = None;
    debug!("keyboard hook thread exiting");
}

/// The WH_KEYBOARD_LL callback. Classifies the message, forwards the
/// scan code, and gets out of the way.
unsafe extern "system" fn keyboard_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 {
        // SAFETY: for WH_KEYBOARD_LL with code >= 0, lparam points at a
        // live KBDLLHOOKSTRUCT for the duration of the call.
        let info = unsafe { &*(lparam.0 as *const KBDLLHOOKSTRUCT) };
        let event = match wparam.0 as u32 {
            WM_KEYDOWN | WM_SYSKEYDOWN => Some(KeyEvent::press(info.scanCode)),
            WM_KEYUP | WM_SYSKEYUP => Some(KeyEvent::release(info.scanCode)),
            _ => None,
        };
        if let Some(event) = event {
            if let Some(tx) = EVENT_TX.lock().as_ref() {
                // A closed channel is the consumer's problem, never the
                // callback's.
                let _ = tx.send(event);
            }
        }
    }
    // SAFETY: forwarding unchanged to the rest of the hook chain.
    unsafe { CallNextHookEx(None, code, wparam, lparam) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_starts_stopped() {
        let hook = KeyboardHook::new();
        assert!(!hook.is_running());
    }

    // The live-desktop suite claims the slot for real; keep this fake
    // claim out of that run so the two cannot race.
    #[cfg(not(feature = "system-tests"))]
    #[test]
    fn start_is_refused_while_another_hook_owns_the_slot() {
        // Occupy the slot the way a running hook would. The claim check
        // runs before any thread is spawned, so no hook gets installed.
        let (tx, _rx) = mpsc::channel();
        *EVENT_TX.lock() = Some(tx);

        let hook = KeyboardHook::new();
        assert!(matches!(hook.start(), Err(HookError::AlreadyRunning)));
        assert!(!hook.is_running());

        *EVENT_TX.lock() = None;
    }

    // Installing a real hook needs an interactive desktop session.
    #[cfg(feature = "system-tests")]
    mod system_tests {
        use super::*;
        use std::time::Duration;

        #[test]
        fn install_pump_and_stop() {
            let hook = KeyboardHook::new();
            let events = hook.start().expect("hook should install");
            assert!(hook.is_running());

            assert!(hook.start().is_err(), "second start must be rejected");

            let other = KeyboardHook::new();
            assert!(
                matches!(other.start(), Err(HookError::AlreadyRunning)),
                "a second instance must be refused too"
            );

            hook.stop();
            assert!(!hook.is_running());

            // The channel closes once the hook thread exits.
            let err = events.recv_timeout(Duration::from_secs(1));
            assert!(err.is_err());
        }
    }
}
