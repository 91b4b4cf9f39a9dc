use notify::{recommended_watcher, RecursiveMode, Result as NotifyResult, Watcher};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

/// Event emitted when the shortcuts file needs to be reloaded
#[derive(Debug, Clone)]
pub enum ReloadEvent {
    Reload,
}

/// Watches the shortcuts file for changes and emits reload events
pub struct ShortcutsWatcher {
    tx: Option<Sender<ReloadEvent>>,
    running: Arc<AtomicBool>,
    watcher_thread: Option<thread::JoinHandle<()>>,
}

impl ShortcutsWatcher {
    /// Create a new ShortcutsWatcher
    ///
    /// Returns a tuple of (watcher, receiver) where receiver will emit ReloadEvent
    /// when the shortcuts file changes.
    pub fn new() -> (Self, Receiver<ReloadEvent>) {
        let (tx, rx) = channel();
        let watcher = ShortcutsWatcher {
            tx: Some(tx),
            running: Arc::new(AtomicBool::new(true)),
            watcher_thread: None,
        };
        (watcher, rx)
    }

    /// Start watching the shortcuts file for changes
    ///
    /// This spawns a background thread that watches the directory containing the
    /// shortcuts file and sends reload events through the receiver when the file
    /// is created or modified. Edits from any source count, including the `bind`
    /// and `unbind` subcommands run against the same file.
    pub fn start(&mut self, shortcuts_path: PathBuf) -> NotifyResult<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| std::io::Error::other("watcher already started"))?;

        let running = self.running.clone();
        let thread_handle = thread::spawn(move || {
            if let Err(e) = Self::watch_loop(tx, &shortcuts_path, &running) {
                warn!(error = %e, watcher = "shortcuts", "Shortcuts watcher error");
            }
        });

        self.watcher_thread = Some(thread_handle);
        Ok(())
    }

    /// Internal watch loop running in background thread
    fn watch_loop(
        tx: Sender<ReloadEvent>,
        shortcuts_path: &Path,
        running: &AtomicBool,
    ) -> NotifyResult<()> {
        // Watch the parent directory rather than the file itself, so edits that
        // replace the file (temp write + rename) keep being observed.
        let watch_path = shortcuts_path.parent().unwrap_or_else(|| Path::new("."));

        let target_name = shortcuts_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("shortcuts.txt")
            .to_string();

        // Create a debounce timer using Arc<Mutex>
        let debounce_active = Arc::new(Mutex::new(false));
        let debounce_active_clone = debounce_active.clone();

        // Channel for the file watcher thread
        let (watch_tx, watch_rx) = channel();

        // Create the watcher with a callback
        let mut watcher: Box<dyn Watcher> = Box::new(recommended_watcher(
            move |res: notify::Result<notify::Event>| {
                let _ = watch_tx.send(res);
            },
        )?);

        // Watch the directory containing the shortcuts file
        watcher.watch(watch_path, RecursiveMode::NonRecursive)?;

        info!(
            path = %watch_path.display(),
            target = %target_name,
            "Shortcuts watcher started"
        );

        // Main watch loop; the timeout bounds how long shutdown can take
        loop {
            match watch_rx.recv_timeout(Duration::from_millis(500)) {
                Ok(Ok(event)) => {
                    // Check if this is an event for the shortcuts file
                    let is_shortcuts_change = event.paths.iter().any(|path: &PathBuf| {
                        path.file_name()
                            .and_then(|name| name.to_str())
                            .map(|name| name == target_name)
                            .unwrap_or(false)
                    });

                    // Only care about Create and Modify events
                    let is_relevant_event = matches!(
                        event.kind,
                        notify::EventKind::Create(_) | notify::EventKind::Modify(_)
                    );

                    if is_shortcuts_change && is_relevant_event {
                        // Check if debounce is already active
                        let mut debounce = debounce_active_clone.lock();
                        if !*debounce {
                            *debounce = true;
                            drop(debounce); // Release lock before spawning thread

                            let tx_clone = tx.clone();
                            let debounce_flag = debounce_active_clone.clone();
                            let file_name = target_name.clone();

                            // Spawn debounce thread
                            thread::spawn(move || {
                                thread::sleep(Duration::from_millis(500));
                                let _ = tx_clone.send(ReloadEvent::Reload);
                                *debounce_flag.lock() = false;
                                info!(
                                    file = %file_name,
                                    "Shortcuts file changed, emitting reload event"
                                );
                            });
                        }
                    }
                }
                Ok(Err(e)) => {
                    warn!(error = %e, watcher = "shortcuts", "File watcher error");
                }
                Err(RecvTimeoutError::Timeout) => {
                    if !running.load(Ordering::SeqCst) {
                        info!(watcher = "shortcuts", "Shortcuts watcher shutting down");
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    // Channel closed, exit watch loop
                    info!(watcher = "shortcuts", "Shortcuts watcher shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

impl Drop for ShortcutsWatcher {
    fn drop(&mut self) {
        // Signal the loop, then wait for it to notice
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.watcher_thread.take() {
            let _ = handle.join();
        }
    }
}
