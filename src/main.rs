//! snapkey command line: the `run` daemon plus shortcut management.
//!
//! `bind`, `unbind` and `bindings` edit the same shortcuts file the daemon
//! watches, so a running daemon picks the changes up without a restart.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use snapkey::config;
use snapkey::logging;
use snapkey::shortcuts::{self, Chord, Position};

#[derive(Parser)]
#[command(
    name = "snapkey",
    version,
    about = "Snap the focused window into screen regions with held key chords"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the background daemon (Windows only)
    Run {
        /// Start with placement paused; chords are tracked but ignored
        #[arg(long)]
        paused: bool,
        /// Read shortcuts from FILE instead of the configured path
        #[arg(long, value_name = "FILE")]
        shortcuts: Option<PathBuf>,
    },
    /// List all bindings in priority order
    Bindings,
    /// Bind a position to a key chord, e.g. `snapkey bind top_left alt+q`
    Bind {
        position: Position,
        /// Key names or canonical codes, separated by `+`, `,` or spaces
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Remove the binding for a position
    Unbind { position: Position },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    // Bare `snapkey` runs the daemon, matching how a login item starts it.
    let command = cli.command.unwrap_or(Command::Run {
        paused: false,
        shortcuts: None,
    });
    match command {
        Command::Run { paused, shortcuts } => run(paused, shortcuts),
        Command::Bindings => {
            logging::init_cli();
            list_bindings()
        }
        Command::Bind { position, keys } => {
            logging::init_cli();
            bind(position, &keys.join(" "))
        }
        Command::Unbind { position } => {
            logging::init_cli();
            unbind(position)
        }
    }
}

fn run(paused: bool, shortcuts_override: Option<PathBuf>) -> Result<()> {
    // Config is read before logging comes up, so its own diagnostics are
    // summarized again once the subscriber exists.
    let config = config::load_config();
    let _guard = logging::init(&config.get_log_filter());

    let shortcuts_path = shortcuts_override.unwrap_or_else(|| config.get_shortcuts_path());
    let start_paused = paused || config.get_start_paused();
    run_daemon(shortcuts_path, start_paused)
}

#[cfg(windows)]
fn run_daemon(shortcuts_path: PathBuf, start_paused: bool) -> Result<()> {
    use std::sync::Arc;
    use std::thread;

    use parking_lot::Mutex;
    use tracing::{info, warn};

    use snapkey::arranger::{PauseHandle, WindowArranger};
    use snapkey::engine;
    use snapkey::error::ResultExt;
    use snapkey::hook::KeyboardHook;
    use snapkey::platform::Win32WindowOps;
    use snapkey::recognizer::ChordRecognizer;
    use snapkey::watcher::{ReloadEvent, ShortcutsWatcher};

    // An unreadable file is not fatal here; the daemon still delivers
    // events and picks the file up through the watcher once it is fixed.
    let registry = match shortcuts::load(&shortcuts_path) {
        Ok(registry) => registry,
        Err(e) => {
            warn!(
                error = %e,
                path = %shortcuts_path.display(),
                "shortcuts file unreadable, starting with no bindings"
            );
            shortcuts::ShortcutRegistry::new()
        }
    };
    if registry.is_empty() {
        warn!(
            path = %shortcuts_path.display(),
            "no shortcuts configured; add one with `snapkey bind <position> <keys>`"
        );
    }
    let registry = Arc::new(Mutex::new(registry));

    let (mut watcher, reload_rx) = ShortcutsWatcher::new();
    watcher.start(shortcuts_path.clone()).warn_on_err();

    // Apply file changes to the live registry. Swapping the whole registry
    // under the lock keeps any single match scan on one consistent snapshot.
    let reload_registry = Arc::clone(&registry);
    let reload_path = shortcuts_path.clone();
    thread::spawn(move || {
        while let Ok(ReloadEvent::Reload) = reload_rx.recv() {
            match shortcuts::load(&reload_path) {
                Ok(fresh) => {
                    let bindings = fresh.len();
                    *reload_registry.lock() = fresh;
                    info!(bindings, "shortcuts reloaded");
                }
                Err(e) => {
                    warn!(error = %e, "shortcuts reload failed, keeping current bindings");
                }
            }
        }
    });

    let hook = KeyboardHook::new();
    let events = hook
        .start()
        .context("installing the low-level keyboard hook")?;

    let pause = PauseHandle::new(start_paused);
    let arranger = WindowArranger::new(Win32WindowOps, pause);
    info!(
        shortcuts = %shortcuts_path.display(),
        bindings = registry.lock().len(),
        paused = start_paused,
        "snapkey daemon ready"
    );

    engine::run(events, registry, ChordRecognizer::default(), &arranger);

    hook.stop();
    Ok(())
}

#[cfg(not(windows))]
fn run_daemon(_shortcuts_path: PathBuf, _start_paused: bool) -> Result<()> {
    anyhow::bail!(
        "the snapkey daemon requires Windows; `bind`, `unbind` and `bindings` work anywhere"
    )
}

fn cli_shortcuts_path() -> PathBuf {
    config::load_config().get_shortcuts_path()
}

fn list_bindings() -> Result<()> {
    let path = cli_shortcuts_path();
    let registry = shortcuts::load(&path)
        .with_context(|| format!("loading shortcuts from {}", path.display()))?;

    if registry.is_empty() {
        println!("no bindings in {}", path.display());
        return Ok(());
    }
    for (position, chord) in registry.iter() {
        let keys = chord.to_string();
        let codes = chord
            .codes()
            .map(|code| code.to_string())
            .collect::<Vec<_>>()
            .join(",");
        println!("{:<13} {:<12} ({})", position.as_str(), keys, codes);
    }
    Ok(())
}

fn bind(position: Position, keys: &str) -> Result<()> {
    let path = cli_shortcuts_path();
    let chord = Chord::parse(keys)?;

    let mut registry = shortcuts::load(&path)
        .with_context(|| format!("loading shortcuts from {}", path.display()))?;
    if let Some(owner) = registry.is_in_use(&chord, Some(position)) {
        anyhow::bail!("{} is already bound to {}", chord, owner);
    }
    registry.set(position, chord);
    shortcuts::save(&path, &registry)
        .with_context(|| format!("saving shortcuts to {}", path.display()))?;

    // Echo what actually landed on disk
    let saved = shortcuts::load(&path)?;
    match saved.chord_for(position) {
        Some(chord) => println!("{} = {}", position, chord),
        None => anyhow::bail!(
            "{} did not survive the save; check {}",
            position,
            path.display()
        ),
    }
    Ok(())
}

fn unbind(position: Position) -> Result<()> {
    let path = cli_shortcuts_path();
    let mut registry = shortcuts::load(&path)
        .with_context(|| format!("loading shortcuts from {}", path.display()))?;

    match registry.clear(position) {
        Some(chord) => {
            shortcuts::save(&path, &registry)
                .with_context(|| format!("saving shortcuts to {}", path.display()))?;
            println!("unbound {} (was {})", position, chord);
        }
        None => println!("{} is not bound", position),
    }
    Ok(())
}
