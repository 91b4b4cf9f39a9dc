//! Shortcut binding persistence.
//!
//! Bindings live in a flat text file, one record per position:
//! `position_name=code1,code2,...` with canonical key codes. Lines that do
//! not parse are skipped with a warning, never fatal: a half-edited file
//! still yields every binding that survives parsing.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use super::registry::ShortcutRegistry;
use super::types::{Chord, Position};

/// Error that can occur when reading or writing the shortcuts file.
///
/// Parse problems are not represented here: malformed records are skipped
/// during load, per the file contract.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("shortcuts file I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Load bindings from `path`.
///
/// Returns an empty registry if the file doesn't exist. A position that
/// appears on several lines keeps the last one, matching overlay-on-merge
/// behavior everywhere else.
pub fn load(path: &Path) -> Result<ShortcutRegistry, StoreError> {
    if !path.exists() {
        debug!(path = %path.display(), "shortcuts file absent, starting empty");
        return Ok(ShortcutRegistry::new());
    }

    let content = fs::read_to_string(path)?;
    let mut registry = ShortcutRegistry::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some((position, chord)) => registry.set(position, chord),
            None => warn!(line, "skipping malformed shortcuts record"),
        }
    }
    Ok(registry)
}

/// Save `registry` to `path`, merging over whatever is on disk.
///
/// Disk state is re-read first and in-memory entries overlaid per
/// position, so two writers clobber each other one position at a time
/// rather than wholesale. Positions cleared this session are dropped. The
/// file is replaced via a same-directory temp file and rename.
pub fn save(path: &Path, registry: &ShortcutRegistry) -> Result<(), StoreError> {
    let mut merged = match load(path) {
        Ok(on_disk) => on_disk,
        Err(e) => {
            warn!(error = %e, "could not re-read shortcuts file before save, writing from memory only");
            ShortcutRegistry::new()
        }
    };
    for (position, chord) in registry.iter() {
        merged.set(position, chord.clone());
    }
    for position in registry.cleared() {
        merged.clear(position);
    }

    let mut content = String::new();
    for (position, chord) in merged.iter() {
        content.push_str(position.as_str());
        content.push('=');
        let codes: Vec<String> = chord.codes().map(|c| c.to_string()).collect();
        content.push_str(&codes.join(","));
        content.push('\n');
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, &content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Parse one `position_name=code1,code2,...` record.
fn parse_line(line: &str) -> Option<(Position, Chord)> {
    let (name, codes) = line.split_once('=')?;
    // A second '=' means the record shape is wrong, not a code list quirk.
    if codes.contains('=') {
        return None;
    }
    let position: Position = name.trim().parse().ok()?;
    let codes: Vec<u16> = codes
        .split(',')
        .map(|c| c.trim().parse::<u16>())
        .collect::<Result<_, _>>()
        .ok()?;
    let chord = Chord::from_codes(codes).ok()?;
    Some((position, chord))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Get the default path for the shortcuts file.
pub fn default_shortcuts_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".snapkey")
        .join("shortcuts.txt")
}
