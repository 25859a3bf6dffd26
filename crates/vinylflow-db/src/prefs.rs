//! # UI Preferences
//!
//! Tiny JSON sidecar file holding the user's display preferences.
//!
//! ## Load Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      load(path)                                          │
//! │                                                                         │
//! │  file absent          ──► Ok(defaults)   (first run, not an error)     │
//! │  file unreadable      ──► Err(Io)                                       │
//! │  file unparsable      ──► Err(Corrupt)   (never silently reset)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A corrupt file is surfaced rather than overwritten with defaults, so
//! the caller can decide whether to keep the broken file for inspection.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Display preferences persisted between sessions.
///
/// Unknown keys in the file are ignored and missing keys take their
/// defaults, so the format can grow without breaking old files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePrefs {
    /// Dark color scheme. Defaults to off.
    #[serde(default)]
    pub dark_mode: bool,
}

/// Preference file errors.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// The file exists but could not be read, or could not be written.
    #[error("Preferences I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file exists but is not valid preferences JSON.
    #[error("Preferences file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing preferences failed.
    #[error("Could not encode preferences: {0}")]
    Encode(serde_json::Error),
}

/// Loads preferences from `path`.
///
/// A missing file yields the defaults; a present-but-corrupt file is an
/// error.
pub fn load(path: impl AsRef<Path>) -> Result<ThemePrefs, PrefsError> {
    let path = path.as_ref();

    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No preferences file, using defaults");
            return Ok(ThemePrefs::default());
        }
        Err(e) => return Err(PrefsError::Io(e)),
    };

    serde_json::from_str(&contents).map_err(|source| PrefsError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Saves preferences to `path`, replacing any existing file.
pub fn save(path: impl AsRef<Path>, prefs: &ThemePrefs) -> Result<(), PrefsError> {
    let path = path.as_ref();

    let contents = serde_json::to_string_pretty(prefs).map_err(PrefsError::Encode)?;
    fs::write(path, contents)?;

    debug!(path = %path.display(), "Preferences saved");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
