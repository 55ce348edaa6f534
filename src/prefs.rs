//! Persisted dashboard preferences.
//!
//! The restricted-subset filter is the only persisted UI preference. It is
//! modelled as an explicit store collaborator so nothing reads or writes
//! ambient global state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Narrow all dashboard metrics to the in-app connection channel
    #[serde(default)]
    pub in_app_only: bool,
}

pub trait PreferenceStore: Send + Sync {
    /// Load persisted preferences, falling back to defaults when nothing
    /// usable is stored.
    fn load(&self) -> Preferences;

    /// Persist preferences, replacing the previous value
    fn save(&self, prefs: &Preferences) -> Result<()>;
}

/// JSON-file-backed store
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Preferences {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!("Ignoring unreadable preference file {}: {e}", self.path.display());
                    Preferences::default()
                }
            },
            Err(_) => Preferences::default(),
        }
    }

    fn save(&self, prefs: &Preferences) -> Result<()> {
        let raw = serde_json::to_string_pretty(prefs)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("failed to write preferences to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("prefs.json"));
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("prefs.json"));
        let prefs = Preferences { in_app_only: true };
        store.save(&prefs).unwrap();
        assert_eq!(store.load(), prefs);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FilePreferenceStore::new(&path);
        assert_eq!(store.load(), Preferences::default());
    }
}
