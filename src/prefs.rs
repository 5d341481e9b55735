//! Flat string key-value preference store
//!
//! The settings loader only ever needs two operations from preference
//! storage: list the keys, and read one value. [`PrefStore`] is that
//! abstraction; [`FilePrefStore`] is the real backend (a TOML table under
//! the user config directory) and [`MemoryPrefStore`] is the in-memory
//! substitute used by tests.

use crate::constants::{PREFS_FILE_PERMISSIONS, PREFS_PERMISSION_MASK_GROUP_OTHER};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// The key-value surface the settings loader depends on.
///
/// `keys` and `get` are deliberately separate operations even though a
/// single map lookup could serve both: some platform preference backends
/// list a key and still return nothing when it is read, and the loader's
/// tolerant-read semantics are defined against that split.
pub trait PrefStore {
    /// Every key the store claims to hold.
    fn keys(&self) -> Vec<String>;
    /// The stored value for `key`, or `None` if it cannot be read.
    fn get(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: &str);
    /// Flush pending writes to the backing storage. No-op for stores
    /// without one.
    fn persist(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct PrefsDoc {
    entries: BTreeMap<String, String>,
}

/// Preference store backed by a TOML file of string values.
#[derive(Debug, Clone)]
pub struct FilePrefStore {
    path: PathBuf,
    doc: PrefsDoc,
}

impl FilePrefStore {
    /// The standard preference file path
    ///
    /// - macOS: `~/Library/Application Support/twenty/prefs.toml`
    /// - Linux: `~/.config/twenty/prefs.toml`
    /// - Windows: `%APPDATA%\twenty\prefs.toml`
    pub fn prefs_path() -> PathBuf {
        dirs::config_dir()
            .expect("Failed to determine config directory")
            .join("twenty")
            .join("prefs.toml")
    }

    /// Open the store at the standard location. A missing file is not an
    /// error: it yields an empty store, and the settings loader reports
    /// the absent keys from there.
    pub fn open() -> Result<Self> {
        Self::open_at(Self::prefs_path())
    }

    /// Open the store at the standard location, downgrading any open
    /// failure to an empty store. A corrupt or unreadable preference file
    /// must never prevent startup: the settings loader reports the absent
    /// keys, the fallback settings take over, and the next save rewrites
    /// the file.
    pub fn open_or_empty() -> Self {
        Self::open_at_or_empty(Self::prefs_path())
    }

    /// Like [`FilePrefStore::open_or_empty`], at a specific path.
    pub fn open_at_or_empty(path: PathBuf) -> Self {
        Self::open_at(path.clone()).unwrap_or_else(|e| {
            log::warn!("Could not open preference file ({e:#}); starting with an empty store");
            Self {
                path,
                doc: PrefsDoc::default(),
            }
        })
    }

    /// Open the store at a specific path. Primarily for tests.
    pub fn open_at(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                path,
                doc: PrefsDoc::default(),
            });
        }

        // Check file permissions (warning if too permissive)
        #[cfg(unix)]
        {
            let metadata =
                fs::metadata(&path).context("Failed to read preference file metadata")?;
            let mode = metadata.permissions().mode();
            if mode & PREFS_PERMISSION_MASK_GROUP_OTHER != 0 {
                log::warn!(
                    "Preference file has permissive permissions: {:o}. Should be {:o} (user read/write only).",
                    mode & 0o777,
                    PREFS_FILE_PERMISSIONS
                );
            }
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read preference file: {}", path.display()))?;
        let doc: PrefsDoc =
            toml::from_str(&contents).context("Failed to parse preference file")?;

        Ok(Self { path, doc })
    }

    /// Save the store back to its file.
    ///
    /// Creates the parent directory if it doesn't exist and sets file
    /// permissions to user read/write only.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create preference directory")?;
        }

        let contents =
            toml::to_string_pretty(&self.doc).context("Failed to serialize preferences")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write preference file: {}", self.path.display()))?;

        #[cfg(unix)]
        {
            let mut permissions = fs::metadata(&self.path)?.permissions();
            permissions.set_mode(PREFS_FILE_PERMISSIONS);
            fs::set_permissions(&self.path, permissions)
                .context("Failed to set preference file permissions")?;
        }

        log::info!("Preferences saved to: {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PrefStore for FilePrefStore {
    fn keys(&self) -> Vec<String> {
        self.doc.entries.keys().cloned().collect()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.doc.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) {
        self.doc.entries.insert(key.to_string(), value.to_string());
    }

    fn persist(&mut self) -> Result<()> {
        self.save()
    }
}

/// In-memory preference store for tests and ephemeral runs.
///
/// Values are stored as `Option<String>` so tests can reproduce the
/// listed-but-unreadable quirk of flaky platform backends via
/// [`MemoryPrefStore::put_listed_only`].
#[derive(Debug, Clone, Default)]
pub struct MemoryPrefStore {
    entries: BTreeMap<String, Option<String>>,
}

impl MemoryPrefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// List `key` without giving it a readable value: `keys()` will report
    /// it, `get` will return `None`.
    pub fn put_listed_only(&mut self, key: &str) {
        self.entries.insert(key.to_string(), None);
    }
}

impl PrefStore for MemoryPrefStore {
    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned().flatten()
    }

    fn put(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), Some(value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_prefs_path() -> PathBuf {
        // Unique per-test path so parallel tests never share a file.
        use std::thread;
        use std::time::{SystemTime, UNIX_EPOCH};

        let mut base = std::env::temp_dir();
        base.push("twenty_tests");
        base.push("prefs");

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let tid = format!("{:?}", thread::current().id());
        base.push(format!("t_{nanos}_{tid}"));

        let _ = fs::create_dir_all(&base);

        base.join("prefs.toml")
    }

    #[test]
    fn test_missing_file_yields_empty_store() {
        let path = temp_prefs_path();
        let _ = fs::remove_file(&path);

        let store = FilePrefStore::open_at(path).expect("Open should not fail on missing file");
        assert!(store.keys().is_empty());
        assert_eq!(store.get("breakDuration"), None);
    }

    #[test]
    fn test_save_load_round_trip() {
        let path = temp_prefs_path();

        let mut store = FilePrefStore::open_at(path.clone()).unwrap();
        store.put("breakDuration", "20s");
        store.put("playAlertSound", "false");
        store.save().expect("Failed to save preferences");

        let reloaded = FilePrefStore::open_at(path.clone()).expect("Failed to reload");
        assert_eq!(reloaded.get("breakDuration"), Some("20s".to_string()));
        assert_eq!(reloaded.get("playAlertSound"), Some("false".to_string()));
        assert_eq!(reloaded.keys().len(), 2);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_put_replaces_value() {
        let mut store = MemoryPrefStore::new();
        store.put("sessionDuration", "15min");
        store.put("sessionDuration", "20min");
        assert_eq!(store.get("sessionDuration"), Some("20min".to_string()));
        assert_eq!(store.keys(), vec!["sessionDuration".to_string()]);
    }

    #[test]
    fn test_listed_only_key() {
        let mut store = MemoryPrefStore::new();
        store.put_listed_only("lookAndFeel");
        assert_eq!(store.keys(), vec!["lookAndFeel".to_string()]);
        assert_eq!(store.get("lookAndFeel"), None);
    }

    #[test]
    #[cfg(unix)]
    fn test_save_sets_restrictive_permissions() {
        let path = temp_prefs_path();

        let mut store = FilePrefStore::open_at(path.clone()).unwrap();
        store.put("breakDuration", "20s");
        store.save().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, PREFS_FILE_PERMISSIONS, "Permissions should be 600");

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = temp_prefs_path();
        fs::write(&path, "not = [valid\n").unwrap();

        assert!(FilePrefStore::open_at(path.clone()).is_err());

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_malformed_file_downgrades_to_empty_store() {
        let path = temp_prefs_path();
        fs::write(&path, "not = [valid\n").unwrap();

        let store = FilePrefStore::open_at_or_empty(path.clone());
        assert!(
            store.keys().is_empty(),
            "Corrupt file should yield an empty store, not an open failure"
        );
        assert_eq!(store.path(), path, "Path kept so a later save rewrites the file");

        fs::remove_file(path).ok();
    }
}
