//! Persistent user settings.
//!
//! Settings are plain string key/value pairs behind the [`SettingsStore`]
//! trait. Every call goes straight to the store; nothing is cached.

use crate::error::{Result, TrayError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// A key/value store for user settings.
///
/// Implementations must tolerate concurrent calls for independent keys.
pub trait SettingsStore: Send + Sync {
    /// Returns the value for `name`, or `None` if it was never set.
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Stores `value` under `name`, replacing any previous value.
    fn set(&self, name: &str, value: &str) -> Result<()>;
}

/// Settings kept in a TOML file of string keys.
///
/// Reads go to disk every time. Writes re-read the file, update one key and
/// write it back under a lock, so concurrent writers in this process do not
/// lose each other's keys.
#[derive(Debug)]
pub struct TomlSettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TomlSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| {
            TrayError::Settings(format!("failed to parse {}: {e}", self.path.display()))
        })
    }
}

impl SettingsStore for TomlSettingsStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(name))
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| TrayError::Settings("settings lock poisoned".to_string()))?;

        let mut values = self.read_all()?;
        values.insert(name.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&values)
            .map_err(|e| TrayError::Settings(format!("failed to serialize settings: {e}")))?;
        fs::write(&self.path, content)?;

        debug!(name, path = %self.path.display(), "saved setting");
        Ok(())
    }
}

/// Settings kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| TrayError::Settings("settings lock poisoned".to_string()))?;
        Ok(values.get(name).cloned())
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| TrayError::Settings("settings lock poisoned".to_string()))?;
        values.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn toml_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let store = TomlSettingsStore::new(path.clone());

        assert_eq!(store.get("theme").unwrap(), None);
        store.set("theme", "dark").unwrap();
        store.set("dotted.key", "1").unwrap();

        // a second store on the same file sees the values: nothing is cached
        let other = TomlSettingsStore::new(path);
        assert_eq!(other.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(other.get("dotted.key").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn toml_store_sees_external_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let store = TomlSettingsStore::new(path.clone());
        store.set("a", "1").unwrap();

        fs::write(&path, "a = \"2\"\n").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn toml_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "not toml ===").unwrap();
        let store = TomlSettingsStore::new(path);
        assert!(matches!(store.get("a"), Err(TrayError::Settings(_))));
    }

    #[test]
    fn concurrent_writers_keep_every_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(TomlSettingsStore::new(dir.path().join("settings.toml")));

        let workers: Vec<_> = (0..4)
            .map(|n| {
                let store = store.clone();
                thread::spawn(move || store.set(&format!("key{n}"), &n.to_string()).unwrap())
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        for n in 0..4 {
            assert_eq!(
                store.get(&format!("key{n}")).unwrap(),
                Some(n.to_string())
            );
        }
    }

    #[test]
    fn memory_store_overwrites() {
        let store = MemorySettingsStore::new();
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.get("missing").unwrap(), None);
    }
}
