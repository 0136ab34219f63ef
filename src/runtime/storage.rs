//! Durable key-value preferences (the theme flag, today; nothing else).
//!
//! Absence of a key means "unset". Failures are expected to be swallowed by
//! callers, degrading to in-memory behavior.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};

/// Storage key under which the theme preference lives.
pub const THEME_KEY: &str = "theme";

pub trait PreferenceStore: Send {
    fn load(&self, key: &str) -> io::Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> io::Result<()>;
}

/// JSON-object file store. Reads the whole map on every access; the shell
/// writes a single key at a human pace, so simplicity wins.
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_map(&self) -> io::Result<Map<String, Value>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str::<Value>(&raw)
                .ok()
                .and_then(|value| value.as_object().cloned())
                .map(Ok)
                .unwrap_or_else(|| Ok(Map::new())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Map::new()),
            Err(err) => Err(err),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        let map = self.read_map()?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn save(&self, key: &str, value: &str) -> io::Result<()> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        let serialized = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        fs::write(&self.path, serialized)
    }
}

/// In-memory store for tests and storage-less environments.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self
            .values
            .lock()
            .expect("preference store poisoned")
            .get(key)
            .cloned())
    }

    fn save(&self, key: &str, value: &str) -> io::Result<()> {
        self.values
            .lock()
            .expect("preference store poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store that fails every operation; exercises degradation paths in tests.
#[derive(Default)]
pub struct UnavailableStore;

impl PreferenceStore for UnavailableStore {
    fn load(&self, _key: &str) -> io::Result<Option<String>> {
        Err(io::Error::new(io::ErrorKind::Other, "storage unavailable"))
    }

    fn save(&self, _key: &str, _value: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "storage unavailable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.load(THEME_KEY).unwrap(), None);
        store.save(THEME_KEY, "dark").unwrap();
        assert_eq!(store.load(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let store = FilePreferenceStore::new(&path);

        assert_eq!(store.load(THEME_KEY).unwrap(), None);
        store.save(THEME_KEY, "light").unwrap();
        assert_eq!(store.load(THEME_KEY).unwrap().as_deref(), Some("light"));

        // Overwrite keeps other keys intact.
        store.save("other", "1").unwrap();
        store.save(THEME_KEY, "dark").unwrap();
        assert_eq!(store.load("other").unwrap().as_deref(), Some("1"));
        assert_eq!(store.load(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();
        let store = FilePreferenceStore::new(&path);
        assert_eq!(store.load(THEME_KEY).unwrap(), None);
    }
}
