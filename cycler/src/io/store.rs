//! Session-scoped key/value store holding every durable value of a cycle.
//!
//! Values are stored as serialized text. Reads never fail: a missing key, an
//! unreadable backing file, a failed decode, or a value of the wrong shape all
//! read as "absent" and the caller supplies its own default.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Raw text store, the persistence seam of the engine.
pub trait SessionStore {
    /// Stored text for `key`, or `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;

    /// Write several keys as one update. Backends that can commit them
    /// together must; the default falls back to one `set` per key.
    fn set_many(&mut self, entries: Vec<(&str, String)>) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Decode the JSON value stored under `key`. Absent and malformed both yield `None`.
pub fn get_json<S: SessionStore + ?Sized, T: DeserializeOwned>(store: &S, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(key, error = %err, "discarding malformed stored value");
            None
        }
    }
}

pub fn set_json<S: SessionStore + ?Sized, T: Serialize>(
    store: &mut S,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = encode_json(key, value)?;
    store.set(key, raw)
}

/// Serialize `value` into the text stored under `key`.
pub fn encode_json<T: Serialize>(key: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).with_context(|| format!("serialize {key}"))
}

/// In-memory store for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw text, bypassing serialization (e.g. to plant corrupt values).
    pub fn with_raw(mut self, key: &str, raw: &str) -> Self {
        self.entries.insert(key.to_string(), raw.to_string());
        self
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// File-backed store: a single JSON object mapping keys to stored text.
///
/// The file is re-read on every access so writes made by another invocation
/// are visible at the next read.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return BTreeMap::new(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "session store unreadable; treating as empty");
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&contents).unwrap_or_else(|err| {
            warn!(path = %self.path.display(), error = %err, "session store corrupt; treating as empty");
            BTreeMap::new()
        })
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_entries().remove(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.set_many(vec![(key, value)])
    }

    /// One read and one atomic rewrite for the whole batch.
    fn set_many(&mut self, updates: Vec<(&str, String)>) -> Result<()> {
        let mut entries = self.read_entries();
        for (key, value) in updates {
            entries.insert(key.to_string(), value);
        }
        let mut buf = serde_json::to_string_pretty(&entries).context("serialize session store")?;
        buf.push('\n');
        write_atomic(&self.path, &buf)
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("session store path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp session store {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("replace session store {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trips_through_memory_store() {
        let mut store = MemoryStore::new();
        set_json(&mut store, "queue", &vec!["1", "2"]).expect("set");
        let loaded: Option<Vec<String>> = get_json(&store, "queue");
        assert_eq!(loaded, Some(vec!["1".to_string(), "2".to_string()]));
    }

    #[test]
    fn malformed_and_wrong_shape_read_as_absent() {
        let store = MemoryStore::new()
            .with_raw("broken", "{not json")
            .with_raw("shape", "{\"a\":1}");
        assert_eq!(get_json::<_, Vec<String>>(&store, "broken"), None);
        assert_eq!(get_json::<_, Vec<String>>(&store, "shape"), None);
        assert_eq!(get_json::<_, Vec<String>>(&store, "missing"), None);
    }

    #[test]
    fn file_store_persists_across_handles() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("session").join("store.json");

        let mut writer = FileStore::open(&path);
        set_json(&mut writer, "autoEnabled", &true).expect("set");

        let reader = FileStore::open(&path);
        assert_eq!(get_json::<_, bool>(&reader, "autoEnabled"), Some(true));
    }

    #[test]
    fn file_store_batch_keeps_other_keys() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("store.json");

        let mut store = FileStore::open(&path);
        store.set("autoEnabled", "true".to_string()).expect("set");
        store
            .set_many(vec![
                ("queue", "[\"2\"]".to_string()),
                ("pendingTarget", "\"1\"".to_string()),
            ])
            .expect("set many");

        let reader = FileStore::open(&path);
        assert_eq!(reader.get("autoEnabled").as_deref(), Some("true"));
        assert_eq!(reader.get("queue").as_deref(), Some("[\"2\"]"));
        assert_eq!(reader.get("pendingTarget").as_deref(), Some("\"1\""));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_reads_as_empty_and_is_replaced_on_write() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("store.json");
        fs::write(&path, "garbage").expect("write");

        let mut store = FileStore::open(&path);
        assert_eq!(store.get("queue"), None);

        store.set("queue", "[]".to_string()).expect("set");
        assert_eq!(store.get("queue").as_deref(), Some("[]"));
    }
}
