use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::ChatStoreError;

/// String key-value storage holding serialized chat history.
pub trait KeyValueStore: Debug + Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ChatStoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), ChatStoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ChatStoreError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| ChatStoreError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChatStoreError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| ChatStoreError::Unavailable("store mutex poisoned".to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory. Writes go through a temp file and a rename.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file_name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ChatStoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChatStoreError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        tracing::debug!(path = %path.display(), bytes = value.len(), "chat store written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!("fleet-store-{label}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn in_memory_store_round_trips_values() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("missing").expect("get"), None);
        store.set("key", "[]").expect("set");
        assert_eq!(store.get("key").expect("get").as_deref(), Some("[]"));
    }

    #[test]
    fn file_store_treats_missing_files_as_absent() {
        let root = scratch_dir("missing");
        let store = FileStore::new(&root);
        assert_eq!(store.get("fleet_chatbot_conversations").expect("get"), None);

        store
            .set("fleet_chatbot_conversations", "[]")
            .expect("set creates the directory");
        assert_eq!(
            store
                .get("fleet_chatbot_conversations")
                .expect("get")
                .as_deref(),
            Some("[]")
        );
        assert!(root.join("fleet_chatbot_conversations.json").exists());
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn file_names_are_sanitized() {
        let store = FileStore::new("/tmp/fleet");
        assert_eq!(
            store.path_for("../escape key"),
            PathBuf::from("/tmp/fleet/___escape_key.json")
        );
    }
}
