use std::path::{Path, PathBuf};

use async_trait::async_trait;
use glean_common::{GleanError, Result};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

/// String-keyed JSON storage that survives across sessions.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> Result<()>;
    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile store, used by tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.map.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.map.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.map.lock().await.remove(key);
        Ok(())
    }
}

/// One JSON object in one file. Every write rewrites the whole file through
/// a temp file and a rename, so readers never see a half-written map.
pub struct FileStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<Map<String, Value>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Map::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                GleanError::Storage(format!("{} is not a JSON object: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(storage_io(&self.path, e)),
        }
    }

    async fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_io(parent, e))?;
        }
        let bytes = serde_json::to_vec_pretty(map)
            .map_err(|e| GleanError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| storage_io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage_io(&self.path, e))?;
        tracing::trace!(path = %self.path.display(), keys = map.len(), "store.file.written");
        Ok(())
    }
}

fn storage_io(path: &Path, e: std::io::Error) -> GleanError {
    GleanError::Storage(format!("{}: {e}", path.display()))
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value);
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("storage.json"));
        assert_eq!(store.get("apiKeys").await.unwrap(), None);
    }

    #[tokio::test]
    async fn values_survive_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        FileStore::new(&path)
            .set("selectedApiKey", json!("sk-1"))
            .await
            .unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("selectedApiKey").await.unwrap(),
            Some(json!("sk-1"))
        );
    }

    #[tokio::test]
    async fn remove_only_touches_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("storage.json"));
        store.set("a", json!(1)).await.unwrap();
        store.set("b", json!(2)).await.unwrap();
        store.remove("a").await.unwrap();
        store.remove("never-there").await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("b").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let err = FileStore::new(&path).get("a").await.unwrap_err();
        assert!(matches!(err, GleanError::Storage(_)));
    }
}
