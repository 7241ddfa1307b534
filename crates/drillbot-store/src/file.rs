//! File-backed store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use drillbot_protocols::error::StoreError;
use drillbot_protocols::KvStore;

/// Key-value store persisted as one JSON object.
///
/// ```text
/// {path}        current document
/// {path}.tmp    staging file, renamed over {path} on every write
/// ```
///
/// The whole document is cached in memory; every mutation rewrites the file.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, Value>>,
    created: bool,
}

impl FileStore {
    /// Open the store, creating the parent directory if needed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let (entries, created) = match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => (HashMap::new(), false),
            Ok(content) => {
                let value: Value = serde_json::from_str(&content)?;
                match value {
                    Value::Object(map) => (map.into_iter().collect(), false),
                    other => {
                        return Err(StoreError::Corrupt(format!(
                            "expected a JSON object, found {}",
                            type_name(&other)
                        )))
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (HashMap::new(), true),
            Err(e) => return Err(e.into()),
        };

        debug!("FileStore opened at {:?} ({} keys)", path, entries.len());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
            created,
        })
    }

    /// Whether the backing file did not exist when the store was opened.
    pub fn was_created(&self) -> bool {
        self.created
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &HashMap<String, Value>) -> Result<(), StoreError> {
        let object: serde_json::Map<String, Value> =
            entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let content = serde_json::to_string_pretty(&Value::Object(object))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            warn!("Failed to move {:?} into place: {}", tmp, e);
            return Err(e.into());
        }
        Ok(())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, entries: Vec<(String, Value)>) -> Result<(), StoreError> {
        let mut store = self.entries.lock().await;
        store.extend(entries);
        self.persist(&store).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut store = self.entries.lock().await;
        if store.remove(key).is_some() {
            self.persist(&store).await?;
        }
        Ok(())
    }
}
