use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;

use crate::{
    domain::{Resource, Username},
    ports::{ResourceStore, StorageError, StorageResult},
};

pub const RESOURCES_KEY: &str = "resources";
pub const USERNAME_KEY: &str = "username";

/// Browser-style key-value storage kept in a single JSON object file.
/// Every write rewrites the whole file and is capped at `quota_bytes`.
///
/// Stored records that no longer parse are skipped on load but carried
/// along verbatim on the next write, so they are never silently dropped.
pub struct LocalStorage {
    path: PathBuf,
    quota_bytes: usize,
    unreadable: Mutex<Vec<Value>>,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>, quota_bytes: usize) -> Self {
        Self {
            path: path.into(),
            quota_bytes,
            unreadable: Mutex::new(Vec::new()),
        }
    }

    /// `<data dir>/taskboard/storage.json`
    pub fn default_path() -> StorageResult<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| StorageError::Read("Cannot determine data directory".to_string()))?;
        Ok(data_dir.join("taskboard").join("storage.json"))
    }

    async fn read_entries(&self) -> StorageResult<Map<String, Value>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(StorageError::Read(e.to_string())),
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(_) => Err(StorageError::Serialization(
                "storage root is not an object".to_string(),
            )),
            Err(e) => Err(StorageError::Serialization(e.to_string())),
        }
    }

    pub async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        Ok(self.read_entries().await?.remove(key))
    }

    /// Writes one key, keeping the others. A corrupt file is replaced.
    pub async fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        let mut entries = match self.read_entries().await {
            Ok(entries) => entries,
            Err(StorageError::Serialization(e)) => {
                let backup = self.path.with_extension("json.corrupt");
                tracing::warn!(
                    "Storage file {:?} is unreadable ({}), moving it to {:?}",
                    self.path,
                    e,
                    backup
                );
                fs::rename(&self.path, &backup)
                    .await
                    .map_err(|e| StorageError::Write(e.to_string()))?;
                Map::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value);

        let payload = serde_json::to_vec_pretty(&Value::Object(entries))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        if payload.len() > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                needed: payload.len(),
                quota: self.quota_bytes,
            });
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Write(e.to_string()))?;
        }
        fs::write(&self.path, payload)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))
    }

    pub async fn remember_username(&self, username: &Username) -> StorageResult<()> {
        self.set(USERNAME_KEY, Value::String(username.to_string()))
            .await
    }
}

#[async_trait]
impl ResourceStore for LocalStorage {
    async fn load_all(&self) -> Vec<Resource> {
        let value = match self.get(RESOURCES_KEY).await {
            Ok(Some(value)) => value,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read resources: {}", e);
                return Vec::new();
            }
        };

        let Value::Array(entries) = value else {
            tracing::warn!("Stored resources are not a list, starting empty");
            return Vec::new();
        };

        let mut resources = Vec::with_capacity(entries.len());
        let mut unreadable = Vec::new();
        for entry in entries {
            match serde_json::from_value::<Resource>(entry.clone()) {
                Ok(resource) => resources.push(resource),
                Err(e) => {
                    tracing::warn!("Skipping unreadable stored resource: {}", e);
                    unreadable.push(entry);
                }
            }
        }

        if let Ok(mut kept) = self.unreadable.lock() {
            *kept = unreadable;
        }
        resources
    }

    async fn persist(&self, all: &[Resource]) -> StorageResult<()> {
        let mut entries = all
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        if let Ok(kept) = self.unreadable.lock() {
            entries.extend(kept.iter().cloned());
        }

        self.set(RESOURCES_KEY, Value::Array(entries)).await?;
        tracing::debug!("Persisted {} resources to {:?}", all.len(), self.path);
        Ok(())
    }

    async fn stored_username(&self) -> Option<Username> {
        match self.get(USERNAME_KEY).await {
            Ok(Some(Value::String(name))) if !name.trim().is_empty() => Some(Username(name)),
            _ => None,
        }
    }
}
