use async_trait::async_trait;
use crate::domain::{Resource, Username};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Failed to read storage: {0}")]
    Read(String),

    #[error("Failed to write storage: {0}")]
    Write(String),

    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable local storage for resource records of every user.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Absent or unreadable storage yields an empty list.
    async fn load_all(&self) -> Vec<Resource>;

    /// Replaces the stored list with `all`.
    async fn persist(&self, all: &[Resource]) -> StorageResult<()>;

    /// Identity remembered by a previous session, if any.
    async fn stored_username(&self) -> Option<Username>;
}
