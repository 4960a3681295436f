use async_trait::async_trait;
use crate::domain::{Task, TaskId, Username};
use thiserror::Error;

/// Anything that went wrong talking to the task server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Remote task service, scoped per user. The server owns task state; callers
/// re-fetch with `list` after every mutation instead of patching locally.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskGateway: Send + Sync {
    async fn list(&self, username: &Username) -> TransportResult<Vec<Task>>;
    async fn create(&self, task: &Task) -> TransportResult<()>;
    async fn set_completed(&self, id: TaskId, username: &Username) -> TransportResult<()>;
    async fn remove(&self, id: TaskId, username: &Username) -> TransportResult<()>;
}
