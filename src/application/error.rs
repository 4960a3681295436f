use crate::domain::{ResourceId, TaskId, ValidationError};
use crate::ports::{ConfigError, StorageError, TransportError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("A change to task {0} is already in progress")]
    MutationInFlight(TaskId),

    #[error("Resource {0} not found")]
    ResourceNotFound(ResourceId),
}

pub type AppResult<T> = Result<T, AppError>;
