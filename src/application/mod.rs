pub mod error;
pub mod in_flight;
pub mod notifications;
pub mod resource_service;
pub mod task_service;

pub use error::*;
pub use in_flight::*;
pub use notifications::*;
pub use resource_service::*;
pub use task_service::*;
