pub mod config_store;
pub mod notifier;
pub mod resource_store;
pub mod task_gateway;

pub use config_store::*;
pub use notifier::*;
pub use resource_store::*;
pub use task_gateway::*;
