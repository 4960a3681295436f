pub mod client;
pub mod dto;
pub mod task_gateway;

pub use client::*;
pub use dto::*;
pub use task_gateway::*;
