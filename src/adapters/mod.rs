pub mod api;
pub mod config;
pub mod notify;
pub mod render;
pub mod storage;
