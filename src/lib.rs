//! Task and resource tracker: syncs a user's to-do list with a schedule
//! server, keeps study resources in local storage, and computes the
//! tracker, streak, upcoming and calendar views from them.

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
