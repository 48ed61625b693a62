//! Application-level services and flows.
//!
//! The cache, mutation, and alert actors are the state-synchronization core;
//! [`forms`] and [`save`] are the user-facing flows built on top of them.

pub mod alert;
pub mod cache;
pub mod config;
pub mod forms;
pub mod mutation;
pub mod save;
