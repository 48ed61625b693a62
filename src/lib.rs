//! Library entry point for the quill crate.
//!
//! quill is a client for a blog platform. The interesting machinery lives in
//! [`app::cache`] (a keyed stale-while-revalidate entity cache) and
//! [`app::mutation`] (optimistic mutations with commit/rollback), both built
//! as actors that are spawned once at startup and injected into consumers.

pub mod api;
pub mod app;
pub mod env;
pub mod fs;
pub mod log;
pub mod net;
pub mod session;
pub mod utils;

pub use utils::*;

/// Default mailbox size for actor channels.
pub const BUFFER_SIZE: usize = 64;
