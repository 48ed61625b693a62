//! Typed clients for the remote services quill talks to.

pub mod blog;
