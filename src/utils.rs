use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

/// Cheaply clonable, immutable string shared across actors.
pub type ArcStr = Arc<str>;

/// Cheaply clonable, immutable path shared across actors.
pub type ArcPath = Arc<Path>;

/// Cheaply clonable, immutable OS string slice, used for environment keys.
pub type ArcOsStr = Arc<OsStr>;

/// Builds an [`ArcOsStr`] from a plain string key.
pub fn os_key(key: &str) -> ArcOsStr {
    ArcOsStr::from(OsStr::new(key))
}
