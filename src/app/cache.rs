pub mod entity;

pub use entity::data::{EntryKey, EntrySnapshot, EntryStatus, InvalidatePredicate, ResourceKind};
pub use entity::{EntityCache, Subscription};
