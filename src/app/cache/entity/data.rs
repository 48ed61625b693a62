use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::ArcStr;

/// Which server-side collection an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Blogs,
    Categories,
    Users,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blogs => write!(f, "blogs"),
            Self::Categories => write!(f, "categories"),
            Self::Users => write!(f, "users"),
        }
    }
}

/// Identity of a cache entry. Two reads with the same key share one entry,
/// its in-flight fetch, and its subscriber list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub kind: ResourceKind,
    pub id: Option<ArcStr>,
    pub params: ArcStr,
}

impl EntryKey {
    pub fn blog(id: impl AsRef<str>) -> Self {
        Self {
            kind: ResourceKind::Blogs,
            id: Some(ArcStr::from(id.as_ref())),
            params: ArcStr::from(""),
        }
    }

    pub fn blog_list(page: usize) -> Self {
        Self {
            kind: ResourceKind::Blogs,
            id: None,
            params: ArcStr::from(format!("page={page}").as_str()),
        }
    }

    pub fn categories() -> Self {
        Self {
            kind: ResourceKind::Categories,
            id: None,
            params: ArcStr::from(""),
        }
    }

    pub fn current_user() -> Self {
        Self {
            kind: ResourceKind::Users,
            id: None,
            params: ArcStr::from("me"),
        }
    }
}

impl std::fmt::Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(id) = &self.id {
            write!(f, "/{id}")?;
        }
        if !self.params.is_empty() {
            write!(f, "?{}", self.params)?;
        }
        Ok(())
    }
}

/// Lifecycle of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Never fetched, holds no value.
    Uninitialized,
    /// A fetch is in flight.
    Pending,
    /// Holds the latest server-confirmed (or optimistically written) value.
    Fulfilled,
    /// Holds a value, but a newer one should be fetched on next read.
    Stale,
    /// The last fetch failed. The previous value, if any, is kept.
    Errored,
}

/// Point-in-time view of one entry, handed to readers and subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySnapshot {
    pub key: EntryKey,
    pub value: Option<Value>,
    pub status: EntryStatus,
}

impl EntrySnapshot {
    pub fn empty(key: EntryKey) -> Self {
        Self {
            key,
            value: None,
            status: EntryStatus::Uninitialized,
        }
    }

    /// Whether a reader has anything to render, stale or not.
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

/// Selects which entries an invalidation touches.
#[derive(Debug, Clone)]
pub enum InvalidatePredicate {
    /// Exactly one entry.
    Key(EntryKey),
    /// Every entry of one resource kind, lists and singles alike.
    Kind(ResourceKind),
    /// Everything.
    All,
}

impl InvalidatePredicate {
    pub fn matches(&self, key: &EntryKey) -> bool {
        match self {
            Self::Key(k) => k == key,
            Self::Kind(kind) => key.kind == *kind,
            Self::All => true,
        }
    }
}

/// One cached entry. Owned exclusively by the cache actor.
#[derive(Debug)]
pub struct Entry {
    pub value: Option<Value>,
    pub status: EntryStatus,
    /// Bumped on every write, removal, or invalidation. A fetch resolution
    /// carrying an older generation is discarded.
    pub generation: u64,
    /// Last read, write, or subscription change. Drives grace-period eviction.
    pub touched: DateTime<Utc>,
    pub subscribers: HashMap<u64, mpsc::Sender<EntrySnapshot>>,
}

impl Entry {
    pub fn new() -> Self {
        Self {
            value: None,
            status: EntryStatus::Uninitialized,
            generation: 0,
            touched: Utc::now(),
            subscribers: HashMap::new(),
        }
    }

    pub fn snapshot(&self, key: &EntryKey) -> EntrySnapshot {
        EntrySnapshot {
            key: key.clone(),
            value: self.value.clone(),
            status: self.status,
        }
    }

    /// Pushes the current snapshot to every live subscriber. Lagging
    /// subscribers miss intermediate snapshots, never the subscription.
    pub fn notify(&self, key: &EntryKey) {
        let snapshot = self.snapshot(key);
        for sender in self.subscribers.values() {
            let _ = sender.try_send(snapshot.clone());
        }
    }
}
