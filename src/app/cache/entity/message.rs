use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::ArcStr;

use super::data::{EntryKey, EntrySnapshot, EntryStatus, InvalidatePredicate};

/// A message to the [`super::EntityCache`] actor.
#[derive(Debug)]
pub enum Message {
    /// Read an entry, starting a fetch when it is missing, stale, or errored.
    Read {
        key: EntryKey,
        tx: oneshot::Sender<EntrySnapshot>,
    },
    /// Read an entry without triggering a fetch or creating it.
    Peek {
        key: EntryKey,
        tx: oneshot::Sender<EntrySnapshot>,
    },
    /// Replace an entry's value and status, notifying subscribers.
    Write {
        key: EntryKey,
        value: Value,
        status: EntryStatus,
        tx: oneshot::Sender<()>,
    },
    /// Reset an entry to the uninitialized, valueless state.
    Remove {
        key: EntryKey,
        tx: oneshot::Sender<()>,
    },
    /// Mark matching entries stale. Replies with how many changed.
    Invalidate {
        predicate: InvalidatePredicate,
        tx: oneshot::Sender<usize>,
    },
    /// Register a subscriber channel on an entry. Replies with its id.
    Subscribe {
        key: EntryKey,
        sender: mpsc::Sender<EntrySnapshot>,
        tx: oneshot::Sender<u64>,
    },
    /// Drop one subscriber from an entry.
    Unsubscribe { key: EntryKey, id: u64 },
    /// A background fetch finished. Ignored when `generation` is outdated.
    FetchResolved {
        key: EntryKey,
        generation: u64,
        result: Result<Option<Value>, ArcStr>,
    },
    /// Evict unwatched entries past the grace period.
    Sweep,
}
