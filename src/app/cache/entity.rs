use anyhow::Context;
use serde_json::Value;
use tokio::sync::{
    mpsc::{self, Sender},
    oneshot,
};

use crate::api::blog::BlogApi;
use crate::app::config::Config;
use crate::log::Log;

mod core;
pub mod data;
pub mod message;
#[cfg(test)]
mod tests;

use data::{EntryKey, EntrySnapshot, EntryStatus, InvalidatePredicate};
use message::Message;

/// The entity cache actor, the process-wide store for server state.
///
/// Every entry is keyed by [`EntryKey`] and read stale-while-revalidate: a
/// read answers immediately with the held value and, when the entry is
/// missing, stale, or errored, revalidates in the background. Subscribers
/// receive a fresh [`EntrySnapshot`] on every value change. Entries nobody
/// watches are evicted after a configurable grace period.
///
/// # Thread Safety
/// This type is designed to be safely shared between threads. Cloning is
/// cheap as it only copies the channel sender.
#[derive(Debug, Clone)]
pub struct EntityCache(Sender<Message>);

impl EntityCache {
    /// Creates a new entity cache actor and spawns its core.
    pub async fn spawn(api: BlogApi, config: Config, log: Log) -> Self {
        let (tx, _) = core::Core::new(api, config, log).await.spawn();
        Self(tx)
    }

    /// Reads an entry, revalidating it in the background when needed.
    pub async fn read(&self, key: EntryKey) -> EntrySnapshot {
        let (tx, rx) = oneshot::channel();
        self.0
            .send(Message::Read { key, tx })
            .await
            .context("Sending message to EntityCache actor")
            .expect("EntityCache actor died");
        rx.await
            .context("Awaiting response from EntityCache actor")
            .expect("EntityCache actor died")
    }

    /// Reads an entry without triggering a fetch. A missing entry answers
    /// with an empty uninitialized snapshot.
    pub async fn peek(&self, key: EntryKey) -> EntrySnapshot {
        let (tx, rx) = oneshot::channel();
        self.0
            .send(Message::Peek { key, tx })
            .await
            .context("Sending message to EntityCache actor")
            .expect("EntityCache actor died");
        rx.await
            .context("Awaiting response from EntityCache actor")
            .expect("EntityCache actor died")
    }

    /// Replaces an entry's value and status, notifying subscribers. The
    /// acknowledgement resolves only after the write is applied.
    pub async fn write(&self, key: EntryKey, value: Value, status: EntryStatus) {
        let (tx, rx) = oneshot::channel();
        self.0
            .send(Message::Write {
                key,
                value,
                status,
                tx,
            })
            .await
            .context("Sending message to EntityCache actor")
            .expect("EntityCache actor died");
        rx.await
            .context("Awaiting response from EntityCache actor")
            .expect("EntityCache actor died")
    }

    /// Resets an entry back to the uninitialized, valueless state.
    pub async fn remove(&self, key: EntryKey) {
        let (tx, rx) = oneshot::channel();
        self.0
            .send(Message::Remove { key, tx })
            .await
            .context("Sending message to EntityCache actor")
            .expect("EntityCache actor died");
        rx.await
            .context("Awaiting response from EntityCache actor")
            .expect("EntityCache actor died")
    }

    /// Marks matching entries stale so their next read refetches. Returns
    /// how many entries actually changed.
    pub async fn invalidate(&self, predicate: InvalidatePredicate) -> usize {
        let (tx, rx) = oneshot::channel();
        self.0
            .send(Message::Invalidate { predicate, tx })
            .await
            .context("Sending message to EntityCache actor")
            .expect("EntityCache actor died");
        rx.await
            .context("Awaiting response from EntityCache actor")
            .expect("EntityCache actor died")
    }

    /// Subscribes to value changes on one entry. The returned guard
    /// unsubscribes when dropped; the receiver yields a snapshot per change.
    pub async fn subscribe(
        &self,
        key: EntryKey,
    ) -> (Subscription, mpsc::Receiver<EntrySnapshot>) {
        let (sender, receiver) = mpsc::channel(crate::BUFFER_SIZE);
        let (tx, rx) = oneshot::channel();
        self.0
            .send(Message::Subscribe {
                key: key.clone(),
                sender,
                tx,
            })
            .await
            .context("Sending message to EntityCache actor")
            .expect("EntityCache actor died");
        let id = rx
            .await
            .context("Awaiting response from EntityCache actor")
            .expect("EntityCache actor died");
        (
            Subscription {
                key,
                id,
                tx: self.0.clone(),
            },
            receiver,
        )
    }

    /// Runs an eviction pass immediately.
    pub async fn sweep(&self) {
        self.0
            .send(Message::Sweep)
            .await
            .context("Sending message to EntityCache actor")
            .expect("EntityCache actor died");
    }
}

/// Keeps one cache subscription alive. Dropping it unregisters the
/// subscriber, letting the entry expire once unwatched.
#[derive(Debug)]
pub struct Subscription {
    key: EntryKey,
    id: u64,
    tx: Sender<Message>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let message = Message::Unsubscribe {
            key: self.key.clone(),
            id: self.id,
        };
        if let Err(mpsc::error::TrySendError::Full(message)) = self.tx.try_send(message) {
            let tx = self.tx.clone();
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    let _ = tx.send(message).await;
                });
            }
        }
    }
}
