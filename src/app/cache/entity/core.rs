use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::blog::BlogApi;
use crate::app::config::{Config, U64Opt};
use crate::log::Log;
use crate::{ArcStr, BUFFER_SIZE};

use super::data::{Entry, EntryKey, EntrySnapshot, EntryStatus, InvalidatePredicate, ResourceKind};
use super::message::Message;

const SCOPE: &str = "cache";

/// The state-owning half of the entity cache actor.
///
/// Entries live in a single map keyed by [`EntryKey`]. All access goes through
/// the actor loop, so concurrent readers of one key coalesce onto one entry
/// and at most one in-flight fetch.
pub struct Core {
    api: BlogApi,
    log: Log,
    /// Seconds an unwatched entry survives after its last touch.
    grace: u64,
    entries: HashMap<EntryKey, Entry>,
    next_sub_id: u64,
}

impl Core {
    pub async fn new(api: BlogApi, config: Config, log: Log) -> Self {
        let grace = config.u64(U64Opt::CacheGraceSecs).await;
        Self {
            api,
            log,
            grace,
            entries: HashMap::new(),
            next_sub_id: 0,
        }
    }

    /// Spawns the actor loop plus a periodic sweep ticker.
    pub fn spawn(mut self) -> (mpsc::Sender<Message>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(BUFFER_SIZE);
        let period = Duration::from_secs(self.grace.max(1));
        let self_tx = tx.clone();
        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                self.handle(message, &self_tx);
            }
        });
        let sweep_tx = tx.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if sweep_tx.send(Message::Sweep).await.is_err() {
                    break;
                }
            }
        });
        (tx, handle)
    }

    fn handle(&mut self, message: Message, self_tx: &mpsc::Sender<Message>) {
        match message {
            Message::Read { key, tx } => {
                let snapshot = self.read(key, self_tx);
                let _ = tx.send(snapshot);
            }
            Message::Peek { key, tx } => {
                let snapshot = self
                    .entries
                    .get(&key)
                    .map(|entry| entry.snapshot(&key))
                    .unwrap_or_else(|| EntrySnapshot::empty(key));
                let _ = tx.send(snapshot);
            }
            Message::Write {
                key,
                value,
                status,
                tx,
            } => {
                self.write(key, value, status);
                let _ = tx.send(());
            }
            Message::Remove { key, tx } => {
                self.remove(key);
                let _ = tx.send(());
            }
            Message::Invalidate { predicate, tx } => {
                let _ = tx.send(self.invalidate(predicate));
            }
            Message::Subscribe { key, sender, tx } => {
                let _ = tx.send(self.subscribe(key, sender));
            }
            Message::Unsubscribe { key, id } => self.unsubscribe(key, id),
            Message::FetchResolved {
                key,
                generation,
                result,
            } => self.fetch_resolved(key, generation, result),
            Message::Sweep => self.sweep(),
        }
    }

    /// Stale-while-revalidate read. Replies immediately with whatever the
    /// entry holds; a missing, stale, or errored entry also kicks off a
    /// background fetch whose result arrives as [`Message::FetchResolved`].
    fn read(&mut self, key: EntryKey, self_tx: &mpsc::Sender<Message>) -> EntrySnapshot {
        let entry = self.entries.entry(key.clone()).or_insert_with(Entry::new);
        entry.touched = Utc::now();
        if matches!(
            entry.status,
            EntryStatus::Uninitialized | EntryStatus::Stale | EntryStatus::Errored
        ) {
            entry.status = EntryStatus::Pending;
            entry.generation += 1;
            let generation = entry.generation;
            let api = self.api.clone();
            let log = self.log.clone();
            let tx = self_tx.clone();
            let fetch_key = key.clone();
            tokio::spawn(async move {
                let result = fetch(&api, &fetch_key).await;
                let resolved = Message::FetchResolved {
                    key: fetch_key,
                    generation,
                    result,
                };
                if tx.send(resolved).await.is_err() {
                    log.warn(SCOPE, "Cache actor gone before fetch resolved");
                }
            });
        }
        entry.snapshot(&key)
    }

    fn write(&mut self, key: EntryKey, value: serde_json::Value, status: EntryStatus) {
        let entry = self.entries.entry(key.clone()).or_insert_with(Entry::new);
        entry.value = Some(value);
        entry.status = status;
        entry.generation += 1;
        entry.touched = Utc::now();
        entry.notify(&key);
    }

    fn remove(&mut self, key: EntryKey) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = None;
            entry.status = EntryStatus::Uninitialized;
            entry.generation += 1;
            entry.touched = Utc::now();
            entry.notify(&key);
        }
    }

    /// Marks matching entries stale. Entries already stale or never loaded are
    /// untouched, so repeating an invalidation changes nothing.
    fn invalidate(&mut self, predicate: InvalidatePredicate) -> usize {
        let mut changed = 0;
        for (key, entry) in self.entries.iter_mut() {
            if !predicate.matches(key) {
                continue;
            }
            if matches!(entry.status, EntryStatus::Uninitialized | EntryStatus::Stale) {
                continue;
            }
            entry.status = EntryStatus::Stale;
            entry.generation += 1;
            changed += 1;
        }
        changed
    }

    fn subscribe(&mut self, key: EntryKey, sender: mpsc::Sender<EntrySnapshot>) -> u64 {
        self.next_sub_id += 1;
        let id = self.next_sub_id;
        let entry = self.entries.entry(key).or_insert_with(Entry::new);
        entry.touched = Utc::now();
        entry.subscribers.insert(id, sender);
        id
    }

    fn unsubscribe(&mut self, key: EntryKey, id: u64) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.subscribers.remove(&id);
            entry.touched = Utc::now();
        }
    }

    fn fetch_resolved(
        &mut self,
        key: EntryKey,
        generation: u64,
        result: Result<Option<serde_json::Value>, ArcStr>,
    ) {
        let Some(entry) = self.entries.get_mut(&key) else {
            return;
        };
        if entry.generation != generation {
            self.log
                .info(SCOPE, format!("Discarding outdated fetch for {key}"));
            return;
        }
        match result {
            Ok(Some(value)) => {
                entry.value = Some(value);
                entry.status = EntryStatus::Fulfilled;
            }
            // Success with no payload confirms whatever we already hold.
            Ok(None) => entry.status = EntryStatus::Fulfilled,
            Err(reason) => {
                entry.status = EntryStatus::Errored;
                self.log
                    .error(SCOPE, format!("Fetch for {key} failed: {reason}"));
            }
        }
        entry.touched = Utc::now();
        entry.notify(&key);
    }

    /// Evicts entries nobody watches whose last touch is older than the grace
    /// period. Watched entries never expire.
    fn sweep(&mut self) {
        let now = Utc::now();
        let grace = self.grace as i64;
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            entry.subscribers.retain(|_, sender| !sender.is_closed());
            !entry.subscribers.is_empty() || (now - entry.touched).num_seconds() <= grace
        });
        let evicted = before - self.entries.len();
        if evicted > 0 {
            self.log
                .info(SCOPE, format!("Swept {evicted} idle cache entries"));
        }
    }
}

/// Maps an entry key onto the API call that loads it.
async fn fetch(api: &BlogApi, key: &EntryKey) -> Result<Option<serde_json::Value>, ArcStr> {
    let response = match (key.kind, &key.id) {
        (ResourceKind::Blogs, Some(id)) => api.get_blog(id.clone()).await,
        (ResourceKind::Blogs, None) => {
            let page = key
                .params
                .strip_prefix("page=")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(1);
            api.list_blogs(page).await
        }
        (ResourceKind::Categories, _) => api.list_categories().await,
        (ResourceKind::Users, _) => api.current_user().await,
    };
    match response {
        Ok(envelope) => Ok(envelope.data),
        Err(err) => Err(ArcStr::from(err.to_string().as_str())),
    }
}
