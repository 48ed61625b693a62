use std::collections::{HashMap, VecDeque};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::api::blog::{ApiResponse, ApiResult, BlogApi};
use crate::app::alert::Alerts;
use crate::app::cache::{EntityCache, EntryKey, EntrySnapshot, EntryStatus, InvalidatePredicate};
use crate::log::Log;
use crate::BUFFER_SIZE;

use super::data::{CancelToken, Mutation, MutationRequest, MutationStatus};
use super::message::Message;

const SCOPE: &str = "mutation";

/// A mutation waiting for its target key to free up.
struct Queued {
    mutation: Mutation,
    cancel: CancelToken,
    correlation: u64,
    done: oneshot::Sender<MutationStatus>,
}

/// A mutation whose request is in flight.
struct InFlight {
    correlation: u64,
    cancel: CancelToken,
    /// The target entry exactly as it was before the optimistic write.
    pre_image: EntrySnapshot,
    invalidate: Vec<InvalidatePredicate>,
    done: oneshot::Sender<MutationStatus>,
    /// Mutations on the same key, started in arrival order once this one
    /// resolves.
    queue: VecDeque<Queued>,
}

/// The state-owning half of the mutation executor.
///
/// At most one mutation runs per target key; later ones queue and capture
/// their pre-image only when they start, so a rollback always restores the
/// predecessor's committed value rather than an older one.
pub struct Core {
    api: BlogApi,
    cache: EntityCache,
    alerts: Alerts,
    log: Log,
    next_correlation: u64,
    running: HashMap<EntryKey, InFlight>,
}

impl Core {
    pub fn new(api: BlogApi, cache: EntityCache, alerts: Alerts, log: Log) -> Self {
        Self {
            api,
            cache,
            alerts,
            log,
            next_correlation: 0,
            running: HashMap::new(),
        }
    }

    pub fn spawn(mut self) -> (mpsc::Sender<Message>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(BUFFER_SIZE);
        let self_tx = tx.clone();
        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                self.handle(message, &self_tx).await;
            }
        });
        (tx, handle)
    }

    async fn handle(&mut self, message: Message, self_tx: &mpsc::Sender<Message>) {
        match message {
            Message::Execute {
                mutation,
                cancel,
                done,
                tx,
            } => {
                self.next_correlation += 1;
                let correlation = self.next_correlation;
                if let Some(in_flight) = self.running.get_mut(&mutation.target) {
                    self.log.info(
                        SCOPE,
                        format!("mutation {correlation} queued behind busy key {}", mutation.target),
                    );
                    in_flight.queue.push_back(Queued {
                        mutation,
                        cancel,
                        correlation,
                        done,
                    });
                } else {
                    self.start(mutation, cancel, correlation, done, self_tx).await;
                }
                // Replying only here guarantees the optimistic write (or the
                // queueing) is visible once `execute` returns.
                let _ = tx.send(correlation);
            }
            Message::Resolved {
                key,
                correlation,
                result,
            } => self.resolved(key, correlation, result, self_tx).await,
        }
    }

    /// Applies the optimistic write and fires the request in the background.
    async fn start(
        &mut self,
        mutation: Mutation,
        cancel: CancelToken,
        correlation: u64,
        done: oneshot::Sender<MutationStatus>,
        self_tx: &mpsc::Sender<Message>,
    ) {
        if cancel.is_cancelled() {
            self.log
                .info(SCOPE, format!("mutation {correlation} cancelled before start"));
            let _ = done.send(MutationStatus::Discarded);
            return;
        }

        let key = mutation.target.clone();
        let pre_image = self.cache.peek(key.clone()).await;
        let optimistic = (mutation.optimistic)(pre_image.value.clone());
        self.cache
            .write(key.clone(), optimistic, EntryStatus::Fulfilled)
            .await;
        self.log.info(
            SCOPE,
            format!("mutation {correlation} ({}) started on {key}", mutation.request),
        );

        self.running.insert(
            key.clone(),
            InFlight {
                correlation,
                cancel,
                pre_image,
                invalidate: mutation.invalidate,
                done,
                queue: VecDeque::new(),
            },
        );

        let api = self.api.clone();
        let request = mutation.request;
        let tx = self_tx.clone();
        tokio::spawn(async move {
            let result = run(&api, request).await;
            let _ = tx
                .send(Message::Resolved {
                    key,
                    correlation,
                    result,
                })
                .await;
        });
    }

    async fn resolved(
        &mut self,
        key: EntryKey,
        correlation: u64,
        result: ApiResult<ApiResponse>,
        self_tx: &mpsc::Sender<Message>,
    ) {
        let Some(in_flight) = self.running.remove(&key) else {
            return;
        };
        if in_flight.correlation != correlation {
            self.running.insert(key, in_flight);
            return;
        }

        let InFlight {
            cancel,
            pre_image,
            invalidate,
            done,
            mut queue,
            ..
        } = in_flight;

        let status = if cancel.is_cancelled() {
            self.log.info(
                SCOPE,
                format!("mutation {correlation} cancelled, discarding its outcome"),
            );
            MutationStatus::Discarded
        } else {
            match result {
                Ok(response) => {
                    self.commit(&key, response, &invalidate).await;
                    self.log
                        .info(SCOPE, format!("mutation {correlation} committed"));
                    MutationStatus::Committed
                }
                Err(err) => {
                    self.rollback(&key, pre_image).await;
                    self.alerts.error(err.user_message()).await;
                    self.log.warn(
                        SCOPE,
                        format!("mutation {correlation} rolled back: {err}"),
                    );
                    MutationStatus::RolledBack
                }
            }
        };
        let _ = done.send(status);

        // Start the next mutation queued on this key, skipping the ones
        // cancelled while they waited.
        while let Some(queued) = queue.pop_front() {
            if queued.cancel.is_cancelled() {
                let _ = queued.done.send(MutationStatus::Discarded);
                continue;
            }
            self.start(
                queued.mutation,
                queued.cancel,
                queued.correlation,
                queued.done,
                self_tx,
            )
            .await;
            // The freshly started mutation owns the rest of the queue.
            if let Some(in_flight) = self.running.get_mut(&key) {
                in_flight.queue = queue;
            }
            return;
        }
    }

    /// Server confirmed. A payload replaces the optimistic value outright;
    /// no payload keeps it but marks the entry stale so the next read
    /// reconciles with the server.
    async fn commit(&self, key: &EntryKey, response: ApiResponse, invalidate: &[InvalidatePredicate]) {
        match response.data {
            Some(value) => {
                self.cache
                    .write(key.clone(), value, EntryStatus::Fulfilled)
                    .await;
            }
            None => {
                self.cache
                    .invalidate(InvalidatePredicate::Key(key.clone()))
                    .await;
            }
        }
        for predicate in invalidate {
            self.cache.invalidate(predicate.clone()).await;
        }
        self.alerts.success(response.message).await;
    }

    /// Restores the target entry to its exact pre-image. An entry that held
    /// nothing goes back to holding nothing.
    async fn rollback(&self, key: &EntryKey, pre_image: EntrySnapshot) {
        match pre_image.value {
            Some(value) => {
                // Pending or errored pre-images come back as stale so the
                // next read refetches instead of wedging.
                let status = match pre_image.status {
                    EntryStatus::Fulfilled => EntryStatus::Fulfilled,
                    _ => EntryStatus::Stale,
                };
                self.cache.write(key.clone(), value, status).await;
            }
            None => self.cache.remove(key.clone()).await,
        }
    }
}

async fn run(api: &BlogApi, request: MutationRequest) -> ApiResult<ApiResponse> {
    match request {
        MutationRequest::CreateBlog(blog) => api.create_blog(blog).await,
        MutationRequest::UpdateBlog(update) => api.update_blog(update).await,
        MutationRequest::ToggleSave(id) => api.toggle_save(id).await,
    }
}
