use anyhow::Context;
use tokio::sync::{mpsc::Sender, oneshot};

use crate::api::blog::BlogApi;
use crate::app::alert::Alerts;
use crate::app::cache::EntityCache;
use crate::log::Log;

mod core;
pub mod data;
pub mod message;
#[cfg(test)]
mod tests;

pub use data::{CancelToken, Mutation, MutationRequest, MutationStatus, OptimisticFn};
use message::Message;

/// The mutation executor actor.
///
/// A mutation first writes its optimistic value to the target cache entry,
/// then runs the server request. Success replaces the entry with the
/// server's answer (or marks it stale when the answer carries none) and
/// raises a success alert; failure restores the exact pre-image and raises
/// an error alert. Mutations on the same key run one at a time, in order.
///
/// # Thread Safety
/// This type is designed to be safely shared between threads. Cloning is
/// cheap as it only copies the channel sender.
#[derive(Debug, Clone)]
pub struct MutationExec(Sender<Message>);

impl MutationExec {
    /// Creates a new mutation executor and spawns its core.
    pub fn spawn(api: BlogApi, cache: EntityCache, alerts: Alerts, log: Log) -> Self {
        let (tx, _) = core::Core::new(api, cache, alerts, log).spawn();
        Self(tx)
    }

    /// Submits a mutation. The optimistic write has been applied (or the
    /// mutation queued) by the time this returns.
    pub async fn execute(&self, mutation: Mutation) -> MutationHandle {
        let cancel = CancelToken::default();
        let (done_tx, done_rx) = oneshot::channel();
        let (tx, rx) = oneshot::channel();
        let message = Message::Execute {
            mutation,
            cancel: cancel.clone(),
            done: done_tx,
            tx,
        };
        // The message holds a boxed closure, so the send error cannot carry
        // its payload into an error report.
        if self.0.send(message).await.is_err() {
            panic!("MutationExec actor died");
        }
        let correlation_id = rx
            .await
            .context("Awaiting response from MutationExec actor")
            .expect("MutationExec actor died");
        MutationHandle {
            correlation_id,
            cancel,
            done: done_rx,
        }
    }
}

/// Tracks one submitted mutation: its correlation id, a cancellation
/// token, and the completion signal.
#[derive(Debug)]
pub struct MutationHandle {
    pub correlation_id: u64,
    pub cancel: CancelToken,
    done: oneshot::Receiver<MutationStatus>,
}

impl MutationHandle {
    /// Waits for the mutation to resolve one way or the other.
    pub async fn wait(self) -> MutationStatus {
        self.done
            .await
            .context("Awaiting mutation outcome")
            .expect("MutationExec actor died")
    }
}
