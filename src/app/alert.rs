use anyhow::Context;
use tokio::sync::{mpsc::Sender, oneshot};

use crate::app::config::Config;
use crate::log::Log;
use crate::ArcStr;

mod core;
pub mod data;
pub mod message;
mod mock;
#[cfg(test)]
mod tests;

pub use data::{AlertKind, AlertMessage};
use message::Message;

/// The alert actor that owns the single user-facing notification slot.
///
/// Dispatching replaces whatever the slot held; the newest alert always
/// wins. Each alert expires on its own after the configured TTL unless a
/// newer one replaced it first.
///
/// # Thread Safety
/// This type is designed to be safely shared between threads. Cloning is
/// cheap as it only copies the channel sender or mock reference.
#[derive(Debug, Clone)]
pub enum Alerts {
    /// A real alert actor with TTL-driven expiry
    Actual(Sender<Message>),
    /// A mock implementation for testing that records every dispatch
    Mock(mock::Mock),
}

impl Alerts {
    /// Creates a new alert actor and spawns its core.
    pub async fn spawn(config: Config, log: Log) -> Self {
        let (alerts, _) = core::Core::new(config, log).await.spawn();
        alerts
    }

    /// Creates a new mock alert instance for testing.
    pub fn mock() -> Self {
        Self::Mock(mock::Mock::default())
    }

    /// Publishes an alert, replacing the current one. Returns its id.
    pub async fn dispatch(&self, kind: AlertKind, text: ArcStr) -> u64 {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = oneshot::channel();
                sender
                    .send(Message::Dispatch { kind, text, tx })
                    .await
                    .context("Sending message to Alerts actor")
                    .expect("Alerts actor died");
                rx.await
                    .context("Awaiting response from Alerts actor")
                    .expect("Alerts actor died")
            }
            Self::Mock(mock) => mock.dispatch(kind, text).await,
        }
    }

    /// Publishes a success alert.
    pub async fn success(&self, text: ArcStr) -> u64 {
        self.dispatch(AlertKind::Success, text).await
    }

    /// Publishes an error alert.
    pub async fn error(&self, text: ArcStr) -> u64 {
        self.dispatch(AlertKind::Error, text).await
    }

    /// Publishes an informational alert.
    pub async fn info(&self, text: ArcStr) -> u64 {
        self.dispatch(AlertKind::Info, text).await
    }

    /// The alert currently on display, if it has not expired.
    pub async fn current(&self) -> Option<AlertMessage> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = oneshot::channel();
                sender
                    .send(Message::Current { tx })
                    .await
                    .context("Sending message to Alerts actor")
                    .expect("Alerts actor died");
                rx.await
                    .context("Awaiting response from Alerts actor")
                    .expect("Alerts actor died")
            }
            Self::Mock(mock) => mock.current().await,
        }
    }

    /// Clears the slot regardless of what it holds.
    pub async fn dismiss(&self) {
        match self {
            Self::Actual(sender) => sender
                .send(Message::Dismiss)
                .await
                .context("Sending message to Alerts actor")
                .expect("Alerts actor died"),
            Self::Mock(mock) => mock.dismiss().await,
        }
    }

    /// Every alert dispatched so far. Empty on the real actor.
    pub async fn history(&self) -> Vec<AlertMessage> {
        match self {
            Self::Mock(mock) => mock.history().await,
            Self::Actual(_) => Vec::new(),
        }
    }
}
