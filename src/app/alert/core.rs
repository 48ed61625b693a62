use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::app::config::{Config, U64Opt};
use crate::log::Log;
use crate::{ArcStr, BUFFER_SIZE};

use super::Alerts;
use super::data::{AlertKind, AlertMessage};
use super::message::Message;

const SCOPE: &str = "alert";

/// The state-owning half of the alert actor. Holds at most one alert; a
/// dispatch during an active alert silently replaces it.
pub struct Core {
    log: Log,
    /// Seconds before an alert expires on its own. Zero disables expiry.
    ttl: u64,
    slot: Option<AlertMessage>,
    next_id: u64,
}

impl Core {
    pub async fn new(config: Config, log: Log) -> Self {
        let ttl = config.u64(U64Opt::AlertTtlSecs).await;
        Self {
            log,
            ttl,
            slot: None,
            next_id: 0,
        }
    }

    pub fn spawn(mut self) -> (Alerts, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(BUFFER_SIZE);
        let self_tx = tx.clone();
        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Dispatch { kind, text, tx } => {
                        let _ = tx.send(self.dispatch(kind, text, &self_tx));
                    }
                    Message::Current { tx } => {
                        let _ = tx.send(self.slot.clone());
                    }
                    Message::Dismiss => self.slot = None,
                    Message::Expire { id } => self.expire(id),
                }
            }
        });
        (Alerts::Actual(tx), handle)
    }

    fn dispatch(&mut self, kind: AlertKind, text: ArcStr, self_tx: &mpsc::Sender<Message>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.log.info(SCOPE, format!("[{kind}] {text}"));
        self.slot = Some(AlertMessage {
            id,
            kind,
            text,
            at: Utc::now(),
        });
        if self.ttl > 0 {
            let ttl = Duration::from_secs(self.ttl);
            let tx = self_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(ttl).await;
                let _ = tx.send(Message::Expire { id }).await;
            });
        }
        id
    }

    /// Clears the slot only when it still holds the alert the timer was
    /// armed for.
    fn expire(&mut self, id: u64) {
        if self.slot.as_ref().is_some_and(|alert| alert.id == id) {
            self.slot = None;
        }
    }
}
