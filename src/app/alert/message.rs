use tokio::sync::oneshot;

use crate::ArcStr;

use super::data::{AlertKind, AlertMessage};

/// A message to the [`super::Alerts`] actor.
#[derive(Debug)]
pub enum Message {
    /// Replace the slot with a new alert. Replies with its id.
    Dispatch {
        kind: AlertKind,
        text: ArcStr,
        tx: oneshot::Sender<u64>,
    },
    /// Read the slot.
    Current {
        tx: oneshot::Sender<Option<AlertMessage>>,
    },
    /// Clear the slot.
    Dismiss,
    /// TTL ran out for the alert with this id. Ignored when the slot moved
    /// on to a newer alert.
    Expire { id: u64 },
}
