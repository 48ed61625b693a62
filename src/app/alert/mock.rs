use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::ArcStr;

use super::data::{AlertKind, AlertMessage};

/// Mock implementation of the alert actor for testing purposes.
///
/// No TTL runs; alerts stay current until dismissed or replaced. The full
/// dispatch history is kept so tests can assert order and content.
#[derive(Debug, Clone, Default)]
pub struct Mock {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    slot: Option<AlertMessage>,
    history: Vec<AlertMessage>,
    next_id: u64,
}

impl Mock {
    pub async fn dispatch(&self, kind: AlertKind, text: ArcStr) -> u64 {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let alert = AlertMessage {
            id: state.next_id,
            kind,
            text,
            at: Utc::now(),
        };
        state.slot = Some(alert.clone());
        state.history.push(alert);
        state.next_id
    }

    pub async fn current(&self) -> Option<AlertMessage> {
        self.state.lock().await.slot.clone()
    }

    pub async fn dismiss(&self) {
        self.state.lock().await.slot = None;
    }

    pub async fn history(&self) -> Vec<AlertMessage> {
        self.state.lock().await.history.clone()
    }
}
