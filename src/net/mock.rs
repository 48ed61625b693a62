use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::ArcStr;

use super::message::MockRequestKey;

/// Mock implementation of the networking actor for testing purposes.
///
/// Responses are scripted per request key and consumed in order. Every
/// request is recorded so tests can assert exactly which traffic occurred —
/// including that none did.
#[derive(Debug, Clone, Default)]
pub struct Mock {
    responses: Arc<Mutex<HashMap<MockRequestKey, VecDeque<Result<ArcStr, ArcStr>>>>>,
    requests: Arc<Mutex<Vec<MockRequestKey>>>,
}

impl Mock {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scripts the next response for the given request key.
    pub async fn script(&self, key: MockRequestKey, response: Result<ArcStr, ArcStr>) {
        let mut responses = self.responses.lock().await;
        responses.entry(key).or_default().push_back(response);
    }

    /// Returns every request performed so far, in order.
    pub async fn requests(&self) -> Vec<MockRequestKey> {
        self.requests.lock().await.clone()
    }

    /// Records the request and pops its next scripted response.
    pub async fn respond(&self, key: MockRequestKey) -> anyhow::Result<ArcStr> {
        self.requests.lock().await.push(key.clone());

        let mut responses = self.responses.lock().await;
        match responses.get_mut(&key).and_then(VecDeque::pop_front) {
            Some(Ok(body)) => Ok(body),
            Some(Err(message)) => Err(anyhow::anyhow!("{message}")),
            None => Err(anyhow::anyhow!(
                "no mock response for {} {}",
                key.method,
                key.url
            )),
        }
    }
}
