use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use super::data::{ApiError, ApiResponse, ApiResult};
use crate::ArcStr;

/// Mock implementation of the blog API actor for testing purposes.
///
/// Responses are scripted per operation key (for example `"get_blog:42"`)
/// and consumed in order. Every call is recorded so tests can assert which
/// operations ran — or that none did.
#[derive(Debug, Clone, Default)]
pub struct Mock {
    responses: Arc<Mutex<HashMap<String, VecDeque<ApiResult<ApiResponse>>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    /// Artificial delay applied to every response, to keep in-flight
    /// windows open in tests.
    latency: Arc<Mutex<Option<Duration>>>,
}

impl Mock {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scripts the next response for the given operation key.
    pub async fn script(&self, key: &str, response: ApiResult<ApiResponse>) {
        let mut responses = self.responses.lock().await;
        responses.entry(key.to_string()).or_default().push_back(response);
    }

    /// Returns every operation performed so far, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    /// Delays every subsequent response by `duration`.
    pub async fn set_latency(&self, duration: Duration) {
        *self.latency.lock().await = Some(duration);
    }

    /// Records the call and pops its next scripted response.
    pub async fn respond(&self, key: String) -> ApiResult<ApiResponse> {
        let latency = *self.latency.lock().await;
        if let Some(duration) = latency {
            tokio::time::sleep(duration).await;
        }
        self.calls.lock().await.push(key.clone());

        let mut responses = self.responses.lock().await;
        responses
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(ApiError::Transport(ArcStr::from(
                    format!("no mock response for {key}").as_str(),
                )))
            })
    }
}
