use tokio::sync::oneshot;

use crate::api::blog::{ApiResponse, ApiResult};
use crate::app::cache::EntryKey;

use super::data::{CancelToken, Mutation, MutationStatus};

/// A message to the [`super::MutationExec`] actor.
pub enum Message {
    /// Run a mutation, or queue it when its target key is busy. Replies
    /// with the correlation id; `done` resolves with the final status.
    Execute {
        mutation: Mutation,
        cancel: CancelToken,
        done: oneshot::Sender<MutationStatus>,
        tx: oneshot::Sender<u64>,
    },
    /// The network half of a running mutation finished.
    Resolved {
        key: EntryKey,
        correlation: u64,
        result: ApiResult<ApiResponse>,
    },
}
