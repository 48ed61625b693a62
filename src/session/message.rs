use tokio::sync::oneshot;

use crate::ArcStr;

/// Messages that can be sent to the session actor.
#[derive(Debug)]
pub enum Message {
    /// Get the current auth token, if any
    Token { tx: oneshot::Sender<Option<ArcStr>> },
    /// Get the current user's id, if known
    UserId { tx: oneshot::Sender<Option<ArcStr>> },
    /// Replace the auth token
    SetToken { token: Option<ArcStr> },
    /// Record the current user's identity
    SetIdentity { user_id: ArcStr },
}
