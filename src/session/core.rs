use tokio::sync::mpsc;

use crate::{ArcStr, env::Env, os_key};

use super::message::Message;

/// Core of the session actor.
///
/// Holds the auth token and, once resolved, the current user's identity.
/// The token is seeded from the `QUILL_TOKEN` environment variable at
/// startup; token issuance itself is out of scope.
#[derive(Debug)]
pub struct Core {
    token: Option<ArcStr>,
    user_id: Option<ArcStr>,
}

impl Core {
    pub async fn new(env: Env) -> Self {
        let token = env.var(os_key("QUILL_TOKEN")).await.ok();
        Self {
            token,
            user_id: None,
        }
    }

    /// Transforms the core into an actor ready to receive messages.
    pub fn spawn(mut self) -> (super::Session, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::Token { tx } => {
                        let _ = tx.send(self.token.clone());
                    }
                    Message::UserId { tx } => {
                        let _ = tx.send(self.user_id.clone());
                    }
                    Message::SetToken { token } => {
                        self.token = token;
                        // Identity belongs to the old token.
                        self.user_id = None;
                    }
                    Message::SetIdentity { user_id } => {
                        self.user_id = Some(user_id);
                    }
                }
            }
        });

        (super::Session::Actual(tx), handle)
    }
}
