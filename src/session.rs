use anyhow::Context;
use tokio::sync::mpsc::Sender;

use crate::{ArcStr, env::Env};

mod core;
mod mock;
pub mod message;

pub use mock::MockData;
use message::Message;

/// The session actor that supplies the current user's identity and auth
/// token to the rest of the application.
///
/// From the cache and mutation machinery's perspective this is read-only
/// context; only startup and the (out of scope) login flow write to it.
///
/// # Thread Safety
/// This type is designed to be safely shared between threads. Cloning is
/// cheap as it only copies the channel sender or mock reference.
#[derive(Debug, Clone)]
pub enum Session {
    /// A real session actor seeded from the environment
    Actual(Sender<Message>),
    /// A mock implementation for testing
    Mock(mock::Mock),
}

impl Session {
    /// Creates a new session instance and spawns its actor.
    pub async fn spawn(env: Env) -> Self {
        let (session, _) = core::Core::new(env).await.spawn();
        session
    }

    /// Creates a new mock session instance for testing.
    pub fn mock(data: MockData) -> Self {
        Self::Mock(mock::Mock::new(data))
    }

    /// Returns the current auth token, if any.
    pub async fn token(&self) -> Option<ArcStr> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Token { tx })
                    .await
                    .context("Sending message to Session actor")
                    .expect("Session actor died");
                rx.await
                    .context("Awaiting response from Session actor")
                    .expect("Session actor died")
            }
            Self::Mock(mock) => mock.token().await,
        }
    }

    /// Returns the current user's id, if it has been resolved.
    pub async fn user_id(&self) -> Option<ArcStr> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::UserId { tx })
                    .await
                    .context("Sending message to Session actor")
                    .expect("Session actor died");
                rx.await
                    .context("Awaiting response from Session actor")
                    .expect("Session actor died")
            }
            Self::Mock(mock) => mock.user_id().await,
        }
    }

    /// Replaces the auth token, dropping any resolved identity.
    pub async fn set_token(&self, token: Option<ArcStr>) {
        match self {
            Self::Actual(sender) => sender
                .send(Message::SetToken { token })
                .await
                .context("Sending message to Session actor")
                .expect("Session actor died"),
            Self::Mock(mock) => mock.set_token(token).await,
        }
    }

    /// Records the current user's identity.
    pub async fn set_identity(&self, user_id: ArcStr) {
        match self {
            Self::Actual(sender) => sender
                .send(Message::SetIdentity { user_id })
                .await
                .context("Sending message to Session actor")
                .expect("Session actor died"),
            Self::Mock(mock) => mock.set_identity(user_id).await,
        }
    }

    /// True when an auth token is present.
    pub async fn is_authenticated(&self) -> bool {
        self.token().await.is_some()
    }
}
