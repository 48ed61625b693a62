use std::{env::VarError, ffi::OsString, fmt::Display};

use anyhow::Context;
use tokio::sync::mpsc::Sender;

use crate::{ArcOsStr, ArcStr};

mod core;
mod mock;
pub mod message;
#[cfg(test)]
mod tests;

use message::Message;

/// The environment actor that provides a thread-safe interface for reading
/// and writing process environment variables.
///
/// This enum represents either a real environment actor or a mock
/// implementation for testing purposes. Mutating the process environment is
/// unsafe when done concurrently, so all access is funneled through a single
/// actor task.
///
/// # Thread Safety
/// This type is designed to be safely shared between threads. Cloning is
/// cheap as it only copies the channel sender or mock reference.
#[derive(Debug, Clone)]
pub enum Env {
    /// A real environment actor backed by the process environment
    Actual(Sender<Message>),
    /// A mock implementation for testing that stores variables in memory
    Mock(mock::Mock),
}

impl Env {
    /// Creates a new environment instance and spawns its actor.
    pub fn spawn() -> Self {
        let (env, _) = core::Core::new().spawn();
        env
    }

    /// Creates a new mock environment instance for testing.
    pub fn mock() -> Self {
        Self::Mock(mock::Mock::empty())
    }

    /// Reads an environment variable.
    ///
    /// # Returns
    /// The variable's value, or [`VarError::NotPresent`] if it is unset.
    pub async fn var(&self, key: ArcOsStr) -> Result<ArcStr, VarError> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Get { key, tx })
                    .await
                    .context("Sending message to Env actor")
                    .expect("Env actor died");
                rx.await
                    .context("Awaiting response from Env actor")
                    .expect("Env actor died")
            }
            Self::Mock(mock) => mock.var(key).await,
        }
    }

    /// Sets an environment variable.
    pub async fn set_var<V: Display>(&self, key: ArcOsStr, value: V) {
        let value = OsString::from(value.to_string());
        match self {
            Self::Actual(sender) => sender
                .send(Message::Set { key, value })
                .await
                .context("Sending message to Env actor")
                .expect("Env actor died"),
            Self::Mock(mock) => mock.set_var(key, value).await,
        }
    }

    /// Removes an environment variable.
    pub async fn unset_var(&self, key: ArcOsStr) {
        match self {
            Self::Actual(sender) => sender
                .send(Message::Unset { key })
                .await
                .context("Sending message to Env actor")
                .expect("Env actor died"),
            Self::Mock(mock) => mock.unset_var(key).await,
        }
    }
}
