use std::{env::VarError, ffi::OsString};

use tokio::sync::{mpsc, oneshot};

use crate::{ArcOsStr, ArcStr};

use super::message::Message;

/// Core of the environment actor.
///
/// Wraps the standard library's environment access. The setters are unsafe
/// on their own because they mutate process-global state; routing every call
/// through one actor task serializes that mutation.
#[derive(Debug, Default)]
pub struct Core {}

impl Core {
    pub fn new() -> Self {
        Default::default()
    }

    /// Transforms the core into an actor ready to receive messages.
    ///
    /// # Returns
    /// The [`Env`](super::Env) handle and the join handle of the actor task.
    pub fn spawn(self) -> (super::Env, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::Get { key, tx } => self.get(tx, key),
                    Message::Set { key, value } => self.set(key, value),
                    Message::Unset { key } => self.unset(key),
                }
            }
        });

        (super::Env::Actual(tx), handle)
    }

    fn get(&self, tx: oneshot::Sender<Result<ArcStr, VarError>>, key: ArcOsStr) {
        let _ = tx.send(std::env::var(&*key).map(|s| ArcStr::from(s.as_str())));
    }

    fn set(&self, key: ArcOsStr, value: OsString) {
        unsafe {
            std::env::set_var(&*key, value);
        }
    }

    fn unset(&self, key: ArcOsStr) {
        unsafe {
            std::env::remove_var(&*key);
        }
    }
}
