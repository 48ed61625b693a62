use std::io;

use anyhow::Context;
use tokio::sync::mpsc::Sender;

use crate::ArcPath;

mod core;
mod mock;
pub mod message;
#[cfg(test)]
mod tests;

use message::Message;

/// The filesystem actor that provides a thread-safe interface for file
/// operations.
///
/// Everything that touches disk — the configuration file, log files, image
/// attachments read for multipart upload — goes through this actor so tests
/// can swap it for an in-memory mock.
///
/// # Thread Safety
/// This type is designed to be safely shared between threads. Cloning is
/// cheap as it only copies the channel sender or mock reference.
#[derive(Debug, Clone)]
pub enum Fs {
    /// A real filesystem actor backed by `tokio::fs`
    Actual(Sender<Message>),
    /// A mock implementation for testing that stores files in memory
    Mock(mock::Mock),
}

impl Fs {
    /// Creates a new filesystem instance and spawns its actor.
    pub fn spawn() -> Self {
        let (fs, _) = core::Core::new().spawn();
        fs
    }

    /// Creates a new empty mock filesystem instance for testing.
    pub fn mock() -> Self {
        Self::Mock(mock::Mock::empty())
    }

    /// Reads the full contents of a file.
    pub async fn read(&self, path: ArcPath) -> io::Result<Vec<u8>> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Read { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
            }
            Self::Mock(mock) => mock.read(path).await,
        }
    }

    /// Reads the full contents of a file as UTF-8 text.
    pub async fn read_to_string(&self, path: ArcPath) -> io::Result<String> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::ReadToString { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
            }
            Self::Mock(mock) => mock.read_to_string(path).await,
        }
    }

    /// Writes a file, replacing any previous contents.
    pub async fn write(&self, path: ArcPath, contents: Vec<u8>) -> io::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Write { path, contents, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
            }
            Self::Mock(mock) => mock.write(path, contents).await,
        }
    }

    /// Appends to a file, creating it if it does not exist.
    pub async fn append(&self, path: ArcPath, contents: Vec<u8>) -> io::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Append { path, contents, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
            }
            Self::Mock(mock) => mock.append(path, contents).await,
        }
    }

    /// Removes a file.
    pub async fn remove_file(&self, path: ArcPath) -> io::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Remove { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
            }
            Self::Mock(mock) => mock.remove_file(path).await,
        }
    }

    /// Creates a directory and any missing parents.
    pub async fn mkdir(&self, path: ArcPath) -> io::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Mkdir { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
            }
            Self::Mock(mock) => mock.mkdir(path).await,
        }
    }

    /// Lists the entries of a directory.
    pub async fn read_dir(&self, path: ArcPath) -> io::Result<Vec<ArcPath>> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::ReadDir { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
            }
            Self::Mock(mock) => mock.read_dir(path).await,
        }
    }

    /// Returns the size of a file in bytes.
    pub async fn size(&self, path: ArcPath) -> io::Result<u64> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Size { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
            }
            Self::Mock(mock) => mock.size(path).await,
        }
    }
}
