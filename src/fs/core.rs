use std::io;

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::ArcPath;

use super::message::Message;

/// Core of the filesystem actor, backed by `tokio::fs`.
///
/// Operations are processed sequentially, which keeps interleaved writes to
/// the same file (the log files in particular) well ordered.
#[derive(Debug, Default)]
pub struct Core {}

impl Core {
    pub fn new() -> Self {
        Default::default()
    }

    /// Transforms the core into an actor ready to receive messages.
    pub fn spawn(self) -> (super::Fs, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::Read { path, tx } => {
                        let _ = tx.send(tokio::fs::read(&*path).await);
                    }
                    Message::ReadToString { path, tx } => {
                        let _ = tx.send(tokio::fs::read_to_string(&*path).await);
                    }
                    Message::Write { path, contents, tx } => {
                        let _ = tx.send(tokio::fs::write(&*path, contents).await);
                    }
                    Message::Append { path, contents, tx } => {
                        let _ = tx.send(self.append(&path, &contents).await);
                    }
                    Message::Remove { path, tx } => {
                        let _ = tx.send(tokio::fs::remove_file(&*path).await);
                    }
                    Message::Mkdir { path, tx } => {
                        let _ = tx.send(tokio::fs::create_dir_all(&*path).await);
                    }
                    Message::ReadDir { path, tx } => {
                        let _ = tx.send(self.read_dir(&path).await);
                    }
                    Message::Size { path, tx } => {
                        let _ = tx.send(
                            tokio::fs::metadata(&*path).await.map(|meta| meta.len()),
                        );
                    }
                }
            }
        });

        (super::Fs::Actual(tx), handle)
    }

    async fn append(&self, path: &ArcPath, contents: &[u8]) -> io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&**path)
            .await?;
        file.write_all(contents).await?;
        file.flush().await
    }

    async fn read_dir(&self, path: &ArcPath) -> io::Result<Vec<ArcPath>> {
        let mut entries = tokio::fs::read_dir(&**path).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            paths.push(ArcPath::from(entry.path().as_path()));
        }
        Ok(paths)
    }
}
