use std::fmt::Display;

use tokio::{sync::mpsc::Sender, task::JoinHandle};

use crate::{ArcPath, fs::Fs};

mod core;
pub mod data;
pub mod message;

pub use data::{LogEntry, LogLevel};
use message::Message;

/// The logging actor that provides a thread-safe interface for scoped
/// logging.
///
/// Messages are written to a timestamped log file and to `latest.log`
/// through the [`Fs`] actor. Messages at or above the configured print level
/// are buffered and written to stderr when the logger is flushed at
/// shutdown.
///
/// # Examples
/// ```ignore
/// let log = Log::spawn(fs, LogLevel::Info, 7, log_dir).await?;
/// log.info("app.cache.entity", "spawned");
/// ```
///
/// # Thread Safety
/// This type is designed to be safely shared between threads. Cloning is
/// cheap as it only copies the channel sender.
#[derive(Debug, Clone)]
pub enum Log {
    /// A real logging actor that writes to files and stderr
    Actual(Sender<Message>),
    /// A mock implementation for testing that discards everything
    Mock,
}

impl Log {
    /// Creates a new logging instance and spawns its actor.
    ///
    /// # Arguments
    /// * `fs` - The filesystem actor for file operations
    /// * `level` - Minimum level for messages echoed to stderr at flush
    /// * `max_age` - Maximum age of log files in days; 0 disables the GC
    /// * `log_dir` - Directory where log files are stored
    pub async fn spawn(
        fs: Fs,
        level: LogLevel,
        max_age: usize,
        log_dir: ArcPath,
    ) -> anyhow::Result<Self> {
        let core = core::Core::build(fs, level, max_age, log_dir).await?;
        let (log, _handle) = core.spawn();
        Ok(log)
    }

    /// Sends a log entry to the actor without blocking the caller.
    fn log(&self, level: LogLevel, scope: &'static str, message: String) {
        let sender = match self {
            Log::Mock => return,
            Log::Actual(sender) => sender.clone(),
        };

        tokio::spawn(async move {
            sender
                .send(Message::Log(LogEntry::new(level, scope, message)))
                .await
                .expect("Attempt to use logger after a flush");
        });
    }

    /// Logs a message with the `INFO` level.
    pub fn info<M: Display>(&self, scope: &'static str, message: M) {
        self.log(LogLevel::Info, scope, message.to_string());
    }

    /// Logs a message with the `WARN` level.
    pub fn warn<M: Display>(&self, scope: &'static str, message: M) {
        self.log(LogLevel::Warning, scope, message.to_string());
    }

    /// Logs a message with the `ERROR` level.
    pub fn error<M: Display>(&self, scope: &'static str, message: M) {
        self.log(LogLevel::Error, scope, message.to_string());
    }

    /// Flushes the logger by printing its buffered messages to stderr and
    /// closing the log files. The logger is destroyed afterwards; any
    /// further use of a clone of this handle will panic.
    pub fn flush(self) -> JoinHandle<()> {
        let Self::Actual(sender) = self else {
            return tokio::spawn(async {});
        };

        tokio::spawn(async move {
            sender
                .send(Message::Flush)
                .await
                .expect("Flushing a logger twice");
        })
    }

    /// Deletes log files older than the configured maximum age.
    pub async fn collect_garbage(&self) {
        let Self::Actual(sender) = self else {
            return;
        };

        sender
            .send(Message::CollectGarbage)
            .await
            .expect("Attempt to use logger after a flush");
    }
}
