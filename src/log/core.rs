use anyhow::Context;
use chrono::{NaiveDateTime, Utc};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{ArcPath, fs::Fs};

use super::data::{LogEntry, LogLevel};
use super::message::Message;

const SCOPE: &str = "log";
const FILE_PREFIX: &str = "quill_";
const FILE_STAMP: &str = "%Y-%m-%d-%H-%M-%S";

/// Core of the logging actor.
///
/// Writes every entry to a timestamped log file and to `latest.log`, keeps a
/// buffer of entries at or above the print level for the stderr flush, and
/// garbage-collects old log files by the timestamp embedded in their name.
#[derive(Debug)]
pub struct Core {
    fs: Fs,
    log_dir: ArcPath,
    log_path: ArcPath,
    latest_path: ArcPath,
    to_print: Vec<LogEntry>,
    print_level: LogLevel,
    max_age: usize,
}

impl Core {
    /// Creates a new logger core, truncating `latest.log` and creating the
    /// log directory if needed.
    pub async fn build(
        fs: Fs,
        level: LogLevel,
        max_age: usize,
        log_dir: ArcPath,
    ) -> anyhow::Result<Self> {
        fs.mkdir(log_dir.clone())
            .await
            .context("Creating the log directory")?;

        let log_path = ArcPath::from(
            log_dir
                .join(format!(
                    "{FILE_PREFIX}{}.log",
                    Utc::now().format(FILE_STAMP)
                ))
                .as_path(),
        );
        let latest_path = ArcPath::from(log_dir.join("latest.log").as_path());

        fs.write(log_path.clone(), Vec::new())
            .await
            .context("Creating the log file")?;
        fs.write(latest_path.clone(), Vec::new())
            .await
            .context("Creating the latest log file")?;

        Ok(Self {
            fs,
            log_dir,
            log_path,
            latest_path,
            to_print: Vec::new(),
            print_level: level,
            max_age,
        })
    }

    /// Transforms the core into an actor ready to receive messages.
    pub fn spawn(mut self) -> (super::Log, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::Log(entry) => self.log(entry).await,
                    Message::Flush => {
                        self.flush();
                        rx.close();
                        break;
                    }
                    Message::CollectGarbage => self.collect_garbage().await,
                }
            }
        });

        (super::Log::Actual(tx), handle)
    }

    /// Appends the entry to both log files and buffers it for stderr if its
    /// level clears the print level.
    pub async fn log(&mut self, entry: LogEntry) {
        let line = format!("{entry}\n").into_bytes();

        if let Err(e) = self.fs.append(self.log_path.clone(), line.clone()).await {
            eprintln!("Failed to write to {}: {e}", self.log_path.display());
        }
        if let Err(e) = self.fs.append(self.latest_path.clone(), line).await {
            eprintln!("Failed to write to {}: {e}", self.latest_path.display());
        }

        if entry.level() >= self.print_level {
            self.to_print.push(entry);
        }
    }

    /// Prints buffered entries to stderr and destroys the logger.
    fn flush(self) {
        for entry in &self.to_print {
            eprintln!("{entry}");
        }

        if !self.to_print.is_empty() {
            eprintln!("Check the full log file: {}", self.log_path.display());
        }
    }

    /// Deletes log files whose embedded timestamp is older than `max_age`
    /// days. A `max_age` of 0 disables collection.
    pub async fn collect_garbage(&mut self) {
        if self.max_age == 0 {
            return;
        }

        let logs = match self.fs.read_dir(self.log_dir.clone()).await {
            Ok(logs) => logs,
            Err(e) => {
                self.log(LogEntry::new(
                    LogLevel::Error,
                    SCOPE,
                    format!("Failed to read the logs directory: {e}"),
                ))
                .await;
                return;
            }
        };

        let now = Utc::now().naive_utc();
        for log in logs {
            let Some(stamp) = log
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(FILE_PREFIX))
                .and_then(|n| n.strip_suffix(".log"))
            else {
                continue;
            };

            let Ok(created) = NaiveDateTime::parse_from_str(stamp, FILE_STAMP) else {
                continue;
            };

            let age = (now - created).num_days();
            if age > self.max_age as i64 && self.fs.remove_file(log.clone()).await.is_err() {
                self.log(LogEntry::new(
                    LogLevel::Warning,
                    SCOPE,
                    format!("Failed to remove the log file: {}", log.display()),
                ))
                .await;
            }
        }
    }
}
