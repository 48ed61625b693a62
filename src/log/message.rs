use super::data::LogEntry;

/// Messages that can be sent to the logging actor.
#[derive(Debug)]
pub enum Message {
    /// Write a log entry
    Log(LogEntry),
    /// Print buffered messages to stderr and destroy the logger
    Flush,
    /// Delete log files older than the configured maximum age
    CollectGarbage,
}
