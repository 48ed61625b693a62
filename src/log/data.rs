use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a log entry.
///
/// The levels are ordered: `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum LogLevel {
    #[default]
    /// Regular operational messages
    Info,
    /// Something went wrong but was recovered from
    Warning,
    /// Critical errors that require attention
    Error,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(anyhow::anyhow!("Invalid log level: {}", s)),
        }
    }
}

/// A single log entry: level, originating scope, message, and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    level: LogLevel,
    scope: &'static str,
    message: String,
    at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(level: LogLevel, scope: &'static str, message: String) -> Self {
        Self {
            level,
            scope,
            message,
            at: Utc::now(),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            self.level,
            self.scope,
            self.message
        )
    }
}
