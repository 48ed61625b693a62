use tokio::sync::oneshot;

use crate::{ArcPath, ArcStr, log::LogLevel};

use super::data::{PathOpt, StrOpt, U64Opt};

/// Messages that can be sent to the configuration actor.
#[derive(Debug)]
pub enum Message {
    /// Load the configuration from disk
    Load { tx: oneshot::Sender<anyhow::Result<()>> },
    /// Save the configuration to disk
    Save { tx: oneshot::Sender<anyhow::Result<()>> },
    /// Get a path-based value
    GetPath {
        opt: PathOpt,
        tx: oneshot::Sender<ArcPath>,
    },
    /// Get a string value
    GetStr {
        opt: StrOpt,
        tx: oneshot::Sender<ArcStr>,
    },
    /// Get a numeric value
    GetU64 { opt: U64Opt, tx: oneshot::Sender<u64> },
    /// Get the configured log level
    GetLogLevel { tx: oneshot::Sender<LogLevel> },
    /// Set a string value
    SetStr { opt: StrOpt, value: ArcStr },
    /// Set a numeric value
    SetU64 { opt: U64Opt, value: u64 },
}
