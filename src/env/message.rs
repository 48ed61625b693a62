use std::{env::VarError, ffi::OsString};

use tokio::sync::oneshot;

use crate::{ArcOsStr, ArcStr};

/// Messages that can be sent to the environment actor.
#[derive(Debug)]
pub enum Message {
    /// Read an environment variable
    Get {
        key: ArcOsStr,
        tx: oneshot::Sender<Result<ArcStr, VarError>>,
    },
    /// Set an environment variable
    Set { key: ArcOsStr, value: OsString },
    /// Remove an environment variable
    Unset { key: ArcOsStr },
}
