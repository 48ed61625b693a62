use chrono::{DateTime, Utc};

use crate::ArcStr;

/// Visual flavor of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
    Info,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// One user-facing notification. The id ties an expiry timer to the exact
/// dispatch that started it.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertMessage {
    pub id: u64,
    pub kind: AlertKind,
    pub text: ArcStr,
    pub at: DateTime<Utc>,
}
