use std::io;

use tokio::sync::oneshot;

use crate::ArcPath;

/// Messages that can be sent to the filesystem actor.
#[derive(Debug)]
pub enum Message {
    /// Read the full contents of a file
    Read {
        path: ArcPath,
        tx: oneshot::Sender<io::Result<Vec<u8>>>,
    },
    /// Read the full contents of a file as UTF-8 text
    ReadToString {
        path: ArcPath,
        tx: oneshot::Sender<io::Result<String>>,
    },
    /// Write a file, replacing any previous contents
    Write {
        path: ArcPath,
        contents: Vec<u8>,
        tx: oneshot::Sender<io::Result<()>>,
    },
    /// Append to a file, creating it if missing
    Append {
        path: ArcPath,
        contents: Vec<u8>,
        tx: oneshot::Sender<io::Result<()>>,
    },
    /// Remove a file
    Remove {
        path: ArcPath,
        tx: oneshot::Sender<io::Result<()>>,
    },
    /// Create a directory and any missing parents
    Mkdir {
        path: ArcPath,
        tx: oneshot::Sender<io::Result<()>>,
    },
    /// List the entries of a directory
    ReadDir {
        path: ArcPath,
        tx: oneshot::Sender<io::Result<Vec<ArcPath>>>,
    },
    /// Size of a file in bytes
    Size {
        path: ArcPath,
        tx: oneshot::Sender<io::Result<u64>>,
    },
}
