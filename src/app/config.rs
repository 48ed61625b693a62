use anyhow::Context;

use crate::{ArcPath, ArcStr, env::Env, fs::Fs, log::LogLevel};

mod core;
pub mod data;
mod mock;
pub mod message;

pub use data::{Data, PathOpt, StrOpt, U64Opt};
use message::Message;

/// The configuration actor that provides a thread-safe interface for
/// configuration values.
///
/// Configuration is persisted as TOML. Individual values are read through
/// typed option enums so call sites cannot ask for a key that does not
/// exist.
///
/// # Examples
/// ```ignore
/// let config = Config::spawn(env, fs, config_path);
/// config.load().await?;
/// let api_url = config.str(StrOpt::ApiUrl).await;
/// ```
#[derive(Debug, Clone)]
pub enum Config {
    /// A real configuration actor that reads from and writes to a file
    Actual(tokio::sync::mpsc::Sender<Message>),
    /// A mock implementation for testing that stores data in memory
    Mock(mock::Mock),
}

impl Config {
    /// Creates a new configuration instance and spawns its actor.
    pub fn spawn(env: Env, fs: Fs, path: ArcPath) -> Self {
        let (config, _) = core::Core::new(env, fs, path).spawn();
        config
    }

    /// Creates a new mock configuration instance for testing.
    pub fn mock(data: Data) -> Self {
        Self::Mock(mock::Mock::new(data))
    }

    /// Loads the configuration from the file.
    pub async fn load(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Load { tx })
                    .await
                    .context("Sending message to Config actor")
                    .expect("Config actor died");
                rx.await
                    .context("Awaiting response from Config actor")
                    .expect("Config actor died")
            }
            Self::Mock(_) => Ok(()),
        }
    }

    /// Saves the current configuration to the file.
    pub async fn save(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Save { tx })
                    .await
                    .context("Sending message to Config actor")
                    .expect("Config actor died");
                rx.await
                    .context("Awaiting response from Config actor")
                    .expect("Config actor died")
            }
            Self::Mock(_) => Ok(()),
        }
    }

    /// Gets a path-based configuration value.
    pub async fn path(&self, opt: PathOpt) -> ArcPath {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetPath { opt, tx })
                    .await
                    .context("Sending message to Config actor")
                    .expect("Config actor died");
                rx.await
                    .context("Awaiting response from Config actor")
                    .expect("Config actor died")
            }
            Self::Mock(mock) => mock.path(opt).await,
        }
    }

    /// Gets a string configuration value.
    pub async fn str(&self, opt: StrOpt) -> ArcStr {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetStr { opt, tx })
                    .await
                    .context("Sending message to Config actor")
                    .expect("Config actor died");
                rx.await
                    .context("Awaiting response from Config actor")
                    .expect("Config actor died")
            }
            Self::Mock(mock) => mock.str(opt).await,
        }
    }

    /// Gets a numeric configuration value.
    pub async fn u64(&self, opt: U64Opt) -> u64 {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetU64 { opt, tx })
                    .await
                    .context("Sending message to Config actor")
                    .expect("Config actor died");
                rx.await
                    .context("Awaiting response from Config actor")
                    .expect("Config actor died")
            }
            Self::Mock(mock) => mock.u64(opt).await,
        }
    }

    /// Gets the configured log level.
    pub async fn log_level(&self) -> LogLevel {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetLogLevel { tx })
                    .await
                    .context("Sending message to Config actor")
                    .expect("Config actor died");
                rx.await
                    .context("Awaiting response from Config actor")
                    .expect("Config actor died")
            }
            Self::Mock(mock) => mock.log_level().await,
        }
    }

    /// Sets a string configuration value.
    pub async fn set_str(&self, opt: StrOpt, value: ArcStr) {
        match self {
            Self::Actual(sender) => sender
                .send(Message::SetStr { opt, value })
                .await
                .context("Sending message to Config actor")
                .expect("Config actor died"),
            Self::Mock(mock) => mock.set_str(opt, value).await,
        }
    }

    /// Sets a numeric configuration value.
    pub async fn set_u64(&self, opt: U64Opt, value: u64) {
        match self {
            Self::Actual(sender) => sender
                .send(Message::SetU64 { opt, value })
                .await
                .context("Sending message to Config actor")
                .expect("Config actor died"),
            Self::Mock(mock) => mock.set_u64(opt, value).await,
        }
    }
}
