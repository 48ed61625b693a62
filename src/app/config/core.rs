use anyhow::Context;
use tokio::sync::mpsc;

use crate::{ArcPath, ArcStr, env::Env, fs::Fs, os_key};

use super::data::{Data, StrOpt};
use super::message::Message;

/// Core of the configuration actor.
///
/// Owns the in-memory [`Data`] and persists it as TOML through the [`Fs`]
/// actor. Environment variables override individual values at load time.
pub struct Core {
    env: Env,
    fs: Fs,
    path: ArcPath,
    data: Data,
}

impl Core {
    pub fn new(env: Env, fs: Fs, path: ArcPath) -> Self {
        Self {
            env,
            fs,
            path,
            data: Data::default(),
        }
    }

    /// Transforms the core into an actor ready to receive messages.
    pub fn spawn(mut self) -> (super::Config, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::Load { tx } => {
                        let _ = tx.send(self.load().await);
                    }
                    Message::Save { tx } => {
                        let _ = tx.send(self.save().await);
                    }
                    Message::GetPath { opt, tx } => {
                        let _ = tx.send(self.data.path(opt));
                    }
                    Message::GetStr { opt, tx } => {
                        let _ = tx.send(self.data.str(opt));
                    }
                    Message::GetU64 { opt, tx } => {
                        let _ = tx.send(self.data.u64(opt));
                    }
                    Message::GetLogLevel { tx } => {
                        let _ = tx.send(self.data.log_level());
                    }
                    Message::SetStr { opt, value } => {
                        self.data.set_str(opt, value);
                    }
                    Message::SetU64 { opt, value } => {
                        self.data.set_u64(opt, value);
                    }
                }
            }
        });

        (super::Config::Actual(tx), handle)
    }

    /// Loads the configuration file and applies environment overrides.
    async fn load(&mut self) -> anyhow::Result<()> {
        let raw = self
            .fs
            .read_to_string(self.path.clone())
            .await
            .with_context(|| format!("Reading config file {}", self.path.display()))?;
        self.data = toml::from_str(&raw)
            .with_context(|| format!("Parsing config file {}", self.path.display()))?;

        if let Ok(url) = self.env.var(os_key("QUILL_API_URL")).await {
            self.data.set_str(StrOpt::ApiUrl, ArcStr::from(&*url));
        }

        Ok(())
    }

    /// Serializes the current configuration and writes it to disk.
    async fn save(&self) -> anyhow::Result<()> {
        let raw = toml::to_string_pretty(&self.data).context("Serializing config")?;

        if let Some(parent) = self.path.parent() {
            self.fs
                .mkdir(ArcPath::from(parent))
                .await
                .context("Creating config directory")?;
        }

        self.fs
            .write(self.path.clone(), raw.into_bytes())
            .await
            .with_context(|| format!("Writing config file {}", self.path.display()))
    }
}
