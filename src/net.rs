use std::collections::HashMap;

use anyhow::Context;
use tokio::sync::mpsc::Sender;

use crate::{ArcStr, app::config::Config, log::Log};

mod core;
pub mod message;
pub mod mock;

use message::{Message, MockRequestKey};
pub use message::Part;

/// The networking actor that provides a thread-safe interface for HTTP
/// requests.
///
/// This is the transport layer consumed by [`crate::api::blog`]; it knows
/// nothing about the API's semantics, only how to move bytes. The mock
/// variant records every request, which lets tests assert that a flow never
/// touched the network.
///
/// # Thread Safety
/// This type is designed to be safely shared between threads. Cloning is
/// cheap as it only copies the channel sender or mock reference.
#[derive(Debug, Clone)]
pub enum Net {
    /// A real networking actor that performs HTTP requests
    Actual(Sender<Message>),
    /// A mock implementation for testing
    Mock(mock::Mock),
}

impl Net {
    /// Creates a new networking instance and spawns its actor.
    pub async fn spawn(config: Config, log: Log) -> anyhow::Result<Self> {
        let (net, _) = core::Core::new(config, log).await?.spawn();
        Ok(net)
    }

    /// Creates a new empty mock networking instance for testing.
    pub fn mock_empty() -> Self {
        Self::Mock(mock::Mock::empty())
    }

    /// Performs an HTTP GET request.
    pub async fn get(
        &self,
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
    ) -> anyhow::Result<ArcStr> {
        match self {
            Net::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Get { url, headers, tx })
                    .await
                    .context("Sending message to Net actor")
                    .expect("Net actor died");
                rx.await
                    .context("Awaiting response from Net actor")
                    .expect("Net actor died")
            }
            Net::Mock(mock) => mock.respond(MockRequestKey::get(url)).await,
        }
    }

    /// Performs an HTTP POST request with a JSON body.
    pub async fn post_json(
        &self,
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
        body: serde_json::Value,
    ) -> anyhow::Result<ArcStr> {
        match self {
            Net::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::PostJson {
                        url,
                        headers,
                        body,
                        tx,
                    })
                    .await
                    .context("Sending message to Net actor")
                    .expect("Net actor died");
                rx.await
                    .context("Awaiting response from Net actor")
                    .expect("Net actor died")
            }
            Net::Mock(mock) => mock.respond(MockRequestKey::post_json(url)).await,
        }
    }

    /// Performs an HTTP PUT request with a JSON body.
    pub async fn put_json(
        &self,
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
        body: serde_json::Value,
    ) -> anyhow::Result<ArcStr> {
        match self {
            Net::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::PutJson {
                        url,
                        headers,
                        body,
                        tx,
                    })
                    .await
                    .context("Sending message to Net actor")
                    .expect("Net actor died");
                rx.await
                    .context("Awaiting response from Net actor")
                    .expect("Net actor died")
            }
            Net::Mock(mock) => mock.respond(MockRequestKey::put_json(url)).await,
        }
    }

    /// Performs an HTTP POST request with a multipart body.
    pub async fn post_multipart(
        &self,
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
        parts: Vec<Part>,
    ) -> anyhow::Result<ArcStr> {
        match self {
            Net::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::PostMultipart {
                        url,
                        headers,
                        parts,
                        tx,
                    })
                    .await
                    .context("Sending message to Net actor")
                    .expect("Net actor died");
                rx.await
                    .context("Awaiting response from Net actor")
                    .expect("Net actor died")
            }
            Net::Mock(mock) => mock.respond(MockRequestKey::post_multipart(url)).await,
        }
    }
}
