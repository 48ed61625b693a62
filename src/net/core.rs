use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use tokio::task::JoinHandle;

use crate::{
    ArcStr,
    app::config::{Config, U64Opt},
    log::Log,
};

use super::message::{Message, Part};

const SCOPE: &str = "net";

/// Core of the networking actor.
///
/// Wraps a `reqwest` client with connection pooling and the configured
/// request timeout. Requests are processed sequentially from the mailbox but
/// the client performs each transfer on the runtime's I/O driver.
#[derive(Debug)]
pub struct Core {
    log: Log,
    client: Client,
}

impl Core {
    /// Creates a new networking core with the timeout from the configuration.
    pub async fn new(config: Config, log: Log) -> anyhow::Result<Self> {
        let timeout = config.u64(U64Opt::TimeoutSecs).await;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("Building HTTP client")?;

        Ok(Self { log, client })
    }

    /// Transforms the core into an actor ready to receive messages.
    pub fn spawn(self) -> (super::Net, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Get { url, headers, tx } => {
                        let response = self
                            .get(url.clone(), headers)
                            .await
                            .with_context(|| format!("GET request failed for URL: {url}"));
                        let _ = tx.send(response);
                    }
                    Message::PostJson {
                        url,
                        headers,
                        body,
                        tx,
                    } => {
                        let response = self
                            .post_json(url.clone(), headers, body)
                            .await
                            .with_context(|| format!("POST request failed for URL: {url}"));
                        let _ = tx.send(response);
                    }
                    Message::PutJson {
                        url,
                        headers,
                        body,
                        tx,
                    } => {
                        let response = self
                            .put_json(url.clone(), headers, body)
                            .await
                            .with_context(|| format!("PUT request failed for URL: {url}"));
                        let _ = tx.send(response);
                    }
                    Message::PostMultipart {
                        url,
                        headers,
                        parts,
                        tx,
                    } => {
                        let response = self
                            .post_multipart(url.clone(), headers, parts)
                            .await
                            .with_context(|| {
                                format!("Multipart POST request failed for URL: {url}")
                            });
                        let _ = tx.send(response);
                    }
                }
            }
        });

        (super::Net::Actual(tx), handle)
    }

    fn apply_headers(
        mut request: reqwest::RequestBuilder,
        headers: Option<HashMap<ArcStr, ArcStr>>,
    ) -> reqwest::RequestBuilder {
        if let Some(headers) = headers {
            for (key, value) in headers {
                request = request.header(&*key, &*value);
            }
        }
        request
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> anyhow::Result<ArcStr> {
        let response = request.send().await.context("Sending request")?;
        let status = response.status();
        let text = response.text().await.context("Reading response body")?;

        if !status.is_success() {
            self.log
                .warn(SCOPE, format!("Request returned status {status}"));
        }

        Ok(ArcStr::from(text.as_str()))
    }

    async fn get(
        &self,
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
    ) -> anyhow::Result<ArcStr> {
        let request = Self::apply_headers(self.client.get(&*url), headers);
        self.send(request).await
    }

    async fn post_json(
        &self,
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
        body: serde_json::Value,
    ) -> anyhow::Result<ArcStr> {
        let request = Self::apply_headers(self.client.post(&*url), headers).json(&body);
        self.send(request).await
    }

    async fn put_json(
        &self,
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
        body: serde_json::Value,
    ) -> anyhow::Result<ArcStr> {
        let request = Self::apply_headers(self.client.put(&*url), headers).json(&body);
        self.send(request).await
    }

    async fn post_multipart(
        &self,
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
        parts: Vec<Part>,
    ) -> anyhow::Result<ArcStr> {
        let mut form = reqwest::multipart::Form::new();
        for part in parts {
            form = match part {
                Part::Text { name, value } => form.text(name.to_string(), value),
                Part::File {
                    name,
                    filename,
                    bytes,
                } => form.part(
                    name.to_string(),
                    reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string()),
                ),
            };
        }

        let request = Self::apply_headers(self.client.post(&*url), headers).multipart(form);
        self.send(request).await
    }
}
