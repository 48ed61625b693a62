use std::collections::HashMap;
use std::fmt::Display;

use tokio::sync::oneshot;

use crate::ArcStr;

/// A single part of a multipart request body.
#[derive(Debug, Clone)]
pub enum Part {
    /// A plain text field
    Text { name: ArcStr, value: String },
    /// A binary file field
    File {
        name: ArcStr,
        filename: ArcStr,
        bytes: Vec<u8>,
    },
}

/// HTTP method plus body shape, used to key mock responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    PostJson,
    PutJson,
    PostMultipart,
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::PostJson => write!(f, "POST json"),
            Method::PutJson => write!(f, "PUT json"),
            Method::PostMultipart => write!(f, "POST multipart"),
        }
    }
}

/// Identifies one request shape for the mock transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MockRequestKey {
    pub method: Method,
    pub url: ArcStr,
}

impl MockRequestKey {
    pub fn get(url: ArcStr) -> Self {
        Self {
            method: Method::Get,
            url,
        }
    }

    pub fn post_json(url: ArcStr) -> Self {
        Self {
            method: Method::PostJson,
            url,
        }
    }

    pub fn put_json(url: ArcStr) -> Self {
        Self {
            method: Method::PutJson,
            url,
        }
    }

    pub fn post_multipart(url: ArcStr) -> Self {
        Self {
            method: Method::PostMultipart,
            url,
        }
    }
}

/// Messages that can be sent to the networking actor.
#[derive(Debug)]
pub enum Message {
    /// Perform an HTTP GET request
    Get {
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
        tx: oneshot::Sender<anyhow::Result<ArcStr>>,
    },
    /// Perform an HTTP POST request with a JSON body
    PostJson {
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
        body: serde_json::Value,
        tx: oneshot::Sender<anyhow::Result<ArcStr>>,
    },
    /// Perform an HTTP PUT request with a JSON body
    PutJson {
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
        body: serde_json::Value,
        tx: oneshot::Sender<anyhow::Result<ArcStr>>,
    },
    /// Perform an HTTP POST request with a multipart body
    PostMultipart {
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
        parts: Vec<Part>,
        tx: oneshot::Sender<anyhow::Result<ArcStr>>,
    },
}
