use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ArcStr;

/// Error taxonomy of the blog API.
///
/// `Transport` covers network and decode failures; `Rejected` carries the
/// server's user-facing message for a `success: false` envelope. Both
/// messages are suitable for display.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a usable envelope
    #[error("{0}")]
    Transport(ArcStr),
    /// The server answered with `success: false`
    #[error("{0}")]
    Rejected(ArcStr),
}

impl ApiError {
    /// The message to surface to the user.
    pub fn user_message(&self) -> ArcStr {
        match self {
            ApiError::Transport(msg) | ApiError::Rejected(msg) => msg.clone(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The envelope every endpoint answers with. `data` stays opaque here; the
/// entity cache stores it as-is and only display code decodes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: ArcStr,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ApiResponse {
    /// Decodes a raw response body into an envelope, turning a
    /// `success: false` answer into [`ApiError::Rejected`].
    pub fn decode(raw: &str) -> ApiResult<Self> {
        let response: ApiResponse = serde_json::from_str(raw)
            .map_err(|e| ApiError::Transport(ArcStr::from(format!("Malformed response: {e}").as_str())))?;

        if !response.success {
            return Err(ApiError::Rejected(response.message));
        }

        Ok(response)
    }
}

/// A blog post as the API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    #[serde(rename = "_id")]
    pub id: ArcStr,
    pub title: ArcStr,
    pub description: ArcStr,
    #[serde(rename = "categoryId")]
    pub category_id: ArcStr,
    #[serde(rename = "userId")]
    pub user_id: ArcStr,
    #[serde(rename = "blogImage", default)]
    pub blog_image: Option<ArcStr>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A blog category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: ArcStr,
    pub title: ArcStr,
}

/// The current user, including the saved-blogs bookmark list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ArcStr,
    pub name: ArcStr,
    pub email: ArcStr,
    #[serde(rename = "savedBlogs", default)]
    pub saved_blogs: Vec<ArcStr>,
}

/// Payload for creating a blog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBlog {
    pub title: ArcStr,
    pub description: ArcStr,
    #[serde(rename = "categoryId")]
    pub category_id: ArcStr,
    #[serde(rename = "userId")]
    pub user_id: ArcStr,
}

/// An image file attached to a blog update.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub filename: ArcStr,
    pub bytes: Vec<u8>,
}

/// Payload for updating a blog. Serialized as the `blogData` field of a
/// multipart form, with the image travelling as a separate binary part.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogUpdate {
    pub id: ArcStr,
    pub title: ArcStr,
    pub description: ArcStr,
    pub image: Option<ImageFile>,
}

impl BlogUpdate {
    /// The JSON metadata part of the multipart submission.
    pub fn metadata(&self) -> Value {
        serde_json::json!({
            "id": &*self.id,
            "title": &*self.title,
            "description": &*self.description,
        })
    }
}
