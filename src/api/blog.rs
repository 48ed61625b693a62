use anyhow::Context;
use tokio::sync::{mpsc::Sender, oneshot};

use crate::{ArcStr, log::Log, net::Net, session::Session};

mod core;
pub mod data;
pub mod message;
pub mod mock;
#[cfg(test)]
mod tests;

pub use data::{ApiError, ApiResponse, ApiResult, Blog, BlogUpdate, Category, ImageFile, NewBlog, User};
use message::Message;

/// The blog API actor that provides a typed interface to the platform's
/// HTTP endpoints.
///
/// It intermediates calls to the networking actor, attaching auth headers
/// from the session and decoding every answer through the common
/// `{success, message, data}` envelope. A `success: false` answer surfaces
/// as [`ApiError::Rejected`] so call sites handle it exhaustively.
///
/// # Thread Safety
/// This type is designed to be safely shared between threads. Cloning is
/// cheap as it only copies the channel sender or mock reference.
#[derive(Debug, Clone)]
pub enum BlogApi {
    /// A real API actor that performs requests through the networking actor
    Actual(Sender<Message>),
    /// A mock implementation for testing
    Mock(mock::Mock),
}

impl BlogApi {
    /// Creates a new blog API actor and spawns its core.
    pub fn spawn(net: Net, session: Session, base_url: ArcStr, log: Log) -> Self {
        let (api, _) = core::Core::new(net, session, base_url, log).spawn();
        api
    }

    /// Creates a new empty mock API instance for testing.
    pub fn mock_empty() -> Self {
        Self::Mock(mock::Mock::empty())
    }

    /// Scripts the next mock response for an operation key. No-op on the
    /// real actor.
    pub async fn script(&self, key: &str, response: ApiResult<ApiResponse>) {
        if let Self::Mock(mock) = self {
            mock.script(key, response).await;
        }
    }

    /// Delays every subsequent mock response. No-op on the real actor.
    pub async fn set_latency(&self, duration: std::time::Duration) {
        if let Self::Mock(mock) = self {
            mock.set_latency(duration).await;
        }
    }

    /// Returns the operations the mock has performed. Empty on the real
    /// actor.
    pub async fn recorded_calls(&self) -> Vec<String> {
        match self {
            Self::Mock(mock) => mock.calls().await,
            Self::Actual(_) => Vec::new(),
        }
    }

    async fn request(
        &self,
        build: impl FnOnce(oneshot::Sender<ApiResult<ApiResponse>>) -> Message,
        mock_key: String,
    ) -> ApiResult<ApiResponse> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = oneshot::channel();
                sender
                    .send(build(tx))
                    .await
                    .context("Sending message to BlogApi actor")
                    .expect("BlogApi actor died");
                rx.await
                    .context("Awaiting response from BlogApi actor")
                    .expect("BlogApi actor died")
            }
            Self::Mock(mock) => mock.respond(mock_key).await,
        }
    }

    /// Lists blogs, paged.
    pub async fn list_blogs(&self, page: usize) -> ApiResult<ApiResponse> {
        self.request(
            |tx| Message::ListBlogs { page, tx },
            format!("list_blogs:{page}"),
        )
        .await
    }

    /// Fetches a single blog by id.
    pub async fn get_blog(&self, id: ArcStr) -> ApiResult<ApiResponse> {
        let key = format!("get_blog:{id}");
        self.request(|tx| Message::GetBlog { id, tx }, key).await
    }

    /// Creates a blog.
    pub async fn create_blog(&self, blog: NewBlog) -> ApiResult<ApiResponse> {
        self.request(
            |tx| Message::CreateBlog { blog, tx },
            "create_blog".to_string(),
        )
        .await
    }

    /// Updates a blog via multipart submission.
    pub async fn update_blog(&self, update: BlogUpdate) -> ApiResult<ApiResponse> {
        let key = format!("update_blog:{}", update.id);
        self.request(|tx| Message::UpdateBlog { update, tx }, key)
            .await
    }

    /// Lists all categories.
    pub async fn list_categories(&self) -> ApiResult<ApiResponse> {
        self.request(
            |tx| Message::ListCategories { tx },
            "list_categories".to_string(),
        )
        .await
    }

    /// Fetches the current user.
    pub async fn current_user(&self) -> ApiResult<ApiResponse> {
        self.request(
            |tx| Message::CurrentUser { tx },
            "current_user".to_string(),
        )
        .await
    }

    /// Saves or unsaves a blog for the current user.
    pub async fn toggle_save(&self, blog_id: ArcStr) -> ApiResult<ApiResponse> {
        let key = format!("toggle_save:{blog_id}");
        self.request(|tx| Message::ToggleSave { blog_id, tx }, key)
            .await
    }
}
