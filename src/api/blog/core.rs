use std::collections::HashMap;

use tokio::task::JoinHandle;

use crate::{
    ArcStr,
    log::Log,
    net::{Net, Part},
    session::Session,
};

use super::data::{ApiError, ApiResponse, ApiResult, BlogUpdate, NewBlog};
use super::message::Message;

const SCOPE: &str = "api.blog";

/// Core of the blog API actor.
///
/// Builds URLs under the configured base, attaches the bearer token when a
/// session holds one, and decodes every response through the common
/// envelope.
#[derive(Debug)]
pub struct Core {
    net: Net,
    session: Session,
    base_url: ArcStr,
    log: Log,
}

impl Core {
    pub fn new(net: Net, session: Session, base_url: ArcStr, log: Log) -> Self {
        Self {
            net,
            session,
            base_url,
            log,
        }
    }

    /// Transforms the core into an actor ready to receive messages.
    pub fn spawn(self) -> (super::BlogApi, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::ListBlogs { page, tx } => {
                        let _ = tx.send(self.list_blogs(page).await);
                    }
                    Message::GetBlog { id, tx } => {
                        let _ = tx.send(self.get_blog(&id).await);
                    }
                    Message::CreateBlog { blog, tx } => {
                        let _ = tx.send(self.create_blog(blog).await);
                    }
                    Message::UpdateBlog { update, tx } => {
                        let _ = tx.send(self.update_blog(update).await);
                    }
                    Message::ListCategories { tx } => {
                        let _ = tx.send(self.list_categories().await);
                    }
                    Message::CurrentUser { tx } => {
                        let _ = tx.send(self.current_user().await);
                    }
                    Message::ToggleSave { blog_id, tx } => {
                        let _ = tx.send(self.toggle_save(&blog_id).await);
                    }
                }
            }
        });

        (super::BlogApi::Actual(tx), handle)
    }

    fn url(&self, path: &str) -> ArcStr {
        ArcStr::from(format!("{}{path}", self.base_url).as_str())
    }

    /// Bearer-token headers when the session is authenticated.
    async fn auth_headers(&self) -> Option<HashMap<ArcStr, ArcStr>> {
        let token = self.session.token().await?;
        let mut headers = HashMap::new();
        headers.insert(
            ArcStr::from("Authorization"),
            ArcStr::from(format!("Bearer {token}").as_str()),
        );
        Some(headers)
    }

    fn decode(&self, raw: anyhow::Result<ArcStr>) -> ApiResult<ApiResponse> {
        let raw = raw.map_err(|e| {
            self.log.error(SCOPE, format!("Transport failure: {e:#}"));
            ApiError::Transport(ArcStr::from(format!("{e}").as_str()))
        })?;
        ApiResponse::decode(&raw)
    }

    async fn list_blogs(&self, page: usize) -> ApiResult<ApiResponse> {
        let url = self.url(&format!("/blogs?page={page}"));
        let raw = self.net.get(url, self.auth_headers().await).await;
        self.decode(raw)
    }

    async fn get_blog(&self, id: &str) -> ApiResult<ApiResponse> {
        let url = self.url(&format!("/blogs/{id}"));
        let raw = self.net.get(url, self.auth_headers().await).await;
        self.decode(raw)
    }

    async fn create_blog(&self, blog: NewBlog) -> ApiResult<ApiResponse> {
        let url = self.url("/blogs");
        let body = serde_json::to_value(&blog)
            .map_err(|e| ApiError::Transport(ArcStr::from(format!("{e}").as_str())))?;
        let raw = self
            .net
            .post_json(url, self.auth_headers().await, body)
            .await;
        self.decode(raw)
    }

    /// Blog updates travel as multipart: a `blogData` JSON field plus an
    /// optional `blogImage` binary field.
    async fn update_blog(&self, update: BlogUpdate) -> ApiResult<ApiResponse> {
        let url = self.url(&format!("/blogs/{}", update.id));

        let mut parts = vec![Part::Text {
            name: ArcStr::from("blogData"),
            value: update.metadata().to_string(),
        }];
        if let Some(image) = update.image {
            parts.push(Part::File {
                name: ArcStr::from("blogImage"),
                filename: image.filename,
                bytes: image.bytes,
            });
        }

        let raw = self
            .net
            .post_multipart(url, self.auth_headers().await, parts)
            .await;
        self.decode(raw)
    }

    async fn list_categories(&self) -> ApiResult<ApiResponse> {
        let url = self.url("/categories");
        let raw = self.net.get(url, None).await;
        self.decode(raw)
    }

    async fn current_user(&self) -> ApiResult<ApiResponse> {
        let url = self.url("/users/me");
        let raw = self.net.get(url, self.auth_headers().await).await;
        self.decode(raw)
    }

    async fn toggle_save(&self, blog_id: &str) -> ApiResult<ApiResponse> {
        let url = self.url(&format!("/users/saved-blogs/{blog_id}"));
        let raw = self
            .net
            .put_json(url, self.auth_headers().await, serde_json::json!({}))
            .await;
        self.decode(raw)
    }
}
