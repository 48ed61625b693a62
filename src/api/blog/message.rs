use tokio::sync::oneshot;

use crate::ArcStr;

use super::data::{ApiResponse, ApiResult, BlogUpdate, NewBlog};

/// Messages that can be sent to the blog API actor.
#[derive(Debug)]
pub enum Message {
    /// List blogs, paged
    ListBlogs {
        page: usize,
        tx: oneshot::Sender<ApiResult<ApiResponse>>,
    },
    /// Fetch a single blog by id
    GetBlog {
        id: ArcStr,
        tx: oneshot::Sender<ApiResult<ApiResponse>>,
    },
    /// Create a blog
    CreateBlog {
        blog: NewBlog,
        tx: oneshot::Sender<ApiResult<ApiResponse>>,
    },
    /// Update a blog (multipart: JSON metadata plus optional image)
    UpdateBlog {
        update: BlogUpdate,
        tx: oneshot::Sender<ApiResult<ApiResponse>>,
    },
    /// List all categories
    ListCategories {
        tx: oneshot::Sender<ApiResult<ApiResponse>>,
    },
    /// Fetch the current user
    CurrentUser {
        tx: oneshot::Sender<ApiResult<ApiResponse>>,
    },
    /// Save or unsave a blog for the current user
    ToggleSave {
        blog_id: ArcStr,
        tx: oneshot::Sender<ApiResult<ApiResponse>>,
    },
}
