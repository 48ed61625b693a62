pub mod blog;
#[cfg(test)]
mod tests;

pub use blog::{
    BlogForm, EditBlogForm, FormFlow, ImageAttachment, SubmitOutcome, ValidationError,
};

/// Where a finished flow sends the user next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
}
