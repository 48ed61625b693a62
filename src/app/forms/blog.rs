use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use serde_json::json;

use crate::ArcStr;
use crate::api::blog::{BlogApi, BlogUpdate, ImageFile, NewBlog, User};
use crate::app::cache::{EntryKey, InvalidatePredicate, ResourceKind};
use crate::app::mutation::{Mutation, MutationExec, MutationRequest, MutationStatus};
use crate::log::Log;
use crate::session::Session;

use super::Route;

const SCOPE: &str = "forms";

/// Image constraints enforced before anything leaves the machine.
const SUPPORTED_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// A field-level validation failure, carrying the message shown next to
/// the field. Never surfaced through the alert slot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub ArcStr);

impl ValidationError {
    fn new(message: &str) -> Self {
        Self(ArcStr::from(message))
    }
}

/// Fields of the create-blog form.
#[derive(Debug, Clone)]
pub struct BlogForm {
    pub title: ArcStr,
    pub description: ArcStr,
    pub category_id: ArcStr,
}

impl BlogForm {
    /// Runs every field rule locally, without touching the network.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(ValidationError::new("Blog title is required!"));
        } else if self.title.trim().chars().count() < 5 {
            errors.push(ValidationError::new(
                "Blog title must have at least 5 characters!",
            ));
        }
        if self.category_id.trim().is_empty() {
            errors.push(ValidationError::new("Blog's categoryId is required!"));
        }
        if self.description.trim().is_empty() {
            errors.push(ValidationError::new("Blog content is required!"));
        } else if self.description.trim().chars().count() < 20 {
            errors.push(ValidationError::new(
                "Blog content must have at least 20 characters!",
            ));
        }
        errors
    }
}

/// An image picked for upload, validated before submission.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub filename: ArcStr,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name = self.filename.to_lowercase();
        if !SUPPORTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            return Err(ValidationError::new(
                "Image must be a .jpg, .jpeg, .png or .webp file!",
            ));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ValidationError::new("File size must be less than 5MB"));
        }
        Ok(())
    }
}

/// Fields of the edit-blog form. The image is optional; leaving it out
/// keeps whatever the server already has.
#[derive(Debug, Clone)]
pub struct EditBlogForm {
    pub id: ArcStr,
    pub title: ArcStr,
    pub description: ArcStr,
    pub image: Option<ImageAttachment>,
}

impl EditBlogForm {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(ValidationError::new("Blog title is required!"));
        } else if self.title.trim().chars().count() < 5 {
            errors.push(ValidationError::new(
                "Blog title must have at least 5 characters!",
            ));
        }
        if self.description.trim().is_empty() {
            errors.push(ValidationError::new("Blog content is required!"));
        } else if self.description.trim().chars().count() < 20 {
            errors.push(ValidationError::new(
                "Blog content must have at least 20 characters!",
            ));
        }
        if let Some(image) = &self.image {
            if let Err(error) = image.validate() {
                errors.push(error);
            }
        }
        errors
    }
}

/// What a submission attempt amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Committed; leave the form.
    Navigate(Route),
    /// Field rules failed; nothing was sent.
    Invalid(Vec<ValidationError>),
    /// No identity to attach the blog to.
    LoginRequired,
    /// The previous submission has not resolved yet.
    InFlight,
    /// The server refused; the error alert is up, the form keeps its state.
    Stayed,
}

/// Drives blog form submissions through the mutation executor.
///
/// One flow guards one form: while a submission is in flight every further
/// submit answers [`SubmitOutcome::InFlight`], matching a disabled button.
#[derive(Debug, Clone)]
pub struct FormFlow {
    api: BlogApi,
    exec: MutationExec,
    session: Session,
    log: Log,
    submitting: Arc<AtomicBool>,
}

impl FormFlow {
    pub fn new(api: BlogApi, exec: MutationExec, session: Session, log: Log) -> Self {
        Self {
            api,
            exec,
            session,
            log,
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a submission is currently in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Relaxed)
    }

    /// Submits the create-blog form.
    pub async fn submit_new(&self, form: BlogForm) -> SubmitOutcome {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return SubmitOutcome::InFlight;
        }
        let outcome = self.run_new(form).await;
        self.submitting.store(false, Ordering::SeqCst);
        outcome
    }

    /// Submits the edit-blog form.
    pub async fn submit_edit(&self, form: EditBlogForm) -> SubmitOutcome {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return SubmitOutcome::InFlight;
        }
        let outcome = self.run_edit(form).await;
        self.submitting.store(false, Ordering::SeqCst);
        outcome
    }

    /// Returns the id the blog will be attached to, asking the server
    /// who the token belongs to when the session only carries a token.
    async fn resolve_user_id(&self) -> Option<ArcStr> {
        if let Some(user_id) = self.session.user_id().await {
            return Some(user_id);
        }
        self.session.token().await?;
        let response = match self.api.current_user().await {
            Ok(response) => response,
            Err(error) => {
                self.log
                    .warn(SCOPE, format!("identity lookup failed: {error}"));
                return None;
            }
        };
        let user: User = serde_json::from_value(response.data?).ok()?;
        self.session.set_identity(user.id.clone()).await;
        Some(user.id)
    }

    async fn run_new(&self, form: BlogForm) -> SubmitOutcome {
        let errors = form.validate();
        if !errors.is_empty() {
            return SubmitOutcome::Invalid(errors);
        }
        let Some(user_id) = self.resolve_user_id().await else {
            return SubmitOutcome::LoginRequired;
        };

        let blog = NewBlog {
            title: form.title.clone(),
            description: form.description.clone(),
            category_id: form.category_id.clone(),
            user_id: user_id.clone(),
        };
        // The draft gets a provisional key; list pages refetch on commit and
        // pick up the server's id.
        let draft_key = EntryKey::blog(format!("draft-{}", Utc::now().timestamp_millis()));
        let optimistic = json!({
            "title": &*form.title,
            "description": &*form.description,
            "categoryId": &*form.category_id,
            "userId": &*user_id,
        });
        let mutation = Mutation::new(
            draft_key,
            MutationRequest::CreateBlog(blog),
            Box::new(move |_| optimistic),
        )
        .invalidating(InvalidatePredicate::Kind(ResourceKind::Blogs));

        let handle = self.exec.execute(mutation).await;
        self.log
            .info(SCOPE, format!("create submitted as mutation {}", handle.correlation_id));
        match handle.wait().await {
            MutationStatus::Committed => SubmitOutcome::Navigate(Route::Home),
            MutationStatus::RolledBack | MutationStatus::Discarded => SubmitOutcome::Stayed,
        }
    }

    async fn run_edit(&self, form: EditBlogForm) -> SubmitOutcome {
        let errors = form.validate();
        if !errors.is_empty() {
            return SubmitOutcome::Invalid(errors);
        }

        let update = BlogUpdate {
            id: form.id.clone(),
            title: form.title.clone(),
            description: form.description.clone(),
            image: form.image.map(|image| ImageFile {
                filename: image.filename,
                bytes: image.bytes,
            }),
        };
        let title = form.title;
        let description = form.description;
        let id = form.id.clone();
        let mutation = Mutation::new(
            EntryKey::blog(form.id.as_ref()),
            MutationRequest::UpdateBlog(update),
            Box::new(move |prev| {
                let mut value = prev.unwrap_or_else(|| json!({"_id": &*id}));
                if let Some(object) = value.as_object_mut() {
                    object.insert("title".into(), json!(&*title));
                    object.insert("description".into(), json!(&*description));
                }
                value
            }),
        )
        .invalidating(InvalidatePredicate::Kind(ResourceKind::Blogs));

        let handle = self.exec.execute(mutation).await;
        self.log
            .info(SCOPE, format!("edit submitted as mutation {}", handle.correlation_id));
        match handle.wait().await {
            MutationStatus::Committed => SubmitOutcome::Navigate(Route::Home),
            MutationStatus::RolledBack | MutationStatus::Discarded => SubmitOutcome::Stayed,
        }
    }
}
