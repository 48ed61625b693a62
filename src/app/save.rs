use serde_json::{Value, json};

use crate::ArcStr;
use crate::app::cache::{EntityCache, EntryKey};
use crate::app::forms::Route;
use crate::app::mutation::{Mutation, MutationExec, MutationRequest, MutationStatus};
use crate::session::Session;


/// The interstitial prompt shown when a guest hits the save button. It is
/// the caller's surface, never an alert.
pub const LOGIN_PROMPT: &str = "You need to login to save this blog!";

/// What pressing the save button amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A guest pressed save; show [`LOGIN_PROMPT`] and offer this route.
    LoginRequired(Route),
    /// The toggle ran; carries how the mutation ended.
    Resolved(MutationStatus),
}

/// The bookmark flow: toggles a blog in and out of the current user's
/// saved list, optimistically.
///
/// Toggles target the current-user cache entry, so rapid presses serialize
/// behind one another instead of racing the server.
#[derive(Debug, Clone)]
pub struct SaveFlow {
    exec: MutationExec,
    cache: EntityCache,
    session: Session,
}

impl SaveFlow {
    pub fn new(exec: MutationExec, cache: EntityCache, session: Session) -> Self {
        Self {
            exec,
            cache,
            session,
        }
    }

    /// Whether the blog is currently in the saved list, as the cache sees
    /// it. Optimistic toggles show up here immediately.
    pub async fn is_saved(&self, blog_id: &str) -> bool {
        let snapshot = self.cache.read(EntryKey::current_user()).await;
        snapshot
            .value
            .as_ref()
            .map(|user| saved_blogs(user).iter().any(|id| *id == blog_id))
            .unwrap_or(false)
    }

    /// Toggles the saved state of one blog. Guests get the interstitial
    /// prompt instead of a request; nothing is dispatched to the alert slot.
    pub async fn toggle(&self, blog_id: ArcStr) -> SaveOutcome {
        if !self.session.is_authenticated().await {
            return SaveOutcome::LoginRequired(Route::Login);
        }

        let id = blog_id.clone();
        let mutation = Mutation::new(
            EntryKey::current_user(),
            MutationRequest::ToggleSave(blog_id),
            Box::new(move |prev| toggle_saved(prev, &id)),
        );
        let status = self.exec.execute(mutation).await.wait().await;
        SaveOutcome::Resolved(status)
    }
}

/// The `savedBlogs` ids of a user value, empty when absent or malformed.
fn saved_blogs(user: &Value) -> Vec<&str> {
    user.get("savedBlogs")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Flips `id`'s membership in the user's saved list, leaving every other
/// field alone.
fn toggle_saved(user: Option<Value>, id: &str) -> Value {
    let mut user = user.unwrap_or_else(|| json!({}));
    let mut ids: Vec<String> = saved_blogs(&user).iter().map(|s| s.to_string()).collect();
    match ids.iter().position(|existing| existing == id) {
        Some(index) => {
            ids.remove(index);
        }
        None => ids.push(id.to_string()),
    }
    if let Some(object) = user.as_object_mut() {
        object.insert("savedBlogs".into(), json!(ids));
    }
    user
}
