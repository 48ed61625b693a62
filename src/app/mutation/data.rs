use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use crate::ArcStr;
use crate::api::blog::{BlogUpdate, NewBlog};
use crate::app::cache::{EntryKey, InvalidatePredicate};

/// The server call a mutation performs after its optimistic write.
#[derive(Debug, Clone)]
pub enum MutationRequest {
    CreateBlog(NewBlog),
    UpdateBlog(BlogUpdate),
    ToggleSave(ArcStr),
}

impl std::fmt::Display for MutationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateBlog(_) => write!(f, "create_blog"),
            Self::UpdateBlog(update) => write!(f, "update_blog:{}", update.id),
            Self::ToggleSave(id) => write!(f, "toggle_save:{id}"),
        }
    }
}

/// Computes the optimistic value from whatever the target entry held.
pub type OptimisticFn = Box<dyn FnOnce(Option<Value>) -> Value + Send + Sync>;

/// One optimistic mutation: apply a local guess to the target entry, run
/// the request, then either confirm with the server's value or roll the
/// entry back to its exact pre-image.
pub struct Mutation {
    /// The cache entry the optimistic write lands on.
    pub target: EntryKey,
    pub optimistic: OptimisticFn,
    pub request: MutationRequest,
    /// Entries to mark stale after the server confirms.
    pub invalidate: Vec<InvalidatePredicate>,
}

impl Mutation {
    pub fn new(target: EntryKey, request: MutationRequest, optimistic: OptimisticFn) -> Self {
        Self {
            target,
            optimistic,
            request,
            invalidate: Vec::new(),
        }
    }

    /// Adds entries to invalidate once the mutation commits.
    pub fn invalidating(mut self, predicate: InvalidatePredicate) -> Self {
        self.invalidate.push(predicate);
        self
    }
}

/// How a mutation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    /// The server confirmed; the cache holds the authoritative value.
    Committed,
    /// The server refused or the request failed; the target entry was
    /// restored to its pre-image.
    RolledBack,
    /// Cancelled before resolution; the server's answer was thrown away
    /// and the cache was left untouched.
    Discarded,
}

/// Cooperative cancellation flag shared between a caller and the executor.
///
/// Cancelling does not abort the request in flight; it makes the executor
/// discard the outcome instead of applying it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
