use std::time::Duration;

use serde_json::{Value, json};

use crate::api::blog::{ApiError, ApiResponse, BlogApi};
use crate::app::alert::{AlertKind, Alerts};
use crate::app::cache::{EntityCache, EntryKey, EntryStatus, InvalidatePredicate, ResourceKind};
use crate::app::config::{Config, Data};
use crate::log::Log;
use crate::ArcStr;

use super::data::{Mutation, MutationRequest, MutationStatus};
use super::MutationExec;

struct Rig {
    api: BlogApi,
    cache: EntityCache,
    alerts: Alerts,
    exec: MutationExec,
}

async fn rig() -> Rig {
    let api = BlogApi::mock_empty();
    let cache = EntityCache::spawn(api.clone(), Config::mock(Data::default()), Log::Mock).await;
    let alerts = Alerts::mock();
    let exec = MutationExec::spawn(api.clone(), cache.clone(), alerts.clone(), Log::Mock);
    Rig {
        api,
        cache,
        alerts,
        exec,
    }
}

fn ok_with(message: &str, data: Option<Value>) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse {
        success: true,
        message: ArcStr::from(message),
        data,
    })
}

fn toggle(target: EntryKey, blog_id: &str, optimistic: Value) -> Mutation {
    Mutation::new(
        target,
        MutationRequest::ToggleSave(ArcStr::from(blog_id)),
        Box::new(move |_| optimistic),
    )
}

#[tokio::test]
async fn optimistic_value_is_visible_while_the_request_runs() {
    let rig = rig().await;
    let key = EntryKey::current_user();
    rig.cache
        .write(key.clone(), json!({"savedBlogs": []}), EntryStatus::Fulfilled)
        .await;
    rig.api.set_latency(Duration::from_millis(150)).await;
    rig.api
        .script("toggle_save:b1", ok_with("Saved", Some(json!({"savedBlogs": ["b1"]}))))
        .await;

    let handle = rig
        .exec
        .execute(toggle(key.clone(), "b1", json!({"savedBlogs": ["b1"]})))
        .await;

    // The request is still in flight; the guess is already readable.
    let snapshot = rig.cache.peek(key.clone()).await;
    assert_eq!(snapshot.value, Some(json!({"savedBlogs": ["b1"]})));
    assert_eq!(snapshot.status, EntryStatus::Fulfilled);

    assert_eq!(handle.wait().await, MutationStatus::Committed);
    let snapshot = rig.cache.peek(key).await;
    assert_eq!(snapshot.value, Some(json!({"savedBlogs": ["b1"]})));
}

#[tokio::test]
async fn commit_replaces_the_guess_with_the_server_value() {
    let rig = rig().await;
    let key = EntryKey::blog("b1");
    rig.api
        .script(
            "update_blog:b1",
            ok_with("Blog updated", Some(json!({"_id": "b1", "title": "server truth"}))),
        )
        .await;

    let update = crate::api::blog::BlogUpdate {
        id: ArcStr::from("b1"),
        title: ArcStr::from("local guess"),
        description: ArcStr::from("body"),
        image: None,
    };
    let handle = rig
        .exec
        .execute(Mutation::new(
            key.clone(),
            MutationRequest::UpdateBlog(update),
            Box::new(|_| json!({"_id": "b1", "title": "local guess"})),
        ))
        .await;

    assert_eq!(handle.wait().await, MutationStatus::Committed);
    let snapshot = rig.cache.peek(key).await;
    assert_eq!(snapshot.value, Some(json!({"_id": "b1", "title": "server truth"})));
    assert_eq!(snapshot.status, EntryStatus::Fulfilled);

    let alert = rig.alerts.current().await.unwrap();
    assert_eq!(alert.kind, AlertKind::Success);
    assert_eq!(alert.text.as_ref(), "Blog updated");
}

#[tokio::test]
async fn commit_without_payload_keeps_the_guess_and_marks_it_stale() {
    let rig = rig().await;
    let key = EntryKey::current_user();
    rig.cache
        .write(key.clone(), json!({"savedBlogs": []}), EntryStatus::Fulfilled)
        .await;
    rig.api.script("toggle_save:b1", ok_with("Saved", None)).await;

    let handle = rig
        .exec
        .execute(toggle(key.clone(), "b1", json!({"savedBlogs": ["b1"]})))
        .await;

    assert_eq!(handle.wait().await, MutationStatus::Committed);
    let snapshot = rig.cache.peek(key).await;
    assert_eq!(snapshot.value, Some(json!({"savedBlogs": ["b1"]})));
    assert_eq!(snapshot.status, EntryStatus::Stale);
}

#[tokio::test]
async fn commit_invalidates_the_related_entries() {
    let rig = rig().await;
    let list = EntryKey::blog_list(1);
    rig.cache
        .write(list.clone(), json!([{"_id": "old"}]), EntryStatus::Fulfilled)
        .await;
    rig.api
        .script("create_blog", ok_with("Blog created", Some(json!({"_id": "b9"}))))
        .await;

    let blog = crate::api::blog::NewBlog {
        title: ArcStr::from("fresh"),
        description: ArcStr::from("a long enough description"),
        category_id: ArcStr::from("c1"),
        user_id: ArcStr::from("u1"),
    };
    let mutation = Mutation::new(
        EntryKey::blog("b9"),
        MutationRequest::CreateBlog(blog),
        Box::new(|_| json!({"_id": "b9", "title": "fresh"})),
    )
    .invalidating(InvalidatePredicate::Kind(ResourceKind::Blogs));

    assert_eq!(rig.exec.execute(mutation).await.wait().await, MutationStatus::Committed);
    assert_eq!(rig.cache.peek(list).await.status, EntryStatus::Stale);
}

#[tokio::test]
async fn failure_restores_the_exact_pre_image() {
    let rig = rig().await;
    let key = EntryKey::current_user();
    rig.cache
        .write(key.clone(), json!({"savedBlogs": ["b0"]}), EntryStatus::Fulfilled)
        .await;
    rig.api
        .script(
            "toggle_save:b1",
            Err(ApiError::Rejected(ArcStr::from("You cannot save this blog"))),
        )
        .await;

    let handle = rig
        .exec
        .execute(toggle(key.clone(), "b1", json!({"savedBlogs": ["b0", "b1"]})))
        .await;

    assert_eq!(handle.wait().await, MutationStatus::RolledBack);
    let snapshot = rig.cache.peek(key).await;
    assert_eq!(snapshot.value, Some(json!({"savedBlogs": ["b0"]})));
    assert_eq!(snapshot.status, EntryStatus::Fulfilled);

    let alert = rig.alerts.current().await.unwrap();
    assert_eq!(alert.kind, AlertKind::Error);
    assert_eq!(alert.text.as_ref(), "You cannot save this blog");
}

#[tokio::test]
async fn failure_on_an_empty_entry_rolls_back_to_nothing() {
    let rig = rig().await;
    let key = EntryKey::blog("b1");
    rig.api
        .script("toggle_save:b1", Err(ApiError::Transport(ArcStr::from("timed out"))))
        .await;

    let handle = rig
        .exec
        .execute(toggle(key.clone(), "b1", json!({"saved": true})))
        .await;

    assert_eq!(handle.wait().await, MutationStatus::RolledBack);
    let snapshot = rig.cache.peek(key).await;
    assert!(snapshot.value.is_none());
    assert_eq!(snapshot.status, EntryStatus::Uninitialized);
}

#[tokio::test]
async fn same_key_mutations_run_in_order_with_fresh_pre_images() {
    let rig = rig().await;
    let key = EntryKey::current_user();
    rig.cache
        .write(key.clone(), json!({"savedBlogs": []}), EntryStatus::Fulfilled)
        .await;
    rig.api.set_latency(Duration::from_millis(100)).await;
    rig.api
        .script("toggle_save:b1", ok_with("Saved", Some(json!({"savedBlogs": ["b1"]}))))
        .await;
    rig.api
        .script("toggle_save:b2", Err(ApiError::Rejected(ArcStr::from("nope"))))
        .await;

    let first = rig
        .exec
        .execute(toggle(key.clone(), "b1", json!({"savedBlogs": ["b1"]})))
        .await;
    let second = rig
        .exec
        .execute(toggle(key.clone(), "b2", json!({"savedBlogs": ["b1", "b2"]})))
        .await;

    assert_eq!(first.wait().await, MutationStatus::Committed);
    assert_eq!(second.wait().await, MutationStatus::RolledBack);
    // The rollback restores the first mutation's committed value, not the
    // state from before both.
    let snapshot = rig.cache.peek(key).await;
    assert_eq!(snapshot.value, Some(json!({"savedBlogs": ["b1"]})));
}

#[tokio::test]
async fn cancelled_mutation_discards_the_outcome() {
    let rig = rig().await;
    let key = EntryKey::current_user();
    rig.cache
        .write(key.clone(), json!({"savedBlogs": []}), EntryStatus::Fulfilled)
        .await;
    rig.api.set_latency(Duration::from_millis(150)).await;
    rig.api
        .script("toggle_save:b1", ok_with("Saved", Some(json!({"savedBlogs": ["server"]}))))
        .await;

    let handle = rig
        .exec
        .execute(toggle(key.clone(), "b1", json!({"savedBlogs": ["b1"]})))
        .await;
    handle.cancel.cancel();

    assert_eq!(handle.wait().await, MutationStatus::Discarded);
    // Neither the server value nor a rollback touched the entry.
    let snapshot = rig.cache.peek(key).await;
    assert_eq!(snapshot.value, Some(json!({"savedBlogs": ["b1"]})));
    assert!(rig.alerts.history().await.is_empty());
}

#[tokio::test]
async fn mutations_can_be_submitted_from_spawned_tasks() {
    let rig = rig().await;
    let key = EntryKey::blog("b1");
    rig.api
        .script("toggle_save:b1", ok_with("Saved", Some(json!({"saved": true}))))
        .await;

    let exec = rig.exec.clone();
    let target = key.clone();
    let status = tokio::spawn(async move {
        exec.execute(toggle(target, "b1", json!({"saved": true})))
            .await
            .wait()
            .await
    })
    .await
    .unwrap();

    assert_eq!(status, MutationStatus::Committed);
    assert_eq!(rig.cache.peek(key).await.value, Some(json!({"saved": true})));
}

#[tokio::test]
async fn correlation_ids_are_unique_and_increasing() {
    let rig = rig().await;
    rig.api.script("toggle_save:a", ok_with("ok", None)).await;
    rig.api.script("toggle_save:b", ok_with("ok", None)).await;

    let first = rig
        .exec
        .execute(toggle(EntryKey::blog("a"), "a", json!({})))
        .await;
    let second = rig
        .exec
        .execute(toggle(EntryKey::blog("b"), "b", json!({})))
        .await;
    assert!(second.correlation_id > first.correlation_id);
}
