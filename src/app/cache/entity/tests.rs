use std::time::Duration;

use serde_json::{Value, json};

use crate::api::blog::{ApiError, ApiResponse, BlogApi};
use crate::app::config::{Config, Data, U64Opt};
use crate::log::Log;
use crate::ArcStr;

use super::data::{EntryKey, EntryStatus, InvalidatePredicate, ResourceKind};
use super::EntityCache;

fn ok(data: Value) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse {
        success: true,
        message: ArcStr::from("ok"),
        data: Some(data),
    })
}

async fn cache_over(api: BlogApi) -> EntityCache {
    EntityCache::spawn(api, Config::mock(Data::default()), Log::Mock).await
}

/// Polls until the entry reaches the wanted status or the deadline passes.
async fn wait_for_status(cache: &EntityCache, key: &EntryKey, status: EntryStatus) {
    for _ in 0..100 {
        if cache.peek(key.clone()).await.status == status {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("entry {key} never reached {status:?}");
}

#[tokio::test]
async fn first_read_is_pending_then_fulfilled() {
    let api = BlogApi::mock_empty();
    api.script("get_blog:b1", ok(json!({"_id": "b1", "title": "Hello"})))
        .await;
    let cache = cache_over(api).await;
    let key = EntryKey::blog("b1");

    let snapshot = cache.read(key.clone()).await;
    assert_eq!(snapshot.status, EntryStatus::Pending);
    assert!(!snapshot.has_value());

    wait_for_status(&cache, &key, EntryStatus::Fulfilled).await;
    let snapshot = cache.peek(key).await;
    assert_eq!(snapshot.value, Some(json!({"_id": "b1", "title": "Hello"})));
}

#[tokio::test]
async fn fulfilled_read_does_not_refetch() {
    let api = BlogApi::mock_empty();
    api.script("get_blog:b1", ok(json!({"_id": "b1"}))).await;
    let cache = cache_over(api.clone()).await;
    let key = EntryKey::blog("b1");

    cache.read(key.clone()).await;
    wait_for_status(&cache, &key, EntryStatus::Fulfilled).await;

    let snapshot = cache.read(key.clone()).await;
    assert_eq!(snapshot.status, EntryStatus::Fulfilled);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(api.recorded_calls().await, vec!["get_blog:b1".to_string()]);
}

#[tokio::test]
async fn stale_read_serves_old_value_while_revalidating() {
    let api = BlogApi::mock_empty();
    api.script("get_blog:b1", ok(json!({"title": "old"}))).await;
    api.script("get_blog:b1", ok(json!({"title": "new"}))).await;
    let cache = cache_over(api).await;
    let key = EntryKey::blog("b1");

    cache.read(key.clone()).await;
    wait_for_status(&cache, &key, EntryStatus::Fulfilled).await;
    assert_eq!(cache.invalidate(InvalidatePredicate::Key(key.clone())).await, 1);

    let snapshot = cache.read(key.clone()).await;
    assert_eq!(snapshot.status, EntryStatus::Pending);
    assert_eq!(snapshot.value, Some(json!({"title": "old"})));

    wait_for_status(&cache, &key, EntryStatus::Fulfilled).await;
    assert_eq!(cache.peek(key).await.value, Some(json!({"title": "new"})));
}

#[tokio::test]
async fn invalidate_is_idempotent_and_scoped_by_kind() {
    let api = BlogApi::mock_empty();
    api.script("get_blog:b1", ok(json!({"title": "a"}))).await;
    api.script("list_categories", ok(json!([]))).await;
    let cache = cache_over(api).await;
    let blog = EntryKey::blog("b1");
    let categories = EntryKey::categories();

    cache.read(blog.clone()).await;
    cache.read(categories.clone()).await;
    wait_for_status(&cache, &blog, EntryStatus::Fulfilled).await;
    wait_for_status(&cache, &categories, EntryStatus::Fulfilled).await;

    assert_eq!(cache.invalidate(InvalidatePredicate::Kind(ResourceKind::Blogs)).await, 1);
    assert_eq!(cache.invalidate(InvalidatePredicate::Kind(ResourceKind::Blogs)).await, 0);
    assert_eq!(cache.peek(categories).await.status, EntryStatus::Fulfilled);
}

#[tokio::test]
async fn failed_revalidation_keeps_last_good_value() {
    let api = BlogApi::mock_empty();
    api.script("get_blog:b1", ok(json!({"title": "kept"}))).await;
    api.script(
        "get_blog:b1",
        Err(ApiError::Transport(ArcStr::from("connection refused"))),
    )
    .await;
    let cache = cache_over(api).await;
    let key = EntryKey::blog("b1");

    cache.read(key.clone()).await;
    wait_for_status(&cache, &key, EntryStatus::Fulfilled).await;
    cache.invalidate(InvalidatePredicate::Key(key.clone())).await;
    cache.read(key.clone()).await;

    wait_for_status(&cache, &key, EntryStatus::Errored).await;
    assert_eq!(cache.peek(key).await.value, Some(json!({"title": "kept"})));
}

#[tokio::test]
async fn write_notifies_subscribers() {
    let cache = cache_over(BlogApi::mock_empty()).await;
    let key = EntryKey::blog("b1");

    let (_guard, mut changes) = cache.subscribe(key.clone()).await;
    cache
        .write(key.clone(), json!({"title": "pushed"}), EntryStatus::Fulfilled)
        .await;

    let snapshot = changes.recv().await.unwrap();
    assert_eq!(snapshot.key, key);
    assert_eq!(snapshot.value, Some(json!({"title": "pushed"})));
    assert_eq!(snapshot.status, EntryStatus::Fulfilled);
}

#[tokio::test]
async fn remove_resets_entry_and_notifies() {
    let cache = cache_over(BlogApi::mock_empty()).await;
    let key = EntryKey::blog("b1");

    cache
        .write(key.clone(), json!({"title": "short-lived"}), EntryStatus::Fulfilled)
        .await;
    let (_guard, mut changes) = cache.subscribe(key.clone()).await;
    cache.remove(key.clone()).await;

    let snapshot = changes.recv().await.unwrap();
    assert_eq!(snapshot.status, EntryStatus::Uninitialized);
    assert!(snapshot.value.is_none());
    assert_eq!(cache.peek(key).await.status, EntryStatus::Uninitialized);
}

#[tokio::test]
async fn sweep_spares_watched_entries_and_evicts_idle_ones() {
    let api = BlogApi::mock_empty();
    let mut data = Data::default();
    data.set_u64(U64Opt::CacheGraceSecs, 0);
    let cache = EntityCache::spawn(api, Config::mock(data), Log::Mock).await;
    let watched = EntryKey::blog("watched");
    let idle = EntryKey::blog("idle");

    cache
        .write(watched.clone(), json!({"n": 1}), EntryStatus::Fulfilled)
        .await;
    cache
        .write(idle.clone(), json!({"n": 2}), EntryStatus::Fulfilled)
        .await;
    let (guard, _changes) = cache.subscribe(watched.clone()).await;

    tokio::time::sleep(Duration::from_millis(1100)).await;
    cache.sweep().await;
    assert!(cache.peek(watched.clone()).await.has_value());
    assert!(!cache.peek(idle).await.has_value());

    drop(guard);
    tokio::time::sleep(Duration::from_millis(1100)).await;
    cache.sweep().await;
    assert!(!cache.peek(watched).await.has_value());
}

#[tokio::test]
async fn blog_list_key_carries_its_page() {
    let api = BlogApi::mock_empty();
    api.script("list_blogs:3", ok(json!([{"_id": "b7"}]))).await;
    let cache = cache_over(api.clone()).await;
    let key = EntryKey::blog_list(3);

    cache.read(key.clone()).await;
    wait_for_status(&cache, &key, EntryStatus::Fulfilled).await;
    assert_eq!(api.recorded_calls().await, vec!["list_blogs:3".to_string()]);
}
