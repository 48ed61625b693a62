use std::time::Duration;

use serde_json::json;

use crate::api::blog::{ApiError, ApiResponse, BlogApi};
use crate::app::alert::{AlertKind, Alerts};
use crate::app::cache::{EntityCache, EntryKey, EntryStatus};
use crate::app::config::{Config, Data};
use crate::app::mutation::MutationExec;
use crate::log::Log;
use crate::session::{MockData, Session};
use crate::ArcStr;

use super::blog::{BlogForm, EditBlogForm, FormFlow, ImageAttachment, SubmitOutcome};
use super::Route;

fn valid_form() -> BlogForm {
    BlogForm {
        title: ArcStr::from("A proper title"),
        description: ArcStr::from("A description comfortably over twenty characters."),
        category_id: ArcStr::from("c1"),
    }
}

struct Rig {
    api: BlogApi,
    cache: EntityCache,
    alerts: Alerts,
    flow: FormFlow,
}

async fn rig(session: Session) -> Rig {
    let api = BlogApi::mock_empty();
    let cache = EntityCache::spawn(api.clone(), Config::mock(Data::default()), Log::Mock).await;
    let alerts = Alerts::mock();
    let exec = MutationExec::spawn(api.clone(), cache.clone(), alerts.clone(), Log::Mock);
    let flow = FormFlow::new(api.clone(), exec, session, Log::Mock);
    Rig {
        api,
        cache,
        alerts,
        flow,
    }
}

fn logged_in() -> Session {
    Session::mock(MockData {
        token: Some(ArcStr::from("tok")),
        user_id: Some(ArcStr::from("u1")),
    })
}

#[test]
fn empty_form_reports_every_required_field() {
    let form = BlogForm {
        title: ArcStr::from(""),
        description: ArcStr::from(""),
        category_id: ArcStr::from(""),
    };
    let messages: Vec<_> = form.validate().iter().map(|e| e.0.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "Blog title is required!",
            "Blog's categoryId is required!",
            "Blog content is required!",
        ]
    );
}

#[test]
fn short_fields_report_length_rules() {
    let form = BlogForm {
        title: ArcStr::from("Hey"),
        description: ArcStr::from("too short"),
        category_id: ArcStr::from("c1"),
    };
    let messages: Vec<_> = form.validate().iter().map(|e| e.0.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "Blog title must have at least 5 characters!",
            "Blog content must have at least 20 characters!",
        ]
    );
}

#[test]
fn image_rules_cover_type_and_size() {
    let wrong_type = ImageAttachment {
        filename: ArcStr::from("notes.pdf"),
        bytes: vec![0; 16],
    };
    assert!(wrong_type.validate().is_err());

    let too_big = ImageAttachment {
        filename: ArcStr::from("photo.png"),
        bytes: vec![0; 5 * 1024 * 1024 + 1],
    };
    assert_eq!(
        too_big.validate().unwrap_err().0.as_ref(),
        "File size must be less than 5MB"
    );

    let fine = ImageAttachment {
        filename: ArcStr::from("Photo.JPG"),
        bytes: vec![0; 1024],
    };
    assert!(fine.validate().is_ok());
}

#[tokio::test]
async fn invalid_form_never_reaches_the_network() {
    let rig = rig(logged_in()).await;
    let form = BlogForm {
        title: ArcStr::from(""),
        description: ArcStr::from(""),
        category_id: ArcStr::from(""),
    };

    let outcome = rig.flow.submit_new(form).await;
    assert!(matches!(outcome, SubmitOutcome::Invalid(errors) if errors.len() == 3));
    assert!(rig.api.recorded_calls().await.is_empty());
    // Field errors stay on the form, not in the alert slot.
    assert!(rig.alerts.history().await.is_empty());
}

#[tokio::test]
async fn guest_cannot_submit_a_new_blog() {
    let rig = rig(Session::mock(MockData::default())).await;
    let outcome = rig.flow.submit_new(valid_form()).await;
    assert_eq!(outcome, SubmitOutcome::LoginRequired);
    assert!(rig.api.recorded_calls().await.is_empty());
}

#[tokio::test]
async fn token_only_session_resolves_identity_before_creating() {
    let session = Session::mock(MockData {
        token: Some(ArcStr::from("tok")),
        user_id: None,
    });
    let rig = rig(session.clone()).await;
    rig.api
        .script(
            "current_user",
            Ok(ApiResponse {
                success: true,
                message: ArcStr::from("ok"),
                data: Some(json!({
                    "_id": "u1",
                    "name": "Ada",
                    "email": "ada@example.com",
                    "savedBlogs": [],
                })),
            }),
        )
        .await;
    rig.api
        .script(
            "create_blog",
            Ok(ApiResponse {
                success: true,
                message: ArcStr::from("Blog created successfully"),
                data: Some(json!({"_id": "b9"})),
            }),
        )
        .await;

    let outcome = rig.flow.submit_new(valid_form()).await;
    assert_eq!(outcome, SubmitOutcome::Navigate(Route::Home));
    assert_eq!(
        rig.api.recorded_calls().await,
        vec!["current_user".to_string(), "create_blog".to_string()]
    );
    // The identity sticks for the next submission.
    assert_eq!(session.user_id().await, Some(ArcStr::from("u1")));
}

#[tokio::test]
async fn failed_identity_lookup_asks_for_login() {
    let rig = rig(Session::mock(MockData {
        token: Some(ArcStr::from("tok")),
        user_id: None,
    }))
    .await;
    rig.api
        .script(
            "current_user",
            Err(ApiError::Rejected(ArcStr::from("jwt expired"))),
        )
        .await;

    let outcome = rig.flow.submit_new(valid_form()).await;
    assert_eq!(outcome, SubmitOutcome::LoginRequired);
    assert_eq!(rig.api.recorded_calls().await, vec!["current_user".to_string()]);
}

#[tokio::test]
async fn committed_submission_navigates_home() {
    let rig = rig(logged_in()).await;
    rig.api
        .script(
            "create_blog",
            Ok(ApiResponse {
                success: true,
                message: ArcStr::from("Blog created successfully"),
                data: Some(json!({"_id": "b9"})),
            }),
        )
        .await;

    let outcome = rig.flow.submit_new(valid_form()).await;
    assert_eq!(outcome, SubmitOutcome::Navigate(Route::Home));
    assert_eq!(rig.api.recorded_calls().await, vec!["create_blog".to_string()]);

    let alert = rig.alerts.current().await.unwrap();
    assert_eq!(alert.kind, AlertKind::Success);
    assert_eq!(alert.text.as_ref(), "Blog created successfully");
}

#[tokio::test]
async fn rejected_submission_stays_on_the_form_with_an_alert() {
    let rig = rig(logged_in()).await;
    rig.api
        .script(
            "create_blog",
            Err(ApiError::Rejected(ArcStr::from("Title already taken"))),
        )
        .await;

    let outcome = rig.flow.submit_new(valid_form()).await;
    assert_eq!(outcome, SubmitOutcome::Stayed);

    let alert = rig.alerts.current().await.unwrap();
    assert_eq!(alert.kind, AlertKind::Error);
    assert_eq!(alert.text.as_ref(), "Title already taken");
}

#[tokio::test]
async fn second_submit_while_in_flight_is_refused() {
    let rig = rig(logged_in()).await;
    rig.api.set_latency(Duration::from_millis(200)).await;
    rig.api
        .script(
            "create_blog",
            Ok(ApiResponse {
                success: true,
                message: ArcStr::from("Blog created successfully"),
                data: None,
            }),
        )
        .await;

    let flow = rig.flow.clone();
    let first = tokio::spawn(async move { flow.submit_new(valid_form()).await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rig.flow.is_submitting());
    assert_eq!(rig.flow.submit_new(valid_form()).await, SubmitOutcome::InFlight);

    assert_eq!(first.await.unwrap(), SubmitOutcome::Navigate(Route::Home));
    assert_eq!(rig.api.recorded_calls().await.len(), 1);
}

#[tokio::test]
async fn edit_updates_the_detail_entry_and_stales_the_lists() {
    let rig = rig(logged_in()).await;
    let detail = EntryKey::blog("b1");
    let list = EntryKey::blog_list(1);
    rig.cache
        .write(detail.clone(), json!({"_id": "b1", "title": "old"}), EntryStatus::Fulfilled)
        .await;
    rig.cache
        .write(list.clone(), json!([{"_id": "b1"}]), EntryStatus::Fulfilled)
        .await;
    rig.api
        .script(
            "update_blog:b1",
            Ok(ApiResponse {
                success: true,
                message: ArcStr::from("Blog updated successfully"),
                data: Some(json!({"_id": "b1", "title": "edited"})),
            }),
        )
        .await;

    let form = EditBlogForm {
        id: ArcStr::from("b1"),
        title: ArcStr::from("edited"),
        description: ArcStr::from("A description comfortably over twenty characters."),
        image: Some(ImageAttachment {
            filename: ArcStr::from("cover.webp"),
            bytes: vec![1, 2, 3],
        }),
    };
    let outcome = rig.flow.submit_edit(form).await;
    assert_eq!(outcome, SubmitOutcome::Navigate(Route::Home));

    let snapshot = rig.cache.peek(detail).await;
    assert_eq!(snapshot.value, Some(json!({"_id": "b1", "title": "edited"})));
    assert_eq!(rig.cache.peek(list).await.status, EntryStatus::Stale);
}
