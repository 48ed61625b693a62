use serde_json::json;

use crate::{
    ArcStr,
    log::Log,
    net::{Net, message::MockRequestKey, mock::Mock as NetMock},
    session::{MockData, Session},
};

use super::data::{ApiError, ApiResponse, Blog, User};
use super::BlogApi;

fn authed_session() -> Session {
    Session::mock(MockData {
        token: Some(ArcStr::from("token-1")),
        user_id: Some(ArcStr::from("u1")),
    })
}

fn spawn_api(net_mock: NetMock) -> BlogApi {
    BlogApi::spawn(
        Net::Mock(net_mock),
        authed_session(),
        ArcStr::from("http://api.test"),
        Log::Mock,
    )
}

#[test]
fn decode_success_envelope() {
    let raw = json!({
        "success": true,
        "message": "ok",
        "data": {"_id": "1"}
    })
    .to_string();

    let response = ApiResponse::decode(&raw).unwrap();
    assert_eq!(&*response.message, "ok");
    assert!(response.data.is_some());
}

#[test]
fn decode_rejection_envelope() {
    let raw = json!({"success": false, "message": "Blog not found!"}).to_string();
    let err = ApiResponse::decode(&raw).unwrap_err();
    assert_eq!(err, ApiError::Rejected(ArcStr::from("Blog not found!")));
}

#[test]
fn decode_garbage_is_transport_error() {
    assert!(matches!(
        ApiResponse::decode("<html>oops</html>"),
        Err(ApiError::Transport(_))
    ));
}

#[test]
fn blog_model_decodes_from_envelope_data() {
    let data = json!({
        "_id": "42",
        "title": "A title here",
        "description": "Some description long enough.",
        "categoryId": "c1",
        "userId": "u1",
        "blogImage": null
    });

    let blog: Blog = serde_json::from_value(data).unwrap();
    assert_eq!(&*blog.id, "42");
    assert!(blog.blog_image.is_none());
}

#[tokio::test]
async fn get_blog_hits_the_expected_url() {
    let net = NetMock::empty();
    net.script(
        MockRequestKey::get(ArcStr::from("http://api.test/blogs/42")),
        Ok(ArcStr::from(
            json!({"success": true, "message": "ok", "data": {"_id": "42"}})
                .to_string()
                .as_str(),
        )),
    )
    .await;

    let api = spawn_api(net.clone());
    let response = api.get_blog(ArcStr::from("42")).await.unwrap();
    assert!(response.success);

    let requests = net.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(&*requests[0].url, "http://api.test/blogs/42");
}

#[tokio::test]
async fn current_user_decodes_saved_blogs() {
    let net = NetMock::empty();
    net.script(
        MockRequestKey::get(ArcStr::from("http://api.test/users/me")),
        Ok(ArcStr::from(
            json!({
                "success": true,
                "message": "ok",
                "data": {
                    "_id": "u1",
                    "name": "Ada",
                    "email": "ada@example.test",
                    "savedBlogs": ["42"]
                }
            })
            .to_string()
            .as_str(),
        )),
    )
    .await;

    let api = spawn_api(net);
    let response = api.current_user().await.unwrap();
    let user: User = serde_json::from_value(response.data.unwrap()).unwrap();
    assert_eq!(user.saved_blogs, vec![ArcStr::from("42")]);
}

#[tokio::test]
async fn transport_failure_maps_to_transport_error() {
    let net = NetMock::empty();
    net.script(
        MockRequestKey::get(ArcStr::from("http://api.test/categories")),
        Err(ArcStr::from("connection refused")),
    )
    .await;

    let api = spawn_api(net);
    assert!(matches!(
        api.list_categories().await,
        Err(ApiError::Transport(_))
    ));
}

#[tokio::test]
async fn mock_api_records_calls() {
    let api = BlogApi::mock_empty();
    let _ = api.get_blog(ArcStr::from("42")).await;
    assert_eq!(api.recorded_calls().await, vec!["get_blog:42".to_string()]);
}
