use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use social_api::{AppConfig, AppState, InMemoryRepository, create_router, models::User};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    create_router(AppState::new(
        Arc::new(InMemoryRepository::new()),
        AppConfig::default(),
    ))
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_and_request_id() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_openapi_document_lists_follower_routes() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["paths"]["/users/{userId}/followers"].is_object());
    assert!(doc["paths"]["/users/{userId}/posts"].is_object());
}

#[tokio::test]
async fn test_create_user_validation_is_422() {
    let response = app()
        .oneshot(json_request("POST", "/users", serde_json::json!({ "age": 30 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Validation Error");
    assert_eq!(body["errors"][0]["field"], "name");
    assert_eq!(body["errors"][0]["message"], "Name is Required");
}

#[tokio::test]
async fn test_follow_flow_through_router() {
    let app = app();

    let mut ids = Vec::new();
    for (name, age) in [("Fulano", 30), ("Cicrano", 31)] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users",
                serde_json::json!({ "name": name, "age": age }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let user: User = serde_json::from_value(body_json(response).await).unwrap();
        ids.push(user.id);
    }
    let (u1, u2) = (ids[0], ids[1]);

    let follow = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/users/{}/followers", u1),
            serde_json::json!({ "followerId": u2 }),
        ))
        .await
        .unwrap();
    assert_eq!(follow.status(), StatusCode::NO_CONTENT);

    let list = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/users/{}/followers", u1))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(list.status(), StatusCode::OK);
    let body = body_json(list).await;
    assert_eq!(body["followersCount"], 1);
    assert_eq!(body["content"][0]["id"], u2);

    let unfollow = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/users/{}/followers?followerId={}", u1, u2))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(unfollow.status(), StatusCode::NO_CONTENT);

    let posts = app
        .oneshot(
            Request::builder()
                .uri(format!("/users/{}/posts", u1))
                .header("followerId", u2.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(posts.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_self_follow_is_409() {
    let app = app();
    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users",
            serde_json::json!({ "name": "Fulano", "age": 30 }),
        ))
        .await
        .unwrap();
    let user: User = serde_json::from_value(body_json(created).await).unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/users/{}/followers", user.id),
            serde_json::json!({ "followerId": user.id }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}
