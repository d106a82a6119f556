use social_api::{
    AppConfig, AppState, InMemoryRepository, create_router,
    models::{FollowersPerUserResponse, PostResponse, User},
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

async fn spawn_app() -> TestApp {
    let state = AppState::new(Arc::new(InMemoryRepository::new()), AppConfig::default());
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    async fn create_user(&self, name: &str, age: i32) -> User {
        let response = self
            .client
            .post(format!("{}/users", self.address))
            .json(&serde_json::json!({ "name": name, "age": age }))
            .send()
            .await
            .expect("create user request");
        assert_eq!(response.status(), 201);
        response.json().await.unwrap()
    }

    async fn follow(&self, follower: i64, followee: i64) -> reqwest::Response {
        self.client
            .put(format!("{}/users/{}/followers", self.address, followee))
            .json(&serde_json::json!({ "followerId": follower }))
            .send()
            .await
            .expect("follow request")
    }

    async fn list_posts(&self, owner: i64, viewer: i64) -> reqwest::Response {
        self.client
            .get(format!("{}/users/{}/posts", self.address, owner))
            .header("followerId", viewer.to_string())
            .send()
            .await
            .expect("list posts request")
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_follower_visibility_scenario() {
    let app = spawn_app().await;
    let u1 = app.create_user("Fulano", 30).await;
    let u2 = app.create_user("Cicrano", 31).await;
    let u3 = app.create_user("Beltrano", 40).await;

    // U2 follows U1.
    assert_eq!(app.follow(u2.id, u1.id).await.status(), 204);

    let followers: FollowersPerUserResponse = app
        .client
        .get(format!("{}/users/{}/followers", app.address, u1.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(followers.followers_count, 1);
    assert_eq!(followers.content[0].id, u2.id);

    // U1 posts.
    let created = app
        .client
        .post(format!("{}/users/{}/posts", app.address, u1.id))
        .json(&serde_json::json!({ "text": "Hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), 201);

    // The follower sees it.
    let response = app.list_posts(u1.id, u2.id).await;
    assert_eq!(response.status(), 200);
    let posts: Vec<PostResponse> = response.json().await.unwrap();
    let texts: Vec<String> = posts.into_iter().map(|p| p.text).collect();
    assert_eq!(texts, vec!["Hello".to_string()]);

    // An unrelated user does not.
    let forbidden = app.list_posts(u1.id, u3.id).await;
    assert_eq!(forbidden.status(), 403);
    assert_eq!(forbidden.text().await.unwrap(), "You can't see these posts");
}

#[tokio::test]
async fn test_follow_unknown_and_self() {
    let app = spawn_app().await;
    let u1 = app.create_user("Fulano", 30).await;

    assert_eq!(app.follow(u1.id, 9999).await.status(), 404);

    let conflict = app.follow(u1.id, u1.id).await;
    assert_eq!(conflict.status(), 409);
    assert_eq!(conflict.text().await.unwrap(), "You can't follow yourself");
}

#[tokio::test]
async fn test_deleted_user_loses_followers_and_posts() {
    let app = spawn_app().await;
    let u1 = app.create_user("Fulano", 30).await;
    let u2 = app.create_user("Cicrano", 31).await;
    assert_eq!(app.follow(u2.id, u1.id).await.status(), 204);

    let deleted = app
        .client
        .delete(format!("{}/users/{}", app.address, u2.id))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 204);

    let followers: FollowersPerUserResponse = app
        .client
        .get(format!("{}/users/{}/followers", app.address, u1.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(followers.followers_count, 0);

    // The deleted viewer is now unknown.
    assert_eq!(app.list_posts(u1.id, u2.id).await.status(), 400);
}
