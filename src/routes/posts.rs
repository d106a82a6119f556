use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Posts Router Module
pub fn post_routes() -> Router<AppState> {
    Router::new()
        // POST /users/{userId}/posts
        // Appends a post. Anyone may post as an existing user.
        // GET /users/{userId}/posts (header: followerId)
        // Lists posts newest first, only for viewers that follow `userId`.
        .route(
            "/users/{userId}/posts",
            post(handlers::create_post).get(handlers::list_posts),
        )
}
