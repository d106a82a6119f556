use crate::{AppState, handlers};
use axum::{Router, routing::put};

/// Followers Router Module
///
/// All three verbs share `/users/{userId}/followers`:
/// - PUT: `followerId` (JSON body) starts following `userId`. Self-follow is a 409.
/// - GET: lists who follows `userId`, with a count.
/// - DELETE: `followerId` (query) stops following `userId`. Idempotent.
pub fn follower_routes() -> Router<AppState> {
    Router::new().route(
        "/users/{userId}/followers",
        put(handlers::follow_user)
            .get(handlers::list_followers)
            .delete(handlers::unfollow_user),
    )
}
