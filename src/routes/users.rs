use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Users Router Module
///
/// Identity store endpoints. Deleting a user cascades to every follow edge and
/// post that references it.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /users
        // Creates a user; 422 with field errors on invalid input.
        // GET /users
        // Lists every user.
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        // PUT/DELETE /users/{userId}
        .route(
            "/users/{userId}",
            put(handlers::update_user).delete(handlers::delete_user),
        )
}
