use crate::{
    AppState,
    error::{ApiError, GraphError},
    graph::{FollowOutcome, UnfollowOutcome},
    models::{
        CreatePostRequest, CreateUserRequest, FollowerRequest, FollowerResponse,
        FollowersPerUserResponse, NewUser, PostResponse, ResponseError, User, UserId,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, StatusCode},
};
use serde::Deserialize;
use validator::Validate;

/// Header carrying the viewer id on `GET /users/{userId}/posts`.
pub const FOLLOWER_ID_HEADER: HeaderName = HeaderName::from_static("followerid");

/// UnfollowParams
///
/// Query parameters of `DELETE /users/{userId}/followers`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct UnfollowParams {
    /// The user who stops following `userId`.
    pub follower_id: Option<UserId>,
}

/// Runs `validator` rules and converts the request into a `NewUser`.
fn validated(payload: CreateUserRequest) -> Result<NewUser, ApiError> {
    let payload = payload.normalized();
    payload.validate()?;
    match (payload.name, payload.age) {
        (Some(name), Some(age)) => Ok(NewUser { name, age }),
        // validate() has already rejected missing fields.
        _ => Err(ApiError::Validation(ResponseError {
            message: ResponseError::VALIDATION_MESSAGE.to_string(),
            errors: vec![],
        })),
    }
}

/// Reads the optional `followerId` header. A present but non-numeric value is a 400.
fn viewer_from_headers(headers: &HeaderMap) -> Result<Option<UserId>, ApiError> {
    match headers.get(&FOLLOWER_ID_HEADER) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<UserId>().ok())
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest("Invalid followerId header".to_string())),
    }
}

// --- Users ---

/// create_user
///
/// Registers a new user. Returns 422 with the violated constraints when the name
/// is blank or the age is missing or negative.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 422, description = "Validation Error", body = ResponseError)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let new_user = validated(payload)?;
    let user = state.repo.create_user(new_user).await?;
    tracing::info!(user_id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "All users", body = [User]))
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.repo.list_users().await?))
}

/// update_user
///
/// Replaces name and age of an existing user.
#[utoipa::path(
    put,
    path = "/users/{userId}",
    params(("userId" = i64, Path, description = "User ID")),
    request_body = CreateUserRequest,
    responses(
        (status = 204, description = "Updated"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation Error", body = ResponseError)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<StatusCode, ApiError> {
    let new_user = validated(payload)?;
    match state.repo.update_user(id, new_user).await? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::NotFound(format!("User {} not found", id))),
    }
}

/// delete_user
///
/// The user's follow edges (both directions) and posts are removed with it.
#[utoipa::path(
    delete,
    path = "/users/{userId}",
    params(("userId" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<StatusCode, ApiError> {
    if state.repo.delete_user(id).await? {
        tracing::info!(user_id = id, "user deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("User {} not found", id)))
    }
}

// --- Followers ---

/// follow_user
///
/// Makes `followerId` follow `userId`. Following twice is a no-op and still
/// answers 204.
#[utoipa::path(
    put,
    path = "/users/{userId}/followers",
    params(("userId" = i64, Path, description = "User to follow")),
    request_body = FollowerRequest,
    responses(
        (status = 204, description = "Following"),
        (status = 404, description = "User or follower not found"),
        (status = 409, description = "Self-follow")
    )
)]
pub async fn follow_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(payload): Json<FollowerRequest>,
) -> Result<StatusCode, ApiError> {
    match state.graph.follow(payload.follower_id, user_id).await? {
        FollowOutcome::Created(_) | FollowOutcome::AlreadyFollowing => Ok(StatusCode::NO_CONTENT),
    }
}

#[utoipa::path(
    get,
    path = "/users/{userId}/followers",
    params(("userId" = i64, Path, description = "Followed user")),
    responses(
        (status = 200, description = "Followers", body = FollowersPerUserResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn list_followers(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<FollowersPerUserResponse>, ApiError> {
    let followers = state.graph.list_followers(user_id).await?;
    Ok(Json(FollowersPerUserResponse {
        followers_count: followers.count,
        content: followers
            .followers
            .into_iter()
            .map(FollowerResponse::from)
            .collect(),
    }))
}

/// unfollow_user
///
/// Deletes the edge `followerId -> userId` if it exists. Only `userId` is
/// checked for existence.
#[utoipa::path(
    delete,
    path = "/users/{userId}/followers",
    params(("userId" = i64, Path, description = "Followed user"), UnfollowParams),
    responses(
        (status = 204, description = "Not following anymore"),
        (status = 400, description = "followerId missing"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn unfollow_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(params): Query<UnfollowParams>,
) -> Result<StatusCode, ApiError> {
    let Some(follower_id) = params.follower_id else {
        if state.repo.get_user(user_id).await?.is_none() {
            return Err(GraphError::FolloweeNotFound(user_id).into());
        }
        return Err(ApiError::BadRequest(
            "You forgot the query parameter followerId".to_string(),
        ));
    };

    match state.graph.unfollow(follower_id, user_id).await? {
        UnfollowOutcome::Removed | UnfollowOutcome::NotFollowing => Ok(StatusCode::NO_CONTENT),
    }
}

// --- Posts ---

/// create_post
///
/// Appends a post for `userId`. Not gated by the follow graph.
#[utoipa::path(
    post,
    path = "/users/{userId}/posts",
    params(("userId" = i64, Path, description = "Author")),
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = PostResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    if state.repo.get_user(user_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("User {} not found", user_id)));
    }
    let post = state.repo.append_post(user_id, payload.text).await?;
    tracing::debug!(user_id, post_id = post.id, "post created");
    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// list_posts
///
/// Lists `userId`'s posts, newest first, for the viewer named in the
/// `followerId` header. The viewer must follow `userId`.
#[utoipa::path(
    get,
    path = "/users/{userId}/posts",
    params(
        ("userId" = i64, Path, description = "Author"),
        ("followerId" = Option<i64>, Header, description = "Viewer")
    ),
    responses(
        (status = 200, description = "Posts", body = [PostResponse]),
        (status = 400, description = "followerId missing or unknown"),
        (status = 403, description = "Not a follower"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    headers: HeaderMap,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let viewer_id = viewer_from_headers(&headers)?;
    let posts = state.gate.list_visible_posts(viewer_id, user_id).await?;
    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}
