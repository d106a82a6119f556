use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

/// Store-assigned user identifier.
pub type UserId = i64;

// --- Core Schemas (Mapped to Database) ---

/// User
///
/// Canonical identity record from the `users` table. The follow graph only cares
/// that a user exists; name and age are profile data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub age: i32,
}

/// FollowEdge
///
/// A directed `follower -> followee` row from the `follows` table.
/// Unique per pair and never self-referencing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FollowEdge {
    pub id: i64,
    pub follower_id: UserId,
    pub followee_id: UserId,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Post
///
/// A post row from the `posts` table. Listed newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Post {
    pub id: i64,
    pub user_id: UserId,
    pub text: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateUserRequest
///
/// Input payload for `POST /users` and `PUT /users/{id}`.
/// Both fields are optional at the JSON level so that missing values surface as
/// 422 validation errors instead of deserialization rejections.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CreateUserRequest {
    #[validate(
        required(message = "Name is Required"),
        length(min = 1, message = "Name is Required")
    )]
    #[schema(example = "Fulano")]
    pub name: Option<String>,

    #[validate(
        required(message = "Age is Required"),
        range(min = 0, message = "Age must not be negative")
    )]
    #[schema(example = 30)]
    pub age: Option<i32>,
}

impl CreateUserRequest {
    /// Trims the name so a whitespace-only value counts as blank.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|name| name.trim().to_string());
        self
    }
}

/// Validated form of `CreateUserRequest` handed to the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub age: i32,
}

/// FollowerRequest
///
/// Body of `PUT /users/{userId}/followers`: who starts following `userId`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FollowerRequest {
    pub follower_id: UserId,
}

/// CreatePostRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreatePostRequest {
    #[schema(example = "Hello")]
    pub text: String,
}

// --- Response Schemas (Output) ---

/// FollowerResponse
///
/// One entry of a follower listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FollowerResponse {
    pub id: UserId,
    pub name: String,
}

impl From<User> for FollowerResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

/// FollowersPerUserResponse
///
/// Output of `GET /users/{userId}/followers`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FollowersPerUserResponse {
    pub followers_count: usize,
    pub content: Vec<FollowerResponse>,
}

/// PostResponse
///
/// A post as exposed to followers. `created_at` is sent as `dateTime`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PostResponse {
    pub id: i64,
    pub text: String,
    #[ts(type = "string")]
    pub date_time: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            text: post.text,
            date_time: post.created_at,
        }
    }
}

/// FieldError
///
/// A single violated constraint inside a validation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// ResponseError
///
/// Body of every 422 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ResponseError {
    pub message: String,
    pub errors: Vec<FieldError>,
}

impl ResponseError {
    pub const VALIDATION_MESSAGE: &'static str = "Validation Error";

    /// Flattens `validator` output into one entry per violated constraint,
    /// sorted by field name so responses are stable.
    pub fn from_validation(errors: &validator::ValidationErrors) -> Self {
        let mut field_errors: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, violations)| {
                violations.iter().map(move |violation| FieldError {
                    field: field.to_string(),
                    message: violation
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| violation.code.to_string()),
                })
            })
            .collect();
        field_errors.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));
        field_errors.dedup();

        Self {
            message: Self::VALIDATION_MESSAGE.to_string(),
            errors: field_errors,
        }
    }
}
