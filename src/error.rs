use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::{ResponseError, UserId};

/// Failures raised by a `Repository` implementation.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Rejections produced by the follow graph.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("You can't follow yourself")]
    SelfFollowRejected,

    #[error("User {0} not found")]
    FolloweeNotFound(UserId),

    #[error("Follower {0} not found")]
    FollowerNotFound(UserId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Rejections produced by the visibility gate.
#[derive(Error, Debug)]
pub enum VisibilityError {
    #[error("User {0} not found")]
    OwnerNotFound(UserId),

    #[error("You forgot the header followerId")]
    ViewerMissing,

    #[error("Inexistent followerId")]
    ViewerNotFound(UserId),

    #[error("You can't see these posts")]
    Forbidden,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// ApiError
///
/// The transport-level error taxonomy. Every handler returns `Result<_, ApiError>`
/// and the `IntoResponse` impl owns the status code mapping.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Validation Error")]
    Validation(ResponseError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::SelfFollowRejected => ApiError::Conflict(err.to_string()),
            GraphError::FolloweeNotFound(_) | GraphError::FollowerNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            GraphError::Repository(e) => ApiError::Repository(e),
        }
    }
}

impl From<VisibilityError> for ApiError {
    fn from(err: VisibilityError) -> Self {
        match err {
            VisibilityError::OwnerNotFound(_) => ApiError::NotFound(err.to_string()),
            VisibilityError::ViewerMissing | VisibilityError::ViewerNotFound(_) => {
                ApiError::BadRequest(err.to_string())
            }
            VisibilityError::Forbidden => ApiError::Forbidden(err.to_string()),
            VisibilityError::Repository(e) => ApiError::Repository(e),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(ResponseError::from_validation(&errors))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(body) => (status, Json(body)).into_response(),
            ApiError::Repository(e) => {
                // Store details stay in the logs.
                tracing::error!("repository failure: {:?}", e);
                (status, "Internal Server Error").into_response()
            }
            other => (status, other.to_string()).into_response(),
        }
    }
}
