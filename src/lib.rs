use axum::{Router, extract::FromRef, http::HeaderName};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core: follow graph and visibility gate.
pub mod graph;
pub mod visibility;

// Collaborators and plumbing.
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// One router per resource.
pub mod routes;
use routes::{followers, posts, users};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use graph::FollowGraph;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use visibility::VisibilityGate;

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the
/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_user, handlers::list_users, handlers::update_user,
        handlers::delete_user, handlers::follow_user, handlers::list_followers,
        handlers::unfollow_user, handlers::create_post, handlers::list_posts
    ),
    components(
        schemas(
            models::User, models::Post, models::FollowEdge, models::CreateUserRequest,
            models::FollowerRequest, models::CreatePostRequest, models::FollowerResponse,
            models::FollowersPerUserResponse, models::PostResponse, models::FieldError,
            models::ResponseError,
        )
    ),
    tags(
        (name = "social-api", description = "Users, followers and follower-only posts")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, cloneable container shared by every request: the repository, the
/// two core components built on top of it, and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub graph: FollowGraph,
    pub gate: VisibilityGate,
    pub config: AppConfig,
}

impl AppState {
    /// Wires the follow graph and the visibility gate over one repository.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let graph = FollowGraph::new(repo.clone());
        let gate = VisibilityGate::new(graph.clone(), repo.clone());
        Self {
            repo,
            graph,
            gate,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for FollowGraph {
    fn from_ref(app_state: &AppState) -> FollowGraph {
        app_state.graph.clone()
    }
}

impl FromRef<AppState> for VisibilityGate {
    fn from_ref(app_state: &AppState) -> VisibilityGate {
        app_state.gate.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies the observability layers and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(users::user_routes())
        .merge(followers::follower_routes())
        .merge(posts::post_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                // Generates a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Echoes x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span so every log line of a request carries its
/// method, uri and `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
