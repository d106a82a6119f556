use crate::{
    error::RepositoryResult,
    models::{FollowEdge, NewUser, Post, User, UserId},
};
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// Result of an attempted edge insert, decided atomically by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowInsert {
    Inserted(FollowEdge),
    /// The pair already had an edge; nothing was written.
    Exists,
    FolloweeMissing,
    FollowerMissing,
}

/// Repository Trait
///
/// The narrow persistence contract consumed by the follow graph, the visibility
/// gate and the user/post handlers. It covers three collaborators: the identity
/// store, follow-edge storage and the post ledger.
///
/// Every mutating method is its own transaction boundary. In particular
/// `insert_follow` must resolve both users, check for an existing edge and insert
/// as one atomic step, so concurrent callers on the same pair can never create
/// two edges.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Identity Store ---
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User>;
    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>>;
    async fn list_users(&self) -> RepositoryResult<Vec<User>>;
    // Returns None when the user does not exist.
    async fn update_user(&self, id: UserId, user: NewUser) -> RepositoryResult<Option<User>>;
    /// Deletes the user together with every edge and post referencing it.
    async fn delete_user(&self, id: UserId) -> RepositoryResult<bool>;

    // --- Follow Edges ---
    async fn insert_follow(
        &self,
        follower_id: UserId,
        followee_id: UserId,
    ) -> RepositoryResult<FollowInsert>;
    // Idempotent: returns true only if an edge was removed.
    async fn delete_follow(&self, follower_id: UserId, followee_id: UserId)
    -> RepositoryResult<bool>;
    async fn follows(&self, follower_id: UserId, followee_id: UserId) -> RepositoryResult<bool>;
    /// Users following `followee_id`, in the order they started following.
    async fn followers_of(&self, followee_id: UserId) -> RepositoryResult<Vec<User>>;

    // --- Post Ledger ---
    async fn append_post(&self, owner_id: UserId, text: String) -> RepositoryResult<Post>;
    /// Posts of `owner_id`, most recent first.
    async fn posts_by_user(&self, owner_id: UserId) -> RepositoryResult<Vec<Post>>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
