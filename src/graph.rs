use crate::{
    error::{GraphError, RepositoryResult},
    models::{FollowEdge, User, UserId},
    repository::{FollowInsert, RepositoryState},
};

/// Successful result of `FollowGraph::follow`.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowOutcome {
    Created(FollowEdge),
    /// The edge was already there; nothing changed.
    AlreadyFollowing,
}

/// Successful result of `FollowGraph::unfollow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnfollowOutcome {
    Removed,
    NotFollowing,
}

/// A followee's follower list together with its size.
#[derive(Debug, Clone, PartialEq)]
pub struct Followers {
    pub count: usize,
    pub followers: Vec<User>,
}

/// FollowGraph
///
/// Owns the directed `follower -> followee` edges and their invariants:
/// no self-edges and at most one edge per ordered pair. Storage atomicity is
/// delegated to `Repository::insert_follow`; this type decides what to ask for
/// and how to read the answer.
#[derive(Clone)]
pub struct FollowGraph {
    repo: RepositoryState,
}

impl FollowGraph {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// follow
    ///
    /// Creates the edge `follower_id -> followee_id`.
    ///
    /// A self-follow is rejected before the store is touched. Both users must
    /// exist. Repeating a follow is not an error and reports `AlreadyFollowing`.
    pub async fn follow(
        &self,
        follower_id: UserId,
        followee_id: UserId,
    ) -> Result<FollowOutcome, GraphError> {
        if follower_id == followee_id {
            tracing::debug!(user_id = follower_id, "self-follow rejected");
            return Err(GraphError::SelfFollowRejected);
        }

        match self.repo.insert_follow(follower_id, followee_id).await? {
            FollowInsert::Inserted(edge) => {
                tracing::info!(
                    follower_id,
                    followee_id,
                    edge_id = edge.id,
                    "follow edge created"
                );
                Ok(FollowOutcome::Created(edge))
            }
            FollowInsert::Exists => {
                tracing::debug!(follower_id, followee_id, "already following");
                Ok(FollowOutcome::AlreadyFollowing)
            }
            FollowInsert::FolloweeMissing => Err(GraphError::FolloweeNotFound(followee_id)),
            FollowInsert::FollowerMissing => Err(GraphError::FollowerNotFound(follower_id)),
        }
    }

    /// unfollow
    ///
    /// Removes the edge `follower_id -> followee_id`. Only the followee is
    /// resolved; the delete itself is by key, so an unknown follower simply
    /// reports `NotFollowing`.
    pub async fn unfollow(
        &self,
        follower_id: UserId,
        followee_id: UserId,
    ) -> Result<UnfollowOutcome, GraphError> {
        self.require_user(followee_id).await?;

        if self.repo.delete_follow(follower_id, followee_id).await? {
            tracing::info!(follower_id, followee_id, "follow edge removed");
            Ok(UnfollowOutcome::Removed)
        } else {
            Ok(UnfollowOutcome::NotFollowing)
        }
    }

    /// list_followers
    ///
    /// Fails with `FolloweeNotFound` before any edge is read.
    pub async fn list_followers(&self, followee_id: UserId) -> Result<Followers, GraphError> {
        self.require_user(followee_id).await?;

        let followers = self.repo.followers_of(followee_id).await?;
        Ok(Followers {
            count: followers.len(),
            followers,
        })
    }

    /// follows
    ///
    /// Pure edge lookup. Unknown ids have no edges, so they read as `false`.
    pub async fn follows(&self, follower_id: UserId, followee_id: UserId) -> RepositoryResult<bool> {
        self.repo.follows(follower_id, followee_id).await
    }

    async fn require_user(&self, id: UserId) -> Result<User, GraphError> {
        self.repo
            .get_user(id)
            .await?
            .ok_or(GraphError::FolloweeNotFound(id))
    }
}
