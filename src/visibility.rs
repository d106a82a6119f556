use crate::{
    error::VisibilityError,
    graph::FollowGraph,
    models::{Post, UserId},
    repository::RepositoryState,
};

/// VisibilityGate
///
/// Decides whether a viewer may read an owner's posts. The only rule is the
/// follow edge `viewer -> owner`; there is no exemption for viewing your own
/// posts.
#[derive(Clone)]
pub struct VisibilityGate {
    graph: FollowGraph,
    repo: RepositoryState,
}

impl VisibilityGate {
    pub fn new(graph: FollowGraph, repo: RepositoryState) -> Self {
        Self { graph, repo }
    }

    pub async fn can_view(&self, viewer_id: UserId, owner_id: UserId) -> Result<bool, VisibilityError> {
        Ok(self.graph.follows(viewer_id, owner_id).await?)
    }

    /// list_visible_posts
    ///
    /// Checks run in this order: owner exists, viewer was supplied, viewer
    /// exists, viewer follows owner. Returns the owner's posts newest first.
    pub async fn list_visible_posts(
        &self,
        viewer_id: Option<UserId>,
        owner_id: UserId,
    ) -> Result<Vec<Post>, VisibilityError> {
        if self.repo.get_user(owner_id).await?.is_none() {
            return Err(VisibilityError::OwnerNotFound(owner_id));
        }

        let viewer_id = viewer_id.ok_or(VisibilityError::ViewerMissing)?;
        if self.repo.get_user(viewer_id).await?.is_none() {
            return Err(VisibilityError::ViewerNotFound(viewer_id));
        }

        if !self.can_view(viewer_id, owner_id).await? {
            tracing::debug!(viewer_id, owner_id, "post listing forbidden");
            return Err(VisibilityError::Forbidden);
        }

        Ok(self.repo.posts_by_user(owner_id).await?)
    }
}
