use crate::{
    error::RepositoryResult,
    models::{FollowEdge, NewUser, Post, User, UserId},
    repository::{FollowInsert, Repository},
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<UserId, User>,
    // Keyed (followee, follower) so a followee's edges form one contiguous range.
    edges: BTreeMap<(UserId, UserId), FollowEdge>,
    posts: Vec<Post>,
    next_user_id: i64,
    next_edge_id: i64,
    next_post_id: i64,
}

impl MemoryState {
    fn edges_of(&self, followee_id: UserId) -> impl Iterator<Item = &FollowEdge> {
        self.edges
            .range((followee_id, UserId::MIN)..=(followee_id, UserId::MAX))
            .map(|(_, edge)| edge)
    }
}

/// InMemoryRepository
///
/// A process-local `Repository` used when no `DATABASE_URL` is configured in
/// local mode, and by the test suite. Each mutation runs entirely under one
/// write lock, which gives the same atomicity `PostgresRepository` gets from its
/// transactions.
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        let mut state = self.state.write().await;
        state.next_user_id += 1;
        let created = User {
            id: state.next_user_id,
            name: user.name,
            age: user.age,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn update_user(&self, id: UserId, user: NewUser) -> RepositoryResult<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(&id).map(|existing| {
            existing.name = user.name;
            existing.age = user.age;
            existing.clone()
        }))
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state
            .edges
            .retain(|&(followee, follower), _| followee != id && follower != id);
        state.posts.retain(|post| post.user_id != id);
        Ok(true)
    }

    async fn insert_follow(
        &self,
        follower_id: UserId,
        followee_id: UserId,
    ) -> RepositoryResult<FollowInsert> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&followee_id) {
            return Ok(FollowInsert::FolloweeMissing);
        }
        if !state.users.contains_key(&follower_id) {
            return Ok(FollowInsert::FollowerMissing);
        }
        if state.edges.contains_key(&(followee_id, follower_id)) {
            return Ok(FollowInsert::Exists);
        }

        state.next_edge_id += 1;
        let edge = FollowEdge {
            id: state.next_edge_id,
            follower_id,
            followee_id,
            created_at: Utc::now(),
        };
        state.edges.insert((followee_id, follower_id), edge.clone());
        Ok(FollowInsert::Inserted(edge))
    }

    async fn delete_follow(
        &self,
        follower_id: UserId,
        followee_id: UserId,
    ) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.edges.remove(&(followee_id, follower_id)).is_some())
    }

    async fn follows(&self, follower_id: UserId, followee_id: UserId) -> RepositoryResult<bool> {
        let state = self.state.read().await;
        Ok(state.edges.contains_key(&(followee_id, follower_id)))
    }

    async fn followers_of(&self, followee_id: UserId) -> RepositoryResult<Vec<User>> {
        let state = self.state.read().await;
        let mut edges: Vec<&FollowEdge> = state.edges_of(followee_id).collect();
        edges.sort_by_key(|edge| edge.id);
        Ok(edges
            .into_iter()
            .filter_map(|edge| state.users.get(&edge.follower_id).cloned())
            .collect())
    }

    async fn append_post(&self, owner_id: UserId, text: String) -> RepositoryResult<Post> {
        let mut state = self.state.write().await;
        state.next_post_id += 1;
        let post = Post {
            id: state.next_post_id,
            user_id: owner_id,
            text,
            created_at: Utc::now(),
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn posts_by_user(&self, owner_id: UserId) -> RepositoryResult<Vec<Post>> {
        let state = self.state.read().await;
        let mut posts: Vec<Post> = state
            .posts
            .iter()
            .filter(|post| post.user_id == owner_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }
}
