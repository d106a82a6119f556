use crate::{
    error::RepositoryResult,
    models::{FollowEdge, NewUser, Post, User, UserId},
    repository::{FollowInsert, Repository},
};
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Schema lives in `migrations/`; the `follows` table carries the
/// `UNIQUE (follower_id, followee_id)` and `CHECK (follower_id <> followee_id)`
/// constraints that back the graph invariants at the storage level.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// migrate
    ///
    /// Applies the embedded migrations. Safe to call on every startup.
    pub async fn migrate(&self) -> RepositoryResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, age) VALUES ($1, $2) RETURNING id, name, age",
        )
        .bind(user.name)
        .bind(user.age)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, age FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, name, age FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn update_user(&self, id: UserId, user: NewUser) -> RepositoryResult<Option<User>> {
        let updated = sqlx::query_as::<_, User>(
            "UPDATE users SET name = $2, age = $3 WHERE id = $1 RETURNING id, name, age",
        )
        .bind(id)
        .bind(user.name)
        .bind(user.age)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    /// delete_user
    ///
    /// Edges and posts go with the user through `ON DELETE CASCADE`.
    async fn delete_user(&self, id: UserId) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// insert_follow
    ///
    /// Runs in a single transaction. Both user rows are locked `FOR SHARE` so
    /// neither can be deleted before the edge lands, and the insert uses
    /// `ON CONFLICT DO NOTHING` against the pair's unique constraint. A concurrent
    /// caller that loses the race sees no returned row and reports `Exists`.
    async fn insert_follow(
        &self,
        follower_id: UserId,
        followee_id: UserId,
    ) -> RepositoryResult<FollowInsert> {
        let mut tx = self.pool.begin().await?;

        let followee = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1 FOR SHARE")
            .bind(followee_id)
            .fetch_optional(&mut *tx)
            .await?;
        if followee.is_none() {
            tx.rollback().await?;
            return Ok(FollowInsert::FolloweeMissing);
        }

        let follower = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1 FOR SHARE")
            .bind(follower_id)
            .fetch_optional(&mut *tx)
            .await?;
        if follower.is_none() {
            tx.rollback().await?;
            return Ok(FollowInsert::FollowerMissing);
        }

        let edge = sqlx::query_as::<_, FollowEdge>(
            r#"
            INSERT INTO follows (follower_id, followee_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            RETURNING id, follower_id, followee_id, created_at
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(match edge {
            Some(edge) => FollowInsert::Inserted(edge),
            None => FollowInsert::Exists,
        })
    }

    async fn delete_follow(
        &self,
        follower_id: UserId,
        followee_id: UserId,
    ) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
            .bind(follower_id)
            .bind(followee_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn follows(&self, follower_id: UserId, followee_id: UserId) -> RepositoryResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = $1 AND followee_id = $2)",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn followers_of(&self, followee_id: UserId) -> RepositoryResult<Vec<User>> {
        let followers = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.age
            FROM follows f
            JOIN users u ON u.id = f.follower_id
            WHERE f.followee_id = $1
            ORDER BY f.id
            "#,
        )
        .bind(followee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(followers)
    }

    async fn append_post(&self, owner_id: UserId, text: String) -> RepositoryResult<Post> {
        let post = sqlx::query_as::<_, Post>(
            "INSERT INTO posts (user_id, text) VALUES ($1, $2) RETURNING id, user_id, text, created_at",
        )
        .bind(owner_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;
        Ok(post)
    }

    async fn posts_by_user(&self, owner_id: UserId) -> RepositoryResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, text, created_at
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }
}
