//! Postgres-backed repository tests. They need a reachable database:
//! `DATABASE_URL=postgres://... cargo test -- --ignored`

use social_api::{
    PostgresRepository,
    models::{NewUser, UserId},
    repository::{FollowInsert, Repository},
};
use sqlx::PgPool;
use std::sync::Arc;

// --- Test Context and Setup ---

struct DbTestContext {
    repo: Arc<PostgresRepository>,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");
        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        let repo = PostgresRepository::new(pool);
        repo.migrate().await.expect("Failed to run database migrations.");

        DbTestContext {
            repo: Arc::new(repo),
        }
    }

    async fn user(&self, name: &str) -> UserId {
        self.repo
            .create_user(NewUser {
                name: name.to_string(),
                age: 30,
            })
            .await
            .expect("Failed to create test user")
            .id
    }
}

// --- Tests ---

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_follow_is_unique_per_pair() {
    let ctx = DbTestContext::setup().await;
    let u1 = ctx.user("Fulano").await;
    let u2 = ctx.user("Cicrano").await;

    let first = ctx.repo.insert_follow(u2, u1).await.unwrap();
    let second = ctx.repo.insert_follow(u2, u1).await.unwrap();

    assert!(matches!(first, FollowInsert::Inserted(ref edge) if edge.follower_id == u2));
    assert_eq!(second, FollowInsert::Exists);
    assert!(ctx.repo.follows(u2, u1).await.unwrap());
    assert_eq!(ctx.repo.followers_of(u1).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_follow_reports_missing_users() {
    let ctx = DbTestContext::setup().await;
    let u1 = ctx.user("Fulano").await;

    assert_eq!(
        ctx.repo.insert_follow(u1, i64::MAX).await.unwrap(),
        FollowInsert::FolloweeMissing
    );
    assert_eq!(
        ctx.repo.insert_follow(i64::MAX, u1).await.unwrap(),
        FollowInsert::FollowerMissing
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_inserts_create_one_edge() {
    let ctx = DbTestContext::setup().await;
    let u1 = ctx.user("Fulano").await;
    let u2 = ctx.user("Cicrano").await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let repo = ctx.repo.clone();
            tokio::spawn(async move { repo.insert_follow(u2, u1).await })
        })
        .collect();

    let mut inserted = 0;
    for handle in handles {
        if let FollowInsert::Inserted(_) = handle.await.unwrap().unwrap() {
            inserted += 1;
        }
    }

    assert_eq!(inserted, 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_posts_are_newest_first_and_cascade_on_delete() {
    let ctx = DbTestContext::setup().await;
    let owner = ctx.user("Owner").await;
    let follower = ctx.user("Follower").await;
    ctx.repo.insert_follow(follower, owner).await.unwrap();

    ctx.repo.append_post(owner, "first".to_string()).await.unwrap();
    ctx.repo.append_post(owner, "second".to_string()).await.unwrap();

    let texts: Vec<String> = ctx
        .repo
        .posts_by_user(owner)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.text)
        .collect();
    assert_eq!(texts, vec!["second".to_string(), "first".to_string()]);

    assert!(ctx.repo.delete_user(owner).await.unwrap());
    assert!(ctx.repo.posts_by_user(owner).await.unwrap().is_empty());
    assert!(!ctx.repo.follows(follower, owner).await.unwrap());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_follow_is_idempotent() {
    let ctx = DbTestContext::setup().await;
    let u1 = ctx.user("Fulano").await;
    let u2 = ctx.user("Cicrano").await;
    ctx.repo.insert_follow(u2, u1).await.unwrap();

    assert!(ctx.repo.delete_follow(u2, u1).await.unwrap());
    assert!(!ctx.repo.delete_follow(u2, u1).await.unwrap());
}
