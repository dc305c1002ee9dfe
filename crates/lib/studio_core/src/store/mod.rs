//! Storage traits and their backends.
//!
//! The services in `auth` and `catalog` only talk to these traits.
//! `PgStore` is the production backend; `MemoryStore` keeps everything in
//! process and backs the tests and the `--in-memory` server mode.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::auth::{NewUser, SessionRecord, User, UserWithPassword};
use crate::models::catalog::{DanceClass, NewDanceClass, NewReview, Review};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was hit; carries the offending field.
    #[error("{0} already exists")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Result type for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence for user accounts.
///
/// Every write is atomic per call. `create` must reject a duplicate email
/// or username with `StoreError::Duplicate` even under concurrent inserts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new_user: NewUser) -> StoreResult<User>;

    async fn find_by_id(&self, user_id: &str) -> StoreResult<Option<UserWithPassword>>;

    /// Lookup by normalised email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserWithPassword>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserWithPassword>>;

    /// Set `confirmed = true`. Idempotent; returns `false` if no such user.
    async fn mark_confirmed(&self, user_id: &str) -> StoreResult<bool>;

    async fn touch_last_seen(&self, user_id: &str, at: DateTime<Utc>) -> StoreResult<()>;
}

/// Persistence for login sessions, keyed by token hash.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, record: SessionRecord) -> StoreResult<()>;

    /// Find a session that has not expired at `now`.
    async fn find_active_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<SessionRecord>>;

    async fn delete_session(&self, token_hash: &str) -> StoreResult<()>;

    /// Drop every session that expired before `now`. Returns how many went.
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}

/// Persistence for dance classes and their reviews.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_classes(&self) -> StoreResult<Vec<DanceClass>>;

    async fn find_class(&self, class_id: i64) -> StoreResult<Option<DanceClass>>;

    async fn create_class(&self, new_class: NewDanceClass) -> StoreResult<DanceClass>;

    async fn list_reviews(&self, class_id: i64) -> StoreResult<Vec<Review>>;

    async fn create_review(&self, new_review: NewReview) -> StoreResult<Review>;

    /// Delete a review belonging to `class_id`. Returns `false` if none matched.
    async fn delete_review(&self, class_id: i64, review_id: i64) -> StoreResult<bool>;

    async fn count_reviews_by_user(&self, user_id: &str) -> StoreResult<i64>;
}
