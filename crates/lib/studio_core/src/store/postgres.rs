//! PostgreSQL storage backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{CatalogStore, SessionStore, StoreError, StoreResult, UserStore};
use crate::auth::roles::Role;
use crate::models::auth::{NewUser, SessionRecord, User, UserWithPassword};
use crate::models::catalog::{DanceClass, NewDanceClass, NewReview, Review};

const USER_COLUMNS: &str = "id::text AS id, email, username, password_hash, role, confirmed, \
                            member_since, last_seen";

const CLASS_SELECT: &str = "SELECT c.id, c.title, c.description, c.duration_minutes, c.category, \
                            c.trainer_id::text AS trainer_id, u.username AS trainer_name, \
                            c.video_path, c.created_at \
                            FROM dance_classes c JOIN users u ON u.id = c.trainer_id";

const REVIEW_SELECT: &str = "SELECT r.id, r.class_id, r.user_id::text AS user_id, \
                             u.username AS author, r.rating, r.comments, r.created_at \
                             FROM reviews r JOIN users u ON u.id = r.user_id";

/// Storage backed by a PostgreSQL pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    username: String,
    password_hash: String,
    role: String,
    confirmed: bool,
    member_since: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserWithPassword {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| StoreError::Db(sqlx::Error::Decode(Box::new(e))))?;
        Ok(UserWithPassword {
            user: User {
                id: row.id,
                email: row.email,
                username: row.username,
                role,
                confirmed: row.confirmed,
                member_since: row.member_since,
                last_seen: row.last_seen,
            },
            password_hash: row.password_hash,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ClassRow {
    id: i64,
    title: String,
    description: String,
    duration_minutes: i32,
    category: i16,
    trainer_id: String,
    trainer_name: String,
    video_path: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ClassRow> for DanceClass {
    fn from(row: ClassRow) -> Self {
        DanceClass {
            id: row.id,
            title: row.title,
            description: row.description,
            duration_minutes: row.duration_minutes,
            category: row.category,
            trainer_id: row.trainer_id,
            trainer_name: row.trainer_name,
            video_path: row.video_path,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    class_id: i64,
    user_id: String,
    author: String,
    rating: i16,
    comments: String,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            class_id: row.class_id,
            user_id: row.user_id,
            author: row.author,
            rating: row.rating,
            comments: row.comments,
            created_at: row.created_at,
        }
    }
}

/// Map a unique-constraint violation on `users` to `StoreError::Duplicate`.
fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e
        && db.is_unique_violation()
    {
        let field = match db.constraint() {
            Some("users_username_key") => "username",
            _ => "email",
        };
        return StoreError::Duplicate(field.to_string());
    }
    StoreError::Db(e)
}

/// Ids that are not UUIDs can never match a row.
fn is_uuid(id: &str) -> bool {
    uuid::Uuid::parse_str(id).is_ok()
}

impl PgStore {
    async fn find_user_where(
        &self,
        predicate: &str,
        value: &str,
    ) -> StoreResult<Option<UserWithPassword>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserWithPassword::try_from).transpose()
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (email, username, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&new_user.email)
            .bind(&new_user.username)
            .bind(&new_user.password_hash)
            .bind(new_user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_error)?;
        Ok(UserWithPassword::try_from(row)?.user)
    }

    async fn find_by_id(&self, user_id: &str) -> StoreResult<Option<UserWithPassword>> {
        if !is_uuid(user_id) {
            return Ok(None);
        }
        self.find_user_where("id = $1::uuid", user_id).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserWithPassword>> {
        self.find_user_where("email = $1", email).await
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserWithPassword>> {
        self.find_user_where("username = $1", username).await
    }

    async fn mark_confirmed(&self, user_id: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET confirmed = TRUE WHERE id = $1::uuid")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn touch_last_seen(&self, user_id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query("UPDATE users SET last_seen = $2 WHERE id = $1::uuid")
            .bind(user_id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn insert_session(&self, record: SessionRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO sessions (id, token_hash, user_id, remember, created_at, expires_at) \
             VALUES ($1::uuid, $2, $3::uuid, $4, $5, $6)",
        )
        .bind(&record.id)
        .bind(&record.token_hash)
        .bind(&record.user_id)
        .bind(record.remember)
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_active_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, (String, String, bool, DateTime<Utc>, DateTime<Utc>)>(
            "SELECT id::text, user_id::text, remember, created_at, expires_at \
             FROM sessions \
             WHERE token_hash = $1 AND expires_at > $2",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(
            |(id, user_id, remember, created_at, expires_at)| SessionRecord {
                id,
                token_hash: token_hash.to_string(),
                user_id,
                remember,
                created_at,
                expires_at,
            },
        ))
    }

    async fn delete_session(&self, token_hash: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_classes(&self) -> StoreResult<Vec<DanceClass>> {
        let sql = format!("{CLASS_SELECT} ORDER BY c.created_at DESC, c.id DESC");
        let rows = sqlx::query_as::<_, ClassRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(DanceClass::from).collect())
    }

    async fn find_class(&self, class_id: i64) -> StoreResult<Option<DanceClass>> {
        let sql = format!("{CLASS_SELECT} WHERE c.id = $1");
        let row = sqlx::query_as::<_, ClassRow>(&sql)
            .bind(class_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(DanceClass::from))
    }

    async fn create_class(&self, new_class: NewDanceClass) -> StoreResult<DanceClass> {
        let row = sqlx::query_as::<_, ClassRow>(
            "WITH c AS ( \
                 INSERT INTO dance_classes \
                     (title, description, duration_minutes, category, trainer_id, video_path) \
                 VALUES ($1, $2, $3, $4, $5::uuid, $6) \
                 RETURNING * \
             ) \
             SELECT c.id, c.title, c.description, c.duration_minutes, c.category, \
                    c.trainer_id::text AS trainer_id, u.username AS trainer_name, \
                    c.video_path, c.created_at \
             FROM c JOIN users u ON u.id = c.trainer_id",
        )
        .bind(&new_class.title)
        .bind(&new_class.description)
        .bind(new_class.duration_minutes)
        .bind(new_class.category)
        .bind(&new_class.trainer_id)
        .bind(&new_class.video_path)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn list_reviews(&self, class_id: i64) -> StoreResult<Vec<Review>> {
        let sql = format!("{REVIEW_SELECT} WHERE r.class_id = $1 ORDER BY r.created_at, r.id");
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(class_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn create_review(&self, new_review: NewReview) -> StoreResult<Review> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "WITH r AS ( \
                 INSERT INTO reviews (class_id, user_id, rating, comments) \
                 VALUES ($1, $2::uuid, $3, $4) \
                 RETURNING * \
             ) \
             SELECT r.id, r.class_id, r.user_id::text AS user_id, u.username AS author, \
                    r.rating, r.comments, r.created_at \
             FROM r JOIN users u ON u.id = r.user_id",
        )
        .bind(new_review.class_id)
        .bind(&new_review.user_id)
        .bind(new_review.rating)
        .bind(&new_review.comments)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn delete_review(&self, class_id: i64, review_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND class_id = $2")
            .bind(review_id)
            .bind(class_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_reviews_by_user(&self, user_id: &str) -> StoreResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews WHERE user_id = $1::uuid")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
