//! In-process storage backend.
//!
//! All state sits behind a single `RwLock`, so each trait call is atomic
//! and the uniqueness checks in `create` cannot race.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogStore, SessionStore, StoreError, StoreResult, UserStore};
use crate::models::auth::{NewUser, SessionRecord, User, UserWithPassword};
use crate::models::catalog::{DanceClass, NewDanceClass, NewReview, Review};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<String, UserWithPassword>,
    sessions: HashMap<String, SessionRecord>,
    classes: BTreeMap<i64, DanceClass>,
    reviews: BTreeMap<i64, Review>,
    next_class_id: i64,
    next_review_id: i64,
}

impl Inner {
    fn username_of(&self, user_id: &str) -> Option<String> {
        self.users.get(user_id).map(|u| u.user.username.clone())
    }
}

/// Storage kept entirely in memory. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Foreign-key failure, shaped like the one PostgreSQL would report.
fn missing_reference(what: &str) -> StoreError {
    StoreError::Db(sqlx::Error::Protocol(format!("{what} does not exist")))
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.user.email == new_user.email) {
            return Err(StoreError::Duplicate("email".into()));
        }
        if inner
            .users
            .values()
            .any(|u| u.user.username == new_user.username)
        {
            return Err(StoreError::Duplicate("username".into()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: new_user.email,
            username: new_user.username,
            role: new_user.role,
            confirmed: false,
            member_since: now,
            last_seen: now,
        };
        inner.users.insert(
            user.id.clone(),
            UserWithPassword {
                user: user.clone(),
                password_hash: new_user.password_hash,
            },
        );
        Ok(user)
    }

    async fn find_by_id(&self, user_id: &str) -> StoreResult<Option<UserWithPassword>> {
        Ok(self.inner.read().await.users.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserWithPassword>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.user.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserWithPassword>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.user.username == username)
            .cloned())
    }

    async fn mark_confirmed(&self, user_id: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.users.get_mut(user_id) {
            Some(entry) => {
                entry.user.confirmed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn touch_last_seen(&self, user_id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        if let Some(entry) = self.inner.write().await.users.get_mut(user_id) {
            entry.user.last_seen = at;
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(&self, record: SessionRecord) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&record.user_id) {
            return Err(missing_reference("user"));
        }
        inner.sessions.insert(record.token_hash.clone(), record);
        Ok(())
    }

    async fn find_active_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<SessionRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .sessions
            .get(token_hash)
            .filter(|s| s.expires_at > now)
            .cloned())
    }

    async fn delete_session(&self, token_hash: &str) -> StoreResult<()> {
        self.inner.write().await.sessions.remove(token_hash);
        Ok(())
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.sessions.len();
        inner.sessions.retain(|_, s| s.expires_at > now);
        Ok((before - inner.sessions.len()) as u64)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_classes(&self) -> StoreResult<Vec<DanceClass>> {
        let inner = self.inner.read().await;
        // Newest first, like the SQL backend.
        Ok(inner.classes.values().rev().cloned().collect())
    }

    async fn find_class(&self, class_id: i64) -> StoreResult<Option<DanceClass>> {
        Ok(self.inner.read().await.classes.get(&class_id).cloned())
    }

    async fn create_class(&self, new_class: NewDanceClass) -> StoreResult<DanceClass> {
        let mut inner = self.inner.write().await;
        let trainer_name = inner
            .username_of(&new_class.trainer_id)
            .ok_or_else(|| missing_reference("trainer"))?;

        inner.next_class_id += 1;
        let class = DanceClass {
            id: inner.next_class_id,
            title: new_class.title,
            description: new_class.description,
            duration_minutes: new_class.duration_minutes,
            category: new_class.category,
            trainer_id: new_class.trainer_id,
            trainer_name,
            video_path: new_class.video_path,
            created_at: Utc::now(),
        };
        inner.classes.insert(class.id, class.clone());
        Ok(class)
    }

    async fn list_reviews(&self, class_id: i64) -> StoreResult<Vec<Review>> {
        let inner = self.inner.read().await;
        Ok(inner
            .reviews
            .values()
            .filter(|r| r.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn create_review(&self, new_review: NewReview) -> StoreResult<Review> {
        let mut inner = self.inner.write().await;
        if !inner.classes.contains_key(&new_review.class_id) {
            return Err(missing_reference("class"));
        }
        let author = inner
            .username_of(&new_review.user_id)
            .ok_or_else(|| missing_reference("user"))?;

        inner.next_review_id += 1;
        let review = Review {
            id: inner.next_review_id,
            class_id: new_review.class_id,
            user_id: new_review.user_id,
            author,
            rating: new_review.rating,
            comments: new_review.comments,
            created_at: Utc::now(),
        };
        inner.reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn delete_review(&self, class_id: i64, review_id: i64) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.reviews.get(&review_id) {
            Some(review) if review.class_id == class_id => {
                inner.reviews.remove(&review_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count_reviews_by_user(&self, user_id: &str) -> StoreResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner.reviews.values().filter(|r| r.user_id == user_id).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::roles::Role;

    fn new_user(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.into(),
            username: username.into(),
            password_hash: "hash".into(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email_and_username() {
        let store = MemoryStore::new();
        store.create(new_user("a@x.com", "alice")).await.unwrap();

        let err = store.create(new_user("a@x.com", "other")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(ref f) if f == "email"));

        let err = store.create(new_user("b@x.com", "alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(ref f) if f == "username"));
    }

    #[tokio::test]
    async fn concurrent_registrations_with_same_email_have_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create(new_user("race@x.com", &format!("racer{i}")))
                    .await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(StoreError::Duplicate(field)) => assert_eq!(field, "email"),
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn expired_sessions_are_invisible_and_purged() {
        let store = MemoryStore::new();
        let user = store.create(new_user("a@x.com", "alice")).await.unwrap();
        let now = Utc::now();
        store
            .insert_session(SessionRecord {
                id: Uuid::new_v4().to_string(),
                token_hash: "h".into(),
                user_id: user.id,
                remember: false,
                created_at: now - chrono::Duration::hours(2),
                expires_at: now - chrono::Duration::hours(1),
            })
            .await
            .unwrap();

        assert!(store.find_active_session("h", now).await.unwrap().is_none());
        assert_eq!(store.purge_expired_sessions(now).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_review_checks_owning_class() {
        let store = MemoryStore::new();
        let trainer = store.create(new_user("t@x.com", "trainer")).await.unwrap();
        let class = store
            .create_class(NewDanceClass {
                title: "Salsa".into(),
                description: "Beginners".into(),
                duration_minutes: 60,
                category: 1,
                trainer_id: trainer.id.clone(),
                video_path: None,
            })
            .await
            .unwrap();
        let review = store
            .create_review(NewReview {
                class_id: class.id,
                user_id: trainer.id,
                rating: 5,
                comments: "Great".into(),
            })
            .await
            .unwrap();

        assert!(!store.delete_review(class.id + 1, review.id).await.unwrap());
        assert!(store.delete_review(class.id, review.id).await.unwrap());
        assert!(store.list_reviews(class.id).await.unwrap().is_empty());
    }
}
