//! Dance class catalog and reviews.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::models::auth::User;
use crate::models::catalog::{DanceClass, NewDanceClass, NewReview, Review};
use crate::store::{CatalogStore, StoreError};

/// Video formats accepted for class recordings.
pub const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "avi", "mov"];

/// Valid group categories.
pub const CATEGORIES: std::ops::RangeInclusive<i16> = 1..=3;

/// Valid review ratings.
pub const RATINGS: std::ops::RangeInclusive<i16> = 1..=5;

/// Catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Fields of a class as submitted by a trainer.
#[derive(Debug, Clone)]
pub struct ClassDraft {
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub category: i16,
    pub video_path: Option<String>,
}

/// A class together with its reviews.
#[derive(Debug, Clone)]
pub struct ClassDetail {
    pub class: DanceClass,
    pub reviews: Vec<Review>,
}

pub struct Catalog {
    store: Arc<dyn CatalogStore>,
}

fn required(value: &str, field: &str) -> CatalogResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn validate_video_path(path: &str) -> CatalogResult<()> {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        return Err(CatalogError::Validation("Videos only!".into()));
    }
    Ok(())
}

impl Catalog {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn list_classes(&self) -> CatalogResult<Vec<DanceClass>> {
        Ok(self.store.list_classes().await?)
    }

    pub async fn class(&self, class_id: i64) -> CatalogResult<DanceClass> {
        self.store
            .find_class(class_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("class {class_id}")))
    }

    pub async fn class_detail(&self, class_id: i64) -> CatalogResult<ClassDetail> {
        let class = self.class(class_id).await?;
        let reviews = self.store.list_reviews(class_id).await?;
        Ok(ClassDetail { class, reviews })
    }

    /// Create a class with `trainer` as its trainer.
    pub async fn create_class(&self, trainer: &User, draft: ClassDraft) -> CatalogResult<DanceClass> {
        let title = required(&draft.title, "title")?;
        let description = required(&draft.description, "description")?;
        if draft.duration_minutes <= 0 {
            return Err(CatalogError::Validation(
                "duration must be a positive number of minutes".into(),
            ));
        }
        if !CATEGORIES.contains(&draft.category) {
            return Err(CatalogError::Validation(format!(
                "category must be between {} and {}",
                CATEGORIES.start(),
                CATEGORIES.end()
            )));
        }
        let video_path = draft
            .video_path
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        if let Some(path) = &video_path {
            validate_video_path(path)?;
        }

        let class = self
            .store
            .create_class(NewDanceClass {
                title,
                description,
                duration_minutes: draft.duration_minutes,
                category: draft.category,
                trainer_id: trainer.id.clone(),
                video_path,
            })
            .await?;
        info!(class_id = class.id, trainer = %trainer.username, "class created");
        Ok(class)
    }

    pub async fn add_review(
        &self,
        author: &User,
        class_id: i64,
        rating: i16,
        comments: &str,
    ) -> CatalogResult<Review> {
        if !RATINGS.contains(&rating) {
            return Err(CatalogError::Validation(format!(
                "rating must be between {} and {}",
                RATINGS.start(),
                RATINGS.end()
            )));
        }
        let comments = required(comments, "comments")?;
        // 404 rather than a foreign-key failure.
        self.class(class_id).await?;

        let review = self
            .store
            .create_review(NewReview {
                class_id,
                user_id: author.id.clone(),
                rating,
                comments,
            })
            .await?;
        info!(class_id, review_id = review.id, author = %author.username, "review added");
        Ok(review)
    }

    pub async fn delete_review(&self, moderator: &User, class_id: i64, review_id: i64) -> CatalogResult<()> {
        if !self.store.delete_review(class_id, review_id).await? {
            return Err(CatalogError::NotFound(format!(
                "review {review_id} on class {class_id}"
            )));
        }
        info!(class_id, review_id, moderator = %moderator.username, "review removed");
        Ok(())
    }

    pub async fn review_count(&self, user_id: &str) -> CatalogResult<i64> {
        Ok(self.store.count_reviews_by_user(user_id).await?)
    }
}
