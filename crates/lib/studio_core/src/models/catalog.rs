//! Dance class and review models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dance class offered by a trainer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanceClass {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    /// Group category, 1 to 3.
    pub category: i16,
    pub trainer_id: String,
    pub trainer_name: String,
    /// Public path of an uploaded video under the static directory.
    pub video_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new class.
#[derive(Debug, Clone)]
pub struct NewDanceClass {
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub category: i16,
    pub trainer_id: String,
    pub video_path: Option<String>,
}

/// A review left on a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub class_id: i64,
    pub user_id: String,
    pub author: String,
    /// 1 to 5.
    pub rating: i16,
    pub comments: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new review.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub class_id: i64,
    pub user_id: String,
    pub rating: i16,
    pub comments: String,
}
