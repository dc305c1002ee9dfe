//! Request and response bodies. JSON field names are camelCase.

use serde::{Deserialize, Serialize};
use studio_core::auth::roles::Role;
use studio_core::models::auth::User;
use studio_core::models::catalog::{DanceClass, Review};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// `?next=` on the login route.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Account as shown to its owner.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub confirmed: bool,
    pub member_since: String,
    pub last_seen: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role,
            confirmed: user.confirmed,
            member_since: user.member_since.to_rfc3339(),
            last_seen: user.last_seen.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserInfo,
    /// Local path the client should go to next.
    pub redirect_to: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: UserInfo,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// `confirmed`, `already_confirmed`, `sent`.
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnconfirmedResponse {
    pub message: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub message: String,
    pub username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GreetingResponse {
    pub greeting: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfoResponse {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Public profile.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub username: String,
    pub role: Role,
    pub member_since: String,
    pub last_seen: String,
    pub review_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub category: i16,
    pub trainer_id: String,
    pub trainer: String,
    pub video_path: Option<String>,
    pub created_at: String,
}

impl From<DanceClass> for ClassInfo {
    fn from(c: DanceClass) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            duration_minutes: c.duration_minutes,
            category: c.category,
            trainer_id: c.trainer_id,
            trainer: c.trainer_name,
            video_path: c.video_path,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassListResponse {
    pub classes: Vec<ClassInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub category: i16,
    pub video_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInfo {
    pub id: i64,
    pub class_id: i64,
    pub author: String,
    pub rating: i16,
    pub comments: String,
    pub created_at: String,
}

impl From<Review> for ReviewInfo {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            class_id: r.class_id,
            author: r.author,
            rating: r.rating,
            comments: r.comments,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: i16,
    pub comments: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassDetailResponse {
    pub class: ClassInfo,
    pub reviews: Vec<ReviewInfo>,
}
