//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API request/response
//! shapes in `studio_api` (which use camelCase field names).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::roles::{Permissions, Role};

/// Domain user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Normalised (trimmed, lower-cased) email.
    pub email: String,
    pub username: String,
    pub role: Role,
    /// Only ever moves from `false` to `true`.
    pub confirmed: bool,
    pub member_since: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl User {
    /// Whether the user's role grants every permission in `required`.
    pub fn can(&self, required: Permissions) -> bool {
        self.role.permissions().contains(required)
    }
}

/// User with password hash (for internal auth flows).
#[derive(Debug, Clone)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: String,
}

/// Insert payload for a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Server-side session record. Only the hash of the cookie token is kept.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: String,
    pub token_hash: String,
    pub user_id: String,
    pub remember: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// The identity making the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Actor {
    #[default]
    Anonymous,
    Authenticated(User),
}

impl Actor {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Actor::Authenticated(user) => Some(user),
            Actor::Anonymous => None,
        }
    }

    /// Anonymous actors hold no permissions.
    pub fn can(&self, required: Permissions) -> bool {
        self.user().is_some_and(|u| u.can(required))
    }
}
