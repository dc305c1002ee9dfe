//! Session/login gate — binds a browsing context to a user.
//!
//! The client holds an opaque random token; the store only ever sees its
//! SHA-256 hash. Resolving a token to an `Actor` is a pure read.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::AuthResult;
use crate::config::AuthSettings;
use crate::models::auth::{Actor, SessionRecord, User};
use crate::store::{SessionStore, UserStore};

/// A freshly established session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Plaintext token for the client. Not recoverable later.
    pub token: String,
    pub user_id: String,
    pub remember: bool,
    pub expires_at: DateTime<Utc>,
}

/// Generate a cryptographically random session token (64 alphanumeric chars).
fn generate_session_token() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// SHA-256 hash a session token for storage.
fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct SessionGate {
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserStore>,
    settings: AuthSettings,
}

impl SessionGate {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserStore>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            sessions,
            users,
            settings,
        }
    }

    /// Open a session for an already verified user.
    pub async fn login(&self, user: &User, remember: bool) -> AuthResult<Session> {
        let token = generate_session_token();
        let now = Utc::now();
        let expires_at = now + self.settings.session_lifetime(remember);

        self.sessions
            .insert_session(SessionRecord {
                id: uuid::Uuid::now_v7().to_string(),
                token_hash: hash_session_token(&token),
                user_id: user.id.clone(),
                remember,
                created_at: now,
                expires_at,
            })
            .await?;

        info!(user_id = %user.id, remember, "session opened");
        Ok(Session {
            token,
            user_id: user.id.clone(),
            remember,
            expires_at,
        })
    }

    /// Destroy the session behind `token`. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> AuthResult<()> {
        self.sessions
            .delete_session(&hash_session_token(token))
            .await?;
        debug!("session closed");
        Ok(())
    }

    /// Resolve the actor for a request carrying `token` (if any).
    pub async fn current_actor(&self, token: Option<&str>) -> AuthResult<Actor> {
        self.current_actor_at(token, Utc::now()).await
    }

    pub async fn current_actor_at(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthResult<Actor> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(Actor::Anonymous);
        };
        let Some(session) = self
            .sessions
            .find_active_session(&hash_session_token(token), now)
            .await?
        else {
            return Ok(Actor::Anonymous);
        };
        // The user may have been removed since the session was opened.
        Ok(self
            .users
            .find_by_id(&session.user_id)
            .await?
            .map_or(Actor::Anonymous, |u| Actor::Authenticated(u.user)))
    }

    /// Remove expired sessions from the store.
    pub async fn purge_expired(&self) -> AuthResult<u64> {
        let purged = self.sessions.purge_expired_sessions(Utc::now()).await?;
        if purged > 0 {
            debug!(purged, "expired sessions purged");
        }
        Ok(purged)
    }
}
