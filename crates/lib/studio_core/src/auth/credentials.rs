//! Credential store — account creation, lookup and password checks over a
//! `UserStore` backend.

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use tracing::info;

use super::password::{hash_password, verify_password};
use super::roles::Role;
use super::{AuthError, AuthResult};
use crate::config::AuthSettings;
use crate::models::auth::{NewUser, User, UserWithPassword};
use crate::store::UserStore;

/// Trim and lower-case an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct CredentialStore {
    users: Arc<dyn UserStore>,
    bcrypt_cost: u32,
    admin_email: Option<String>,
    /// Hash checked against when the email is unknown, so both failure
    /// paths pay for one bcrypt verification.
    dummy_hash: OnceLock<String>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserStore>, settings: &AuthSettings) -> Self {
        Self {
            users,
            bcrypt_cost: settings.bcrypt_cost,
            admin_email: settings.admin_email.as_deref().map(normalize_email),
            dummy_hash: OnceLock::new(),
        }
    }

    /// Create an unconfirmed account. The raw password is hashed here and
    /// goes no further.
    pub async fn create(&self, email: &str, username: &str, raw_password: &str) -> AuthResult<User> {
        let email = normalize_email(email);
        let username = username.trim();

        if email.is_empty() || username.is_empty() || raw_password.is_empty() {
            return Err(AuthError::Validation(
                "Email, username and password are required".into(),
            ));
        }
        if !email.contains('@') {
            return Err(AuthError::Validation("Invalid email address".into()));
        }

        let role = if self.admin_email.as_deref() == Some(email.as_str()) {
            Role::Administrator
        } else {
            Role::User
        };

        let password_hash = hash_password(raw_password, self.bcrypt_cost)?;
        let user = self
            .users
            .create(NewUser {
                email,
                username: username.to_string(),
                password_hash,
                role,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "account created");
        Ok(user)
    }

    pub async fn find_by_id(&self, user_id: &str) -> AuthResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|u| u.user)
            .ok_or_else(|| AuthError::NotFound("user".into()))
    }

    pub async fn find_by_email(&self, email: &str) -> AuthResult<UserWithPassword> {
        self.users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| AuthError::NotFound("user".into()))
    }

    pub async fn find_by_username(&self, username: &str) -> AuthResult<User> {
        self.users
            .find_by_username(username)
            .await?
            .map(|u| u.user)
            .ok_or_else(|| AuthError::NotFound(format!("user '{username}'")))
    }

    pub fn verify_password(&self, user: &UserWithPassword, raw_password: &str) -> AuthResult<bool> {
        verify_password(raw_password, &user.password_hash)
    }

    /// Check an email/password pair. Every failure looks the same to the
    /// caller.
    pub async fn authenticate(&self, email: &str, raw_password: &str) -> AuthResult<User> {
        let candidate = match self.find_by_email(email).await {
            Ok(c) => c,
            Err(AuthError::NotFound(_)) => {
                verify_password(raw_password, self.dummy_hash()?)?;
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };
        if !self.verify_password(&candidate, raw_password)? {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(candidate.user)
    }

    fn dummy_hash(&self) -> AuthResult<&str> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash);
        }
        let hash = hash_password("studio-unknown-account", self.bcrypt_cost)?;
        Ok(self.dummy_hash.get_or_init(|| hash))
    }

    /// Idempotent.
    pub async fn mark_confirmed(&self, user_id: &str) -> AuthResult<()> {
        if !self.users.mark_confirmed(user_id).await? {
            return Err(AuthError::NotFound("user".into()));
        }
        Ok(())
    }

    pub async fn touch_last_seen(&self, user_id: &str) -> AuthResult<()> {
        self.users.touch_last_seen(user_id, Utc::now()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn store(admin_email: Option<&str>) -> CredentialStore {
        let settings = AuthSettings {
            bcrypt_cost: 4,
            admin_email: admin_email.map(str::to_string),
            ..AuthSettings::default()
        };
        CredentialStore::new(Arc::new(MemoryStore::new()), &settings)
    }

    #[tokio::test]
    async fn create_stores_hash_and_starts_unconfirmed() {
        let creds = store(None);
        let user = creds.create("a@x.com", "alice", "pw1").await.unwrap();
        assert!(!user.confirmed);
        assert_eq!(user.role, Role::User);

        let stored = creds.find_by_email("a@x.com").await.unwrap();
        assert_ne!(stored.password_hash, "pw1");
        assert!(creds.verify_password(&stored, "pw1").unwrap());
    }

    #[tokio::test]
    async fn email_lookup_is_case_insensitive_and_unique() {
        let creds = store(None);
        creds.create(" A@X.com ", "alice", "pw1").await.unwrap();
        assert_eq!(
            creds.find_by_email("a@x.COM").await.unwrap().user.username,
            "alice"
        );

        let err = creds.create("a@x.com", "alice2", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateIdentity(ref f) if f == "email"));
        let err = creds.create("b@x.com", "alice", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateIdentity(ref f) if f == "username"));
    }

    #[tokio::test]
    async fn blank_fields_and_bad_email_are_rejected() {
        let creds = store(None);
        for (email, username, pw) in [("", "a", "p"), ("a@x.com", " ", "p"), ("a@x.com", "a", "")] {
            assert!(matches!(
                creds.create(email, username, pw).await,
                Err(AuthError::Validation(_))
            ));
        }
        assert!(matches!(
            creds.create("not-an-email", "a", "p").await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn configured_admin_email_gets_administrator_role() {
        let creds = store(Some("Boss@X.com"));
        let admin = creds.create("boss@x.com", "boss", "pw").await.unwrap();
        assert_eq!(admin.role, Role::Administrator);
    }

    #[tokio::test]
    async fn authenticate_does_not_distinguish_failures() {
        let creds = store(None);
        creds.create("a@x.com", "alice", "pw1").await.unwrap();

        assert!(matches!(
            creds.authenticate("nobody@x.com", "pw1").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            creds.authenticate("a@x.com", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert_eq!(
            creds.authenticate("a@x.com", "pw1").await.unwrap().username,
            "alice"
        );
    }

    #[tokio::test]
    async fn unknown_email_still_runs_a_password_check() {
        let creds = store(None);
        assert!(creds.dummy_hash.get().is_none());

        assert!(matches!(
            creds.authenticate("nobody@x.com", "pw1").await,
            Err(AuthError::InvalidCredentials)
        ));
        let dummy = creds.dummy_hash.get().expect("dummy hash computed");
        assert!(dummy.starts_with("$2"));
        assert!(!verify_password("pw1", dummy).unwrap());
    }

    #[tokio::test]
    async fn mark_confirmed_is_idempotent() {
        let creds = store(None);
        let user = creds.create("a@x.com", "alice", "pw1").await.unwrap();
        creds.mark_confirmed(&user.id).await.unwrap();
        creds.mark_confirmed(&user.id).await.unwrap();
        assert!(creds.find_by_id(&user.id).await.unwrap().confirmed);
        assert!(matches!(
            creds.mark_confirmed("missing").await,
            Err(AuthError::NotFound(_))
        ));
    }
}
