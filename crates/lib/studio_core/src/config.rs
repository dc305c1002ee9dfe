//! Account and session settings shared by the auth services.

use chrono::Duration;

/// Confirmation token lifetime: 1 hour.
pub const DEFAULT_CONFIRM_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Session lifetime without "remember me": 12 hours.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 12 * 60 * 60;

/// Session lifetime with "remember me": 30 days.
pub const DEFAULT_REMEMBER_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Process-wide auth settings, read-only after startup.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// How long a confirmation token stays valid after issuance.
    pub confirm_token_ttl: Duration,
    /// Server-side lifetime of an ordinary session.
    pub session_ttl: Duration,
    /// Server-side lifetime of a "remember me" session.
    pub remember_ttl: Duration,
    pub bcrypt_cost: u32,
    /// Registrations with this email are created as administrators.
    pub admin_email: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            confirm_token_ttl: Duration::seconds(DEFAULT_CONFIRM_TOKEN_TTL_SECS),
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            remember_ttl: Duration::seconds(DEFAULT_REMEMBER_TTL_SECS),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            admin_email: None,
        }
    }
}

impl AuthSettings {
    /// Session lifetime for the given "remember me" choice.
    pub fn session_lifetime(&self, remember: bool) -> Duration {
        if remember {
            self.remember_ttl
        } else {
            self.session_ttl
        }
    }
}
