//! API server configuration.

use std::path::PathBuf;

use chrono::Duration;
use studio_core::auth::token::resolve_signing_secret;
use studio_core::config::{AuthSettings, DEFAULT_CONFIRM_TOKEN_TTL_SECS};

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:5000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// Signing secret for confirmation tokens.
    pub secret_key: String,
    /// Externally reachable base URL, used in confirmation links.
    pub public_url: String,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// From address for outgoing mail.
    pub mail_sender: String,
    /// Mark the session cookie `Secure` (HTTPS only).
    pub cookie_secure: bool,
    pub auth: AuthSettings,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                      | Default                              |
    /// |-------------------------------|--------------------------------------|
    /// | `BIND_ADDR`                   | `127.0.0.1:5000`                     |
    /// | `DATABASE_URL`                | `postgres://localhost:5432/studio`   |
    /// | `STUDIO_SECRET_KEY` / `SECRET_KEY` | generated & persisted to file   |
    /// | `STUDIO_PUBLIC_URL`           | `http://127.0.0.1:5000`              |
    /// | `STUDIO_STATIC_DIR`           | `static`                             |
    /// | `STUDIO_MAIL_SENDER`          | `Studio <noreply@studio.local>`      |
    /// | `STUDIO_ADMIN_EMAIL`          | unset                                |
    /// | `STUDIO_CONFIRM_TTL_SECS`     | `3600`                               |
    /// | `STUDIO_COOKIE_SECURE`        | `false`                              |
    pub fn from_env() -> Self {
        let auth = AuthSettings {
            confirm_token_ttl: Duration::seconds(
                env_parse("STUDIO_CONFIRM_TTL_SECS").unwrap_or(DEFAULT_CONFIRM_TOKEN_TTL_SECS),
            ),
            admin_email: std::env::var("STUDIO_ADMIN_EMAIL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            ..AuthSettings::default()
        };
        Self {
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:5000"),
            pg_connection_url: env_or("DATABASE_URL", "postgres://localhost:5432/studio"),
            secret_key: resolve_signing_secret(),
            public_url: env_or("STUDIO_PUBLIC_URL", "http://127.0.0.1:5000"),
            static_dir: PathBuf::from(env_or("STUDIO_STATIC_DIR", "static")),
            mail_sender: env_or("STUDIO_MAIL_SENDER", "Studio <noreply@studio.local>"),
            cookie_secure: env_parse("STUDIO_COOKIE_SECURE").unwrap_or(false),
            auth,
        }
    }
}
