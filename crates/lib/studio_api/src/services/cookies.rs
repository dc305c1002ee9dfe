//! Cookie service — set/clear the httpOnly session cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Cookie name for the session token.
pub const SESSION_COOKIE: &str = "studio_session";

/// Build the session cookie.
///
/// Without `max_age` the cookie lives until the browser closes; remembered
/// sessions pass their lifetime so the cookie survives restarts.
pub fn session_cookie(token: &str, max_age: Option<chrono::Duration>, secure: bool) -> Cookie<'static> {
    let mut builder = Cookie::build((SESSION_COOKIE.to_string(), token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string());
    if let Some(age) = max_age {
        builder = builder.max_age(Duration::seconds(age.num_seconds()));
    }
    builder.build()
}

/// Build an expired cookie to clear the session.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE.to_string(), String::new()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}
