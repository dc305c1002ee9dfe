//! Session middleware — resolves the acting user from the session cookie.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use studio_core::models::auth::{Actor, User};
use tracing::warn;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::services::cookies::SESSION_COOKIE;

/// Axum middleware: looks up the session cookie, stores the resulting
/// [`Actor`] in request extensions and records activity for known users.
///
/// An unknown or expired cookie yields `Actor::Anonymous`; it is never an
/// error on its own.
pub async fn resolve_actor(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let actor = state.sessions.current_actor(token.as_deref()).await?;

    if let Some(user) = actor.user()
        && let Err(e) = state.credentials.touch_last_seen(&user.id).await
    {
        warn!(user_id = %user.id, "failed to record last seen: {e}");
    }

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// The resolved actor; anonymous when no session applies.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentActor(
            parts.extensions.get::<Actor>().cloned().unwrap_or_default(),
        ))
    }
}

/// The logged-in user. Rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct SignedInUser(pub User);

impl<S> FromRequestParts<S> for SignedInUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Actor>() {
            Some(Actor::Authenticated(user)) => Ok(SignedInUser(user.clone())),
            _ => Err(AppError::Unauthorized("Login required".into())),
        }
    }
}
