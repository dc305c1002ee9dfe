//! Authentication request handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::session::{CurrentActor, SignedInUser};
use crate::models::{
    LoginRequest, LoginResponse, MessageResponse, NextQuery, RegisterRequest, RegisterResponse,
    StatusResponse, UnconfirmedResponse,
};
use crate::services::auth;
use crate::services::cookies::{SESSION_COOKIE, clear_session_cookie, session_cookie};
use crate::services::navigation::INDEX_PATH;

/// `POST /auth/login` — authenticate with email + password, set the session
/// cookie and report where to go next.
pub async fn login_handler(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let (session, resp) = auth::login(
        &state,
        &body.email,
        &body.password,
        body.remember_me,
        query.next.as_deref(),
    )
    .await?;

    let max_age = session
        .remember
        .then(|| state.config.auth.session_lifetime(true));
    let cookie = session_cookie(&session.token, max_age, state.config.cookie_secure);
    Ok((jar.add(cookie), Json(resp)))
}

/// `POST /auth/register` — create an account and send the confirmation email.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let resp = auth::register(&state, &body).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `POST /auth/logout` — end the current session and clear the cookie.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let resp = auth::logout(&state, token.as_deref()).await?;
    let jar = jar.add(clear_session_cookie(state.config.cookie_secure));
    Ok((jar, Json(resp)))
}

/// `GET /auth/confirm/{token}` — confirm the logged-in account.
pub async fn confirm_handler(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
    Path(token): Path<String>,
) -> AppResult<Json<StatusResponse>> {
    let resp = auth::confirm(&state, &user, &token).await?;
    Ok(Json(resp))
}

/// `POST /auth/confirm` — send a fresh confirmation email.
pub async fn resend_confirmation_handler(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
) -> AppResult<Json<StatusResponse>> {
    let resp = auth::resend_confirmation(&state, &user)?;
    Ok(Json(resp))
}

/// `GET /auth/unconfirmed` — tells a logged-in but unconfirmed user what to
/// do. Everyone else goes back to the index.
pub async fn unconfirmed_handler(CurrentActor(actor): CurrentActor) -> Response {
    match actor.user() {
        Some(user) if !user.confirmed => Json(UnconfirmedResponse {
            message: "You have not confirmed your account yet. Check your inbox for the \
                      confirmation link, or request a new one."
                .into(),
            email: user.email.clone(),
        })
        .into_response(),
        _ => Redirect::to(INDEX_PATH).into_response(),
    }
}
