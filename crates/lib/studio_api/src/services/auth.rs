//! Authentication service — login/register/confirm flows delegating to
//! `studio_core::auth`.

use studio_core::auth::confirmation::{ConfirmOutcome, ResendOutcome};
use studio_core::auth::session::Session;
use studio_core::models::auth::User;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{
    LoginResponse, MessageResponse, RegisterRequest, RegisterResponse, StatusResponse, UserInfo,
};
use crate::services::navigation::safe_next;

// ---------------------------------------------------------------------------
// Login / logout
// ---------------------------------------------------------------------------

/// Authenticate with email + password and open a session.
///
/// Returns the session (for the cookie) and the response body. Wrong email
/// and wrong password produce the same error.
pub async fn login(
    state: &AppState,
    email: &str,
    password: &str,
    remember: bool,
    next: Option<&str>,
) -> AppResult<(Session, LoginResponse)> {
    let user = state.credentials.authenticate(email, password).await?;
    let session = state.sessions.login(&user, remember).await?;
    info!(user_id = %user.id, remember, "user logged in");

    let response = LoginResponse {
        user: UserInfo::from(&user),
        redirect_to: safe_next(next),
    };
    Ok((session, response))
}

/// Close the session behind `token`, if any. Idempotent.
pub async fn logout(state: &AppState, token: Option<&str>) -> AppResult<MessageResponse> {
    if let Some(token) = token {
        state.sessions.logout(token).await?;
    }
    Ok(MessageResponse::new("You have been logged out."))
}

// ---------------------------------------------------------------------------
// Registration & confirmation
// ---------------------------------------------------------------------------

/// Register a new account and queue its confirmation email.
pub async fn register(state: &AppState, request: &RegisterRequest) -> AppResult<RegisterResponse> {
    if request.password != request.confirm_password {
        return Err(AppError::Validation("Passwords must match".into()));
    }

    let user = state
        .confirmation
        .register(&request.email, &request.username, &request.password)
        .await?;
    info!(user_id = %user.id, role = %user.role, "account registered");

    Ok(RegisterResponse {
        user: UserInfo::from(&user),
        message: "A confirmation email has been sent to you by email.".into(),
    })
}

/// Present a confirmation token on behalf of the logged-in `user`.
pub async fn confirm(state: &AppState, user: &User, token: &str) -> AppResult<StatusResponse> {
    match state.confirmation.confirm(user, token).await? {
        ConfirmOutcome::Confirmed => Ok(StatusResponse {
            status: "confirmed".into(),
            message: "You have confirmed your account. Thanks!".into(),
        }),
        ConfirmOutcome::AlreadyConfirmed => Ok(StatusResponse {
            status: "already_confirmed".into(),
            message: "Your account is already confirmed.".into(),
        }),
        ConfirmOutcome::Invalid => Err(AppError::Validation(
            "The confirmation link is invalid or has expired.".into(),
        )),
    }
}

/// Queue a fresh confirmation email for `user`.
pub fn resend_confirmation(state: &AppState, user: &User) -> AppResult<StatusResponse> {
    let response = match state.confirmation.resend(user)? {
        ResendOutcome::Sent => StatusResponse {
            status: "sent".into(),
            message: "A new confirmation email has been sent to you by email.".into(),
        },
        ResendOutcome::AlreadyConfirmed => StatusResponse {
            status: "already_confirmed".into(),
            message: "Your account is already confirmed.".into(),
        },
    };
    Ok(response)
}
