//! Public user profiles.

use axum::Json;
use axum::extract::{Path, State};

use crate::AppState;
use crate::error::AppResult;
use crate::models::ProfileResponse;

/// `GET /profile/{username}`
pub async fn profile_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<ProfileResponse>> {
    let user = state.credentials.find_by_username(&username).await?;
    let review_count = state.catalog.review_count(&user.id).await?;
    Ok(Json(ProfileResponse {
        username: user.username,
        role: user.role,
        member_since: user.member_since.to_rfc3339(),
        last_seen: user.last_seen.to_rfc3339(),
        review_count,
    }))
}
