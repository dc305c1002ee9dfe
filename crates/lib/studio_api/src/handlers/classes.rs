//! Class catalog and review handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use studio_core::catalog::ClassDraft;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::session::SignedInUser;
use crate::models::{
    ClassDetailResponse, ClassInfo, ClassListResponse, CreateClassRequest, ReviewInfo,
    ReviewRequest,
};

/// `GET /classes`
pub async fn list_classes_handler(State(state): State<AppState>) -> AppResult<Json<ClassListResponse>> {
    let classes = state.catalog.list_classes().await?;
    Ok(Json(ClassListResponse {
        classes: classes.into_iter().map(ClassInfo::from).collect(),
    }))
}

/// `POST /classes` — trainers only.
pub async fn create_class_handler(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
    Json(body): Json<CreateClassRequest>,
) -> AppResult<(StatusCode, Json<ClassInfo>)> {
    let draft = ClassDraft {
        title: body.title,
        description: body.description,
        duration_minutes: body.duration_minutes,
        category: body.category,
        video_path: body.video_path,
    };
    let class = state.catalog.create_class(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(ClassInfo::from(class))))
}

/// `GET /classes/{id}` — class with its reviews, newest first.
pub async fn class_detail_handler(
    State(state): State<AppState>,
    Path(class_id): Path<i64>,
) -> AppResult<Json<ClassDetailResponse>> {
    let detail = state.catalog.class_detail(class_id).await?;
    Ok(Json(ClassDetailResponse {
        class: ClassInfo::from(detail.class),
        reviews: detail.reviews.into_iter().map(ReviewInfo::from).collect(),
    }))
}

/// `POST /classes/{id}/reviews`
pub async fn post_review_handler(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
    Path(class_id): Path<i64>,
    Json(body): Json<ReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewInfo>)> {
    let review = state
        .catalog
        .add_review(&user, class_id, body.rating, &body.comments)
        .await?;
    Ok((StatusCode::CREATED, Json(ReviewInfo::from(review))))
}

/// `DELETE /classes/{id}/reviews/{review_id}` — moderators only.
pub async fn delete_review_handler(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
    Path((class_id, review_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.catalog.delete_review(&user, class_id, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
