//! Landing pages and small informational routes.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Path, Request};
use axum::http::header::USER_AGENT;

use crate::error::AppError;
use crate::middleware::session::CurrentActor;
use crate::models::{ClientInfoResponse, GreetingResponse, IndexResponse, MessageResponse};

/// `GET /`
pub async fn index_handler(CurrentActor(actor): CurrentActor) -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Welcome to the dance studio".into(),
        username: actor.user().map(|u| u.username.clone()),
    })
}

/// `GET /user/{name}`
pub async fn greeting_handler(Path(name): Path<String>) -> Json<GreetingResponse> {
    Json(GreetingResponse {
        greeting: format!("Hello, {name}!"),
    })
}

/// `GET /user_info` — echoes the caller's address and user agent.
pub async fn client_info_handler(request: Request) -> Json<ClientInfoResponse> {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(ClientInfoResponse { ip, user_agent })
}

/// `GET /secret`
pub async fn secret_handler() -> Json<MessageResponse> {
    Json(MessageResponse::new("Only for auth"))
}

/// `GET /admin`
pub async fn admin_handler() -> Json<MessageResponse> {
    Json(MessageResponse::new("For admin"))
}

/// Fallback for paths no route matched.
pub async fn not_found_handler(request: Request) -> AppError {
    AppError::NotFound(format!("No page at {}", request.uri().path()))
}
