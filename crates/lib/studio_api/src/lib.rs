//! # studio_api
//!
//! HTTP API library for the dance studio.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodRouter, any, delete, get, post};
use sqlx::PgPool;
use studio_core::auth::access::RouteId;
use studio_core::auth::confirmation::ConfirmationWorkflow;
use studio_core::auth::credentials::CredentialStore;
use studio_core::auth::session::SessionGate;
use studio_core::auth::token::ConfirmationTokens;
use studio_core::catalog::Catalog;
use studio_core::mail::MailQueue;
use studio_core::store::{CatalogStore, SessionStore, UserStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::ApiConfig;
use crate::handlers::{auth, classes, profile, site};
use crate::middleware::access::enforce;
use crate::middleware::session::resolve_actor;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    pub credentials: Arc<CredentialStore>,
    pub sessions: Arc<SessionGate>,
    pub confirmation: Arc<ConfirmationWorkflow>,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    /// Wire the core services over one store and a running mail queue.
    pub fn new<S>(config: ApiConfig, store: Arc<S>, mail: MailQueue) -> Self
    where
        S: UserStore + SessionStore + CatalogStore + 'static,
    {
        let credentials = Arc::new(CredentialStore::new(store.clone(), &config.auth));
        let sessions = Arc::new(SessionGate::new(
            store.clone(),
            store.clone(),
            config.auth.clone(),
        ));
        let tokens = Arc::new(ConfirmationTokens::new(
            config.secret_key.as_bytes(),
            config.auth.confirm_token_ttl,
        ));
        let confirmation = Arc::new(ConfirmationWorkflow::new(
            credentials.clone(),
            tokens,
            mail,
            &config.public_url,
        ));
        let catalog = Arc::new(Catalog::new(store));
        Self {
            config,
            credentials,
            sessions,
            confirmation,
            catalog,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `studio_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    studio_core::migrate::migrate(pool).await
}

/// Put `method_router` behind the access policy of `route`.
fn gated(route: RouteId, method_router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    method_router.layer(from_fn_with_state(route, enforce))
}

/// Builds the Axum router with all routes and shared state.
///
/// Every route, the fallback included, carries its own access policy; the
/// session layer in front of them resolves the actor once per request.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let site = Router::new()
        .route(routes::GET_INDEX, gated(RouteId::Index, get(site::index_handler)))
        .route(
            routes::GET_USER_NAME,
            gated(RouteId::Greeting, get(site::greeting_handler)),
        )
        .route(
            routes::GET_USER_INFO,
            gated(RouteId::ClientInfo, get(site::client_info_handler)),
        )
        .route(routes::GET_SECRET, gated(RouteId::Secret, get(site::secret_handler)))
        .route(routes::GET_ADMIN, gated(RouteId::Admin, get(site::admin_handler)))
        .route(
            routes::GET_PROFILE_USERNAME,
            gated(RouteId::Profile, get(profile::profile_handler)),
        );

    let catalog = Router::new()
        .route(
            routes::GET_CLASSES,
            gated(RouteId::Classes, get(classes::list_classes_handler)),
        )
        .route(
            routes::POST_CLASSES,
            gated(RouteId::CreateClass, post(classes::create_class_handler)),
        )
        .route(
            routes::GET_CLASSES_ID,
            gated(RouteId::ClassDetail, get(classes::class_detail_handler)),
        )
        .route(
            routes::POST_CLASSES_ID_REVIEWS,
            gated(RouteId::PostReview, post(classes::post_review_handler)),
        )
        .route(
            routes::DELETE_CLASSES_ID_REVIEWS_ID,
            gated(RouteId::DeleteReview, delete(classes::delete_review_handler)),
        );

    let account = Router::new()
        .route(routes::POST_AUTH_LOGIN, gated(RouteId::Login, post(auth::login_handler)))
        .route(
            routes::POST_AUTH_REGISTER,
            gated(RouteId::Register, post(auth::register_handler)),
        )
        .route(routes::POST_AUTH_LOGOUT, gated(RouteId::Logout, post(auth::logout_handler)))
        .route(
            routes::GET_AUTH_CONFIRM_TOKEN,
            gated(RouteId::Confirm, get(auth::confirm_handler)),
        )
        .route(
            routes::POST_AUTH_CONFIRM,
            gated(
                RouteId::ResendConfirmation,
                post(auth::resend_confirmation_handler),
            ),
        )
        .route(
            routes::GET_AUTH_UNCONFIRMED,
            gated(RouteId::Unconfirmed, get(auth::unconfirmed_handler)),
        );

    let assets = Router::new()
        .nest_service(routes::STATIC_PREFIX, ServeDir::new(&state.config.static_dir))
        .route_layer(from_fn_with_state(RouteId::Static, enforce));

    Router::new()
        .merge(site)
        .merge(catalog)
        .merge(account)
        .merge(assets)
        .fallback(gated(RouteId::NotFound, any(site::not_found_handler)))
        .layer(from_fn_with_state(state.clone(), resolve_actor))
        .layer(cors)
        .with_state(state)
}
