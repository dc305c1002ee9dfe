//! Access middleware — applies a route's policy before its handler runs.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use studio_core::auth::access::{self, Decision, Denial, RouteId};
use studio_core::models::auth::Actor;
use tracing::debug;

use crate::error::AppError;
use crate::services::navigation::{login_url, redirect_path};

/// Axum middleware, attached per route with the route's [`RouteId`] as state.
///
/// Runs after [`super::session::resolve_actor`]; a missing actor counts as
/// anonymous.
pub async fn enforce(State(route): State<RouteId>, request: Request, next: Next) -> Response {
    let anonymous = Actor::Anonymous;
    let actor = request.extensions().get::<Actor>().unwrap_or(&anonymous);

    match access::evaluate(actor, route) {
        Decision::Proceed => next.run(request).await,
        Decision::Redirect(target) => {
            debug!(?route, ?target, "redirecting actor");
            Redirect::to(redirect_path(target)).into_response()
        }
        Decision::Deny(Denial::Unauthenticated) => {
            let requested = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            Redirect::to(&login_url(requested)).into_response()
        }
        Decision::Deny(Denial::Forbidden) => {
            AppError::Forbidden("You do not have permission to access this page".into())
                .into_response()
        }
    }
}
