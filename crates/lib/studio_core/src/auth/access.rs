//! Access control gate — the per-request decision layered in front of
//! every route.
//!
//! Routes are identified symbolically by `RouteId`, never by path. Each
//! route has a static `RoutePolicy`, which expands into an ordered list of
//! `Requirement`s: authentication, then confirmation, then permission. The
//! first unmet requirement decides the outcome.

use serde::Serialize;

use super::roles::Permissions;
use crate::models::auth::Actor;

/// Symbolic identity of every route the application serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteId {
    Index,
    Greeting,
    ClientInfo,
    Secret,
    Admin,
    Profile,
    Classes,
    CreateClass,
    ClassDetail,
    PostReview,
    DeleteReview,
    Login,
    Register,
    Logout,
    Confirm,
    ResendConfirmation,
    Unconfirmed,
    Static,
    /// Any path no route matched.
    NotFound,
}

/// What a route demands of the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePolicy {
    pub requires_auth: bool,
    pub permission: Option<Permissions>,
    /// On the confirmation allow-list: reachable while unconfirmed.
    pub confirmation_exempt: bool,
}

impl RoutePolicy {
    pub const fn open() -> Self {
        Self {
            requires_auth: false,
            permission: None,
            confirmation_exempt: false,
        }
    }

    pub const fn authenticated() -> Self {
        Self {
            requires_auth: true,
            ..Self::open()
        }
    }

    pub const fn permission(required: Permissions) -> Self {
        Self {
            requires_auth: true,
            permission: Some(required),
            confirmation_exempt: false,
        }
    }

    pub const fn exempt(self) -> Self {
        Self {
            confirmation_exempt: true,
            ..self
        }
    }

    /// The checks this policy implies, in evaluation order.
    pub fn requirements(&self) -> Vec<Requirement> {
        let mut out = Vec::with_capacity(3);
        if self.requires_auth {
            out.push(Requirement::Authenticated);
        }
        if !self.confirmation_exempt {
            out.push(Requirement::Confirmed);
        }
        if let Some(p) = self.permission {
            out.push(Requirement::Permission(p));
        }
        out
    }
}

impl RouteId {
    /// Static route → policy table.
    pub const fn policy(self) -> RoutePolicy {
        use RouteId::*;
        match self {
            Index | Greeting | ClientInfo | Classes | NotFound => RoutePolicy::open(),
            Secret | Profile | ClassDetail => RoutePolicy::authenticated(),
            Admin => RoutePolicy::permission(Permissions::ADMIN),
            CreateClass => RoutePolicy::permission(Permissions::MANAGE_CLASSES),
            PostReview => RoutePolicy::permission(Permissions::WRITE_REVIEWS),
            DeleteReview => RoutePolicy::permission(Permissions::MODERATE_REVIEWS),
            Login | Register | Unconfirmed | Static => RoutePolicy::open().exempt(),
            Logout | Confirm | ResendConfirmation => RoutePolicy::authenticated().exempt(),
        }
    }
}

/// A single composable check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    /// Only binds authenticated actors; anonymous ones pass.
    Confirmed,
    Permission(Permissions),
}

impl Requirement {
    /// `None` when satisfied, otherwise the decision that stops the request.
    pub fn check(&self, actor: &Actor) -> Option<Decision> {
        match self {
            Requirement::Authenticated if !actor.is_authenticated() => {
                Some(Decision::Deny(Denial::Unauthenticated))
            }
            Requirement::Confirmed if actor.user().is_some_and(|u| !u.confirmed) => {
                Some(Decision::Redirect(RouteId::Unconfirmed))
            }
            Requirement::Permission(p) if !actor.can(*p) => Some(Decision::Deny(Denial::Forbidden)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    Forbidden,
}

/// Outcome of the gate. The HTTP layer turns redirects and denials into
/// responses; the gate itself never touches the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Redirect(RouteId),
    Deny(Denial),
}

/// Evaluate the policy of `route` for `actor`.
pub fn evaluate(actor: &Actor, route: RouteId) -> Decision {
    evaluate_policy(actor, &route.policy())
}

pub fn evaluate_policy(actor: &Actor, policy: &RoutePolicy) -> Decision {
    policy
        .requirements()
        .iter()
        .find_map(|req| req.check(actor))
        .unwrap_or(Decision::Proceed)
}
