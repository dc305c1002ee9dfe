//! Service layer — orchestrates core calls on behalf of handlers.

pub mod auth;
pub mod cookies;
pub mod navigation;
