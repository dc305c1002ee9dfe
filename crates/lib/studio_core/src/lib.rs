//! # studio_core
//!
//! Core domain logic for Studio: accounts, confirmation, access control
//! and the class catalog. Nothing in here knows about HTTP.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod mail;
pub mod migrate;
pub mod models;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
