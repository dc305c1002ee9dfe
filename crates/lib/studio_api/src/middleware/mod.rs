//! Request middleware: actor resolution and per-route access gating.

pub mod access;
pub mod session;
