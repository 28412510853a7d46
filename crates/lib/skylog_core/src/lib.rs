//! # skylog_core
//!
//! Core domain logic for Skylog: identities, bearer-token auth,
//! resource ownership, and the stores behind them.

pub mod auth;
pub mod migrate;
pub mod models;
pub mod store;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
