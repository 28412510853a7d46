//! Domain models.
//!
//! These are internal domain models, distinct from the API request/response
//! types in `skylog_api` (which carry `#[serde(rename_all = "camelCase")]`).

pub mod auth;
pub mod flight;
pub mod journal;
pub mod memo;
