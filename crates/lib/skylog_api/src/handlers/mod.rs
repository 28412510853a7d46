//! Request handlers.

pub mod auth;
pub mod flights;
pub mod health;
pub mod journals;
pub mod memos;
pub mod users;
