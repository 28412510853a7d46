//! Business logic behind the handlers.

pub mod auth;
pub mod flights;
pub mod journals;
pub mod memos;
pub mod users;
