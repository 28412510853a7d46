//! Authentication middleware: Bearer token extraction and JWT verification.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use skylog_core::models::auth::TokenClaims;

use crate::AppState;
use crate::error::AppError;

/// Key used to store `TokenClaims` in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenClaims);

/// Axum middleware: passes the `Authorization` header to the authenticator
/// and injects `AuthenticatedUser` into request extensions.
///
/// Header values that are not valid UTF-8 count as a missing credential.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let claims = state.authenticator.authenticate(header)?;

    request.extensions_mut().insert(AuthenticatedUser(claims));

    Ok(next.run(request).await)
}
