//! User summary handlers.

use axum::extract::State;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::UserStatsResponse;
use crate::services::users;

/// `GET /api/user/stats`
pub async fn user_stats_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
) -> AppResult<Json<UserStatsResponse>> {
    let resp = users::stats(&state, &claims).await?;
    Ok(Json(resp))
}
