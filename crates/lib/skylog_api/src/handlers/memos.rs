//! Travel memo request handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use skylog_core::uuid::parse_id;
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{MemoListResponse, MemoRequest, MemoResponse, MemoUpdateRequest};
use crate::services::memos;

fn memo_id(raw: &str) -> AppResult<Uuid> {
    parse_id(raw).ok_or_else(|| AppError::NotFound("Memo not found".into()))
}

/// `GET /api/memos`: the caller's memos, newest first.
pub async fn list_memos_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
) -> AppResult<Json<MemoListResponse>> {
    let resp = memos::list(&state, &claims).await?;
    Ok(Json(resp))
}

/// `POST /api/memos`
pub async fn create_memo_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Json(body): Json<MemoRequest>,
) -> AppResult<(StatusCode, Json<MemoResponse>)> {
    let resp = memos::create(&state, &claims, body).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `PUT /api/memos/{id}`: title, content or completion.
pub async fn update_memo_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<MemoUpdateRequest>,
) -> AppResult<Json<MemoResponse>> {
    let resp = memos::update(&state, &claims, memo_id(&id)?, body).await?;
    Ok(Json(resp))
}

/// `DELETE /api/memos/{id}`
pub async fn delete_memo_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    memos::delete(&state, &claims, memo_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
