//! Journal request handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use skylog_core::uuid::parse_id;
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    CommentRequest, CommentResponse, JournalListResponse, JournalRequest, JournalResponse,
    JournalUpdateRequest, LikeResponse, ListQuery,
};
use crate::services::journals;

/// Ids that don't parse can't name an existing journal.
fn journal_id(raw: &str) -> AppResult<Uuid> {
    parse_id(raw).ok_or_else(|| AppError::NotFound("Journal not found".into()))
}

/// `GET /api/journals`: newest entries first.
pub async fn list_journals_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<JournalListResponse>> {
    let resp = journals::list(&state, &query).await?;
    Ok(Json(resp))
}

/// `GET /api/journals/mine`: the caller's entries.
pub async fn list_my_journals_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<JournalListResponse>> {
    let resp = journals::list_mine(&state, &claims, &query).await?;
    Ok(Json(resp))
}

/// `POST /api/journals`
pub async fn create_journal_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Json(body): Json<JournalRequest>,
) -> AppResult<(StatusCode, Json<JournalResponse>)> {
    let resp = journals::create(&state, &claims, body).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `GET /api/journals/{id}`
pub async fn get_journal_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<JournalResponse>> {
    let resp = journals::get(&state, journal_id(&id)?).await?;
    Ok(Json(resp))
}

/// `PUT /api/journals/{id}`: owner only.
pub async fn update_journal_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<JournalUpdateRequest>,
) -> AppResult<Json<JournalResponse>> {
    let resp = journals::update(&state, &claims, journal_id(&id)?, body).await?;
    Ok(Json(resp))
}

/// `DELETE /api/journals/{id}`: owner only.
pub async fn delete_journal_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    journals::delete(&state, &claims, journal_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/journals/{id}/comments`
pub async fn add_comment_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<CommentResponse>)> {
    let resp = journals::add_comment(&state, &claims, journal_id(&id)?, body).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `DELETE /api/journals/{id}/comments/{comment_id}`: comment author or
/// journal owner.
pub async fn delete_comment_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Path((id, comment_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let journal = journal_id(&id)?;
    let comment = parse_id(&comment_id)
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
    journals::delete_comment(&state, &claims, journal, comment).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/journals/{id}/like`: toggle the caller's like.
pub async fn toggle_like_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<LikeResponse>> {
    let resp = journals::toggle_like(&state, &claims, journal_id(&id)?).await?;
    Ok(Json(resp))
}
