//! Journal service: entries, comments and likes.
//!
//! Any signed-in identity can read entries, comment and like. Only the owner
//! may edit or delete an entry. A comment may be removed by its author or by
//! the owner of the entry it sits on.

use skylog_core::auth::ownership::{Owned, require_any_owner, require_owner};
use skylog_core::models::auth::TokenClaims;
use skylog_core::models::journal::{Comment, Journal, JournalUpdate, NewJournal};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{
    CommentRequest, CommentResponse, JournalListResponse, JournalRequest, JournalResponse,
    JournalUpdateRequest, LikeResponse, ListQuery,
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp paging parameters into `(limit, offset)`.
pub fn page(query: &ListQuery) -> (i64, i64) {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);
    (limit, offset)
}

async fn load(state: &AppState, id: Uuid) -> AppResult<Journal> {
    state
        .stores
        .journals
        .get_journal(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Journal not found".into()))
}

pub async fn list(state: &AppState, query: &ListQuery) -> AppResult<JournalListResponse> {
    let (limit, offset) = page(query);
    let journals = state.stores.journals.list_journals(limit, offset).await?;
    Ok(JournalListResponse {
        items: journals.iter().map(JournalResponse::from).collect(),
        limit,
        offset,
    })
}

/// The caller's own entries, newest first.
pub async fn list_mine(
    state: &AppState,
    claims: &TokenClaims,
    query: &ListQuery,
) -> AppResult<JournalListResponse> {
    let (limit, offset) = page(query);
    let journals = state
        .stores
        .journals
        .list_journals_by_owner(claims.sub, limit, offset)
        .await?;
    Ok(JournalListResponse {
        items: journals.iter().map(JournalResponse::from).collect(),
        limit,
        offset,
    })
}

pub async fn get(state: &AppState, id: Uuid) -> AppResult<JournalResponse> {
    let journal = load(state, id).await?;
    Ok(JournalResponse::from(&journal))
}

pub async fn create(
    state: &AppState,
    claims: &TokenClaims,
    req: JournalRequest,
) -> AppResult<JournalResponse> {
    let title = req.title.trim();
    let content = req.content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(AppError::Validation("Title and content are required".into()));
    }
    let draft = NewJournal {
        title: title.to_string(),
        content: content.to_string(),
        location: req.location.filter(|l| !l.trim().is_empty()),
        images: req.images,
    };
    let journal = state
        .stores
        .journals
        .insert_journal(Journal::new(claims.sub, draft))
        .await?;
    info!(journal_id = %journal.id, owner = %claims.sub, "journal created");
    Ok(JournalResponse::from(&journal))
}

pub async fn update(
    state: &AppState,
    claims: &TokenClaims,
    id: Uuid,
    req: JournalUpdateRequest,
) -> AppResult<JournalResponse> {
    let mut journal = load(state, id).await?;
    require_owner(claims, &journal)?;

    JournalUpdate {
        title: req.title,
        content: req.content,
        location: req.location,
        images: req.images,
    }
    .apply(&mut journal);

    let journal = state.stores.journals.update_journal(journal).await?;
    Ok(JournalResponse::from(&journal))
}

pub async fn delete(state: &AppState, claims: &TokenClaims, id: Uuid) -> AppResult<()> {
    let journal = load(state, id).await?;
    require_owner(claims, &journal)?;
    if !state.stores.journals.delete_journal(id).await? {
        return Err(AppError::NotFound("Journal not found".into()));
    }
    info!(journal_id = %id, "journal deleted");
    Ok(())
}

pub async fn add_comment(
    state: &AppState,
    claims: &TokenClaims,
    journal_id: Uuid,
    req: CommentRequest,
) -> AppResult<CommentResponse> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Comment content is required".into()));
    }
    let journal = load(state, journal_id).await?;
    let comment = state
        .stores
        .journals
        .add_comment(Comment::new(journal.id, claims.sub, content.to_string()))
        .await?;
    Ok(CommentResponse::from(&comment))
}

pub async fn delete_comment(
    state: &AppState,
    claims: &TokenClaims,
    journal_id: Uuid,
    comment_id: Uuid,
) -> AppResult<()> {
    let journal = load(state, journal_id).await?;
    let comment = journal
        .comment(comment_id)
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
    require_any_owner(claims, &[comment as &dyn Owned, &journal])?;

    if !state
        .stores
        .journals
        .delete_comment(journal_id, comment_id)
        .await?
    {
        return Err(AppError::NotFound("Comment not found".into()));
    }
    Ok(())
}

pub async fn toggle_like(
    state: &AppState,
    claims: &TokenClaims,
    journal_id: Uuid,
) -> AppResult<LikeResponse> {
    load(state, journal_id).await?;
    let like = state
        .stores
        .journals
        .toggle_like(journal_id, claims.sub)
        .await?;
    Ok(LikeResponse {
        liked: like.liked,
        like_count: like.count,
    })
}
