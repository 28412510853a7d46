//! Travel memo service. Memos are private checklists; only the owner sees
//! or changes them.

use skylog_core::auth::ownership::require_owner;
use skylog_core::models::auth::TokenClaims;
use skylog_core::models::memo::{Memo, MemoUpdate};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{MemoListResponse, MemoRequest, MemoResponse, MemoUpdateRequest};

async fn load_owned(state: &AppState, claims: &TokenClaims, id: Uuid) -> AppResult<Memo> {
    let memo = state
        .stores
        .memos
        .get_memo(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Memo not found".into()))?;
    require_owner(claims, &memo)?;
    Ok(memo)
}

pub async fn list(state: &AppState, claims: &TokenClaims) -> AppResult<MemoListResponse> {
    let memos = state.stores.memos.list_memos(claims.sub).await?;
    Ok(MemoListResponse {
        items: memos.iter().map(MemoResponse::from).collect(),
    })
}

pub async fn create(
    state: &AppState,
    claims: &TokenClaims,
    req: MemoRequest,
) -> AppResult<MemoResponse> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }
    let memo = state
        .stores
        .memos
        .insert_memo(Memo::new(claims.sub, title.to_string(), req.content))
        .await?;
    info!(memo_id = %memo.id, owner = %claims.sub, "memo created");
    Ok(MemoResponse::from(&memo))
}

pub async fn update(
    state: &AppState,
    claims: &TokenClaims,
    id: Uuid,
    req: MemoUpdateRequest,
) -> AppResult<MemoResponse> {
    let mut memo = load_owned(state, claims, id).await?;
    MemoUpdate {
        title: req.title,
        content: req.content,
        completed: req.completed,
    }
    .apply(&mut memo);

    let memo = state
        .stores
        .memos
        .update_memo(memo)
        .await?
        .ok_or_else(|| AppError::NotFound("Memo not found".into()))?;
    Ok(MemoResponse::from(&memo))
}

pub async fn delete(state: &AppState, claims: &TokenClaims, id: Uuid) -> AppResult<()> {
    load_owned(state, claims, id).await?;
    if !state.stores.memos.delete_memo(id).await? {
        return Err(AppError::NotFound("Memo not found".into()));
    }
    info!(memo_id = %id, "memo deleted");
    Ok(())
}
