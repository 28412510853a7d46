//! Per-user summaries.

use skylog_core::models::auth::TokenClaims;

use crate::AppState;
use crate::error::AppResult;
use crate::models::UserStatsResponse;

/// How many flights, journal entries and memos the caller owns.
pub async fn stats(state: &AppState, claims: &TokenClaims) -> AppResult<UserStatsResponse> {
    let owner = claims.sub;
    Ok(UserStatsResponse {
        flights: state.stores.flights.count_flights(owner).await?,
        journals: state.stores.journals.count_journals_by_owner(owner).await?,
        memos: state.stores.memos.count_memos(owner).await?,
    })
}
