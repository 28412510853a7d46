//! In-memory store backend.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use super::{CredentialStore, FlightStore, JournalStore, MemoStore, StoreError, StoreResult};
use crate::models::auth::{Identity, normalize_email};
use crate::models::flight::{Flight, FlightStatus};
use crate::models::journal::{Comment, Journal, LikeState};
use crate::models::memo::Memo;

/// Every record kept in sharded concurrent maps.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    identities: DashMap<Uuid, Identity>,
    /// Normalized email → identity id.
    emails: DashMap<String, Uuid>,
    journals: DashMap<Uuid, Journal>,
    flights: DashMap<Uuid, Flight>,
    memos: DashMap<Uuid, Memo>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first, ties broken by id, then one page.
fn page_newest_first(mut journals: Vec<Journal>, limit: i64, offset: i64) -> Vec<Journal> {
    journals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    journals
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Identity>> {
        Ok(self.identities.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let Some(id) = self.emails.get(&normalize_email(email)).map(|r| *r.value()) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn save(&self, mut identity: Identity) -> StoreResult<Identity> {
        identity.email = normalize_email(&identity.email);
        match self.emails.entry(identity.email.clone()) {
            Entry::Occupied(e) if *e.get() != identity.id => {
                return Err(StoreError::Conflict(format!(
                    "email '{}' already registered",
                    identity.email
                )));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(e) => {
                e.insert(identity.id);
            }
        }
        if let Some(previous) = self.identities.insert(identity.id, identity.clone())
            && previous.email != identity.email
        {
            self.emails.remove(&previous.email);
        }
        Ok(identity)
    }
}

#[async_trait]
impl JournalStore for InMemoryStore {
    async fn list_journals(&self, limit: i64, offset: i64) -> StoreResult<Vec<Journal>> {
        let journals = self.journals.iter().map(|r| r.value().clone()).collect();
        Ok(page_newest_first(journals, limit, offset))
    }

    async fn list_journals_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Journal>> {
        let journals = self
            .journals
            .iter()
            .filter(|r| r.value().owner_id == owner_id)
            .map(|r| r.value().clone())
            .collect();
        Ok(page_newest_first(journals, limit, offset))
    }

    async fn count_journals_by_owner(&self, owner_id: Uuid) -> StoreResult<u64> {
        Ok(self
            .journals
            .iter()
            .filter(|r| r.value().owner_id == owner_id)
            .count() as u64)
    }

    async fn get_journal(&self, id: Uuid) -> StoreResult<Option<Journal>> {
        Ok(self.journals.get(&id).map(|r| r.value().clone()))
    }

    async fn insert_journal(&self, journal: Journal) -> StoreResult<Journal> {
        self.journals.insert(journal.id, journal.clone());
        Ok(journal)
    }

    async fn update_journal(&self, journal: Journal) -> StoreResult<Journal> {
        let mut stored = self
            .journals
            .get_mut(&journal.id)
            .ok_or_else(|| StoreError::Corrupt(format!("journal {} vanished", journal.id)))?;
        stored.title = journal.title;
        stored.content = journal.content;
        stored.location = journal.location;
        stored.images = journal.images;
        stored.updated_at = journal.updated_at;
        Ok(stored.clone())
    }

    async fn delete_journal(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.journals.remove(&id).is_some())
    }

    async fn add_comment(&self, comment: Comment) -> StoreResult<Comment> {
        let mut journal = self.journals.get_mut(&comment.journal_id).ok_or_else(|| {
            StoreError::Corrupt(format!("journal {} vanished", comment.journal_id))
        })?;
        journal.comments.push(comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, journal_id: Uuid, comment_id: Uuid) -> StoreResult<bool> {
        let Some(mut journal) = self.journals.get_mut(&journal_id) else {
            return Ok(false);
        };
        let before = journal.comments.len();
        journal.comments.retain(|c| c.id != comment_id);
        Ok(journal.comments.len() < before)
    }

    async fn toggle_like(&self, journal_id: Uuid, user_id: Uuid) -> StoreResult<LikeState> {
        let mut journal = self
            .journals
            .get_mut(&journal_id)
            .ok_or_else(|| StoreError::Corrupt(format!("journal {journal_id} vanished")))?;
        let liked = if journal.is_liked_by(user_id) {
            journal.likes.retain(|id| *id != user_id);
            false
        } else {
            journal.likes.push(user_id);
            true
        };
        Ok(LikeState {
            liked,
            count: journal.likes.len(),
        })
    }
}

#[async_trait]
impl FlightStore for InMemoryStore {
    async fn list_flights(&self, owner_id: Uuid) -> StoreResult<Vec<Flight>> {
        let mut flights: Vec<Flight> = self
            .flights
            .iter()
            .filter(|r| r.value().owner_id == owner_id)
            .map(|r| r.value().clone())
            .collect();
        flights.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(flights)
    }

    async fn get_flight(&self, id: Uuid) -> StoreResult<Option<Flight>> {
        Ok(self.flights.get(&id).map(|r| r.value().clone()))
    }

    async fn insert_flight(&self, flight: Flight) -> StoreResult<Flight> {
        self.flights.insert(flight.id, flight.clone());
        Ok(flight)
    }

    async fn update_flight_status(
        &self,
        id: Uuid,
        status: FlightStatus,
    ) -> StoreResult<Option<Flight>> {
        Ok(self.flights.get_mut(&id).map(|mut flight| {
            flight.status = status;
            flight.updated_at = chrono::Utc::now();
            flight.clone()
        }))
    }

    async fn update_flight(&self, flight: Flight) -> StoreResult<Option<Flight>> {
        Ok(self.flights.get_mut(&flight.id).map(|mut stored| {
            *stored = flight;
            stored.clone()
        }))
    }

    async fn delete_flight(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.flights.remove(&id).is_some())
    }

    async fn count_flights(&self, owner_id: Uuid) -> StoreResult<u64> {
        Ok(self
            .flights
            .iter()
            .filter(|r| r.value().owner_id == owner_id)
            .count() as u64)
    }
}

#[async_trait]
impl MemoStore for InMemoryStore {
    async fn list_memos(&self, owner_id: Uuid) -> StoreResult<Vec<Memo>> {
        let mut memos: Vec<Memo> = self
            .memos
            .iter()
            .filter(|r| r.value().owner_id == owner_id)
            .map(|r| r.value().clone())
            .collect();
        memos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(memos)
    }

    async fn get_memo(&self, id: Uuid) -> StoreResult<Option<Memo>> {
        Ok(self.memos.get(&id).map(|r| r.value().clone()))
    }

    async fn insert_memo(&self, memo: Memo) -> StoreResult<Memo> {
        self.memos.insert(memo.id, memo.clone());
        Ok(memo)
    }

    async fn update_memo(&self, memo: Memo) -> StoreResult<Option<Memo>> {
        Ok(self.memos.get_mut(&memo.id).map(|mut stored| {
            stored.title = memo.title;
            stored.content = memo.content;
            stored.completed = memo.completed;
            stored.updated_at = memo.updated_at;
            stored.clone()
        }))
    }

    async fn delete_memo(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.memos.remove(&id).is_some())
    }

    async fn count_memos(&self, owner_id: Uuid) -> StoreResult<u64> {
        Ok(self
            .memos
            .iter()
            .filter(|r| r.value().owner_id == owner_id)
            .count() as u64)
    }
}
