//! Persistence boundary.
//!
//! Each concern gets a small async trait. Two backends implement all of
//! them: [`memory::InMemoryStore`] for tests and single-process runs, and
//! [`postgres::PgStore`] backed by a `PgPool`.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::Identity;
use crate::models::flight::{Flight, FlightStatus};
use crate::models::journal::{Comment, Journal, LikeState};
use crate::models::memo::Memo;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Identity records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Identity>>;

    /// Lookup by email. Callers need not normalize; implementations do.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>>;

    /// Insert or update by id. Fails with `Conflict` when another identity
    /// already holds the email.
    async fn save(&self, identity: Identity) -> StoreResult<Identity>;
}

/// Journal entries with their comments and likes.
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Newest first.
    async fn list_journals(&self, limit: i64, offset: i64) -> StoreResult<Vec<Journal>>;

    /// Entries written by `owner_id`, newest first.
    async fn list_journals_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Journal>>;

    async fn count_journals_by_owner(&self, owner_id: Uuid) -> StoreResult<u64>;

    async fn get_journal(&self, id: Uuid) -> StoreResult<Option<Journal>>;

    async fn insert_journal(&self, journal: Journal) -> StoreResult<Journal>;

    /// Persist title, content, location, images and `updated_at`.
    async fn update_journal(&self, journal: Journal) -> StoreResult<Journal>;

    /// Returns whether a journal was removed. Comments and likes go with it.
    async fn delete_journal(&self, id: Uuid) -> StoreResult<bool>;

    async fn add_comment(&self, comment: Comment) -> StoreResult<Comment>;

    async fn delete_comment(&self, journal_id: Uuid, comment_id: Uuid) -> StoreResult<bool>;

    /// Add the like if absent, remove it if present.
    async fn toggle_like(&self, journal_id: Uuid, user_id: Uuid) -> StoreResult<LikeState>;
}

/// Logged flights.
#[async_trait]
pub trait FlightStore: Send + Sync {
    /// Flights owned by `owner_id`, latest flight date first.
    async fn list_flights(&self, owner_id: Uuid) -> StoreResult<Vec<Flight>>;

    async fn get_flight(&self, id: Uuid) -> StoreResult<Option<Flight>>;

    async fn insert_flight(&self, flight: Flight) -> StoreResult<Flight>;

    /// Persist every mutable field. `None` if the flight is gone.
    async fn update_flight(&self, flight: Flight) -> StoreResult<Option<Flight>>;

    async fn update_flight_status(
        &self,
        id: Uuid,
        status: FlightStatus,
    ) -> StoreResult<Option<Flight>>;

    async fn delete_flight(&self, id: Uuid) -> StoreResult<bool>;

    async fn count_flights(&self, owner_id: Uuid) -> StoreResult<u64>;
}

/// Travel memo checklists.
#[async_trait]
pub trait MemoStore: Send + Sync {
    /// Memos owned by `owner_id`, newest first.
    async fn list_memos(&self, owner_id: Uuid) -> StoreResult<Vec<Memo>>;

    async fn get_memo(&self, id: Uuid) -> StoreResult<Option<Memo>>;

    async fn insert_memo(&self, memo: Memo) -> StoreResult<Memo>;

    /// Persist title, content, completion and `updated_at`. `None` if the
    /// memo is gone.
    async fn update_memo(&self, memo: Memo) -> StoreResult<Option<Memo>>;

    async fn delete_memo(&self, id: Uuid) -> StoreResult<bool>;

    async fn count_memos(&self, owner_id: Uuid) -> StoreResult<u64>;
}

/// The set of stores a running service uses.
#[derive(Clone)]
pub struct Stores {
    pub credentials: Arc<dyn CredentialStore>,
    pub journals: Arc<dyn JournalStore>,
    pub flights: Arc<dyn FlightStore>,
    pub memos: Arc<dyn MemoStore>,
}

impl Stores {
    /// All stores backed by one shared in-memory store.
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::InMemoryStore::new());
        Self {
            credentials: store.clone(),
            journals: store.clone(),
            flights: store.clone(),
            memos: store,
        }
    }

    /// All stores backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(postgres::PgStore::new(pool));
        Self {
            credentials: store.clone(),
            journals: store.clone(),
            flights: store.clone(),
            memos: store,
        }
    }
}
