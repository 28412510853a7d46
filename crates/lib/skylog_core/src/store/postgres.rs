//! PostgreSQL store backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{CredentialStore, FlightStore, JournalStore, MemoStore, StoreError, StoreResult};
use crate::models::auth::{Identity, normalize_email};
use crate::models::flight::{Coordinates, Flight, FlightStatus};
use crate::models::journal::{Comment, Journal, LikeState};
use crate::models::memo::Memo;

/// Store backed by a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `COUNT(*)` is never negative.
fn count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or_default()
}

/// Map unique violations to `Conflict`.
fn conflict_or_db(e: sqlx::Error, what: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(format!("{what} already exists"))
        }
        _ => StoreError::Db(e),
    }
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    avatar: Option<String>,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = StoreError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Identity {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(StoreError::Corrupt)?,
            avatar: row.avatar,
            is_verified: row.is_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const IDENTITY_COLUMNS: &str =
    "id, email, name, password_hash, role, avatar, is_verified, created_at, updated_at";

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Identity::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        row.map(Identity::try_from).transpose()
    }

    async fn save(&self, identity: Identity) -> StoreResult<Identity> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r#"
            INSERT INTO users ({IDENTITY_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                name = EXCLUDED.name,
                password_hash = EXCLUDED.password_hash,
                role = EXCLUDED.role,
                avatar = EXCLUDED.avatar,
                is_verified = EXCLUDED.is_verified,
                updated_at = EXCLUDED.updated_at
            RETURNING {IDENTITY_COLUMNS}
            "#
        ))
        .bind(identity.id)
        .bind(normalize_email(&identity.email))
        .bind(&identity.name)
        .bind(&identity.password_hash)
        .bind(identity.role.as_str())
        .bind(&identity.avatar)
        .bind(identity.is_verified)
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_db(e, "email"))?;
        Identity::try_from(row)
    }
}

// ---------------------------------------------------------------------------
// Journals
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct JournalRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    content: String,
    location: Option<String>,
    images: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    journal_id: Uuid,
    owner_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            journal_id: row.journal_id,
            owner_id: row.owner_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

const JOURNAL_COLUMNS: &str =
    "id, owner_id, title, content, location, images, created_at, updated_at";

impl PgStore {
    /// Attach comments and likes to journal rows, preserving row order.
    async fn hydrate(&self, rows: Vec<JournalRow>) -> StoreResult<Vec<Journal>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let comments = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, journal_id, owner_id, content, created_at
            FROM journal_comments
            WHERE journal_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let likes = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT journal_id, user_id FROM journal_likes \
             WHERE journal_id = ANY($1) ORDER BY created_at ASC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut comments_by_journal: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        for row in comments {
            comments_by_journal
                .entry(row.journal_id)
                .or_default()
                .push(row.into());
        }
        let mut likes_by_journal: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (journal_id, user_id) in likes {
            likes_by_journal.entry(journal_id).or_default().push(user_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| Journal {
                comments: comments_by_journal.remove(&row.id).unwrap_or_default(),
                likes: likes_by_journal.remove(&row.id).unwrap_or_default(),
                id: row.id,
                owner_id: row.owner_id,
                title: row.title,
                content: row.content,
                location: row.location,
                images: row.images,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }
}

#[async_trait]
impl JournalStore for PgStore {
    async fn list_journals(&self, limit: i64, offset: i64) -> StoreResult<Vec<Journal>> {
        let rows = sqlx::query_as::<_, JournalRow>(&format!(
            r#"
            SELECT {JOURNAL_COLUMNS}
            FROM journals
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }

    async fn list_journals_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Journal>> {
        let rows = sqlx::query_as::<_, JournalRow>(&format!(
            r#"
            SELECT {JOURNAL_COLUMNS}
            FROM journals
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }

    async fn count_journals_by_owner(&self, owner_id: Uuid) -> StoreResult<u64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM journals WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count(n))
    }

    async fn get_journal(&self, id: Uuid) -> StoreResult<Option<Journal>> {
        let row = sqlx::query_as::<_, JournalRow>(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert_journal(&self, journal: Journal) -> StoreResult<Journal> {
        sqlx::query(&format!(
            "INSERT INTO journals ({JOURNAL_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(journal.id)
        .bind(journal.owner_id)
        .bind(&journal.title)
        .bind(&journal.content)
        .bind(&journal.location)
        .bind(&journal.images)
        .bind(journal.created_at)
        .bind(journal.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_db(e, "journal"))?;
        Ok(journal)
    }

    async fn update_journal(&self, journal: Journal) -> StoreResult<Journal> {
        let result = sqlx::query(
            r#"
            UPDATE journals
            SET title = $1, content = $2, location = $3, images = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(&journal.title)
        .bind(&journal.content)
        .bind(&journal.location)
        .bind(&journal.images)
        .bind(journal.updated_at)
        .bind(journal.id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Corrupt(format!("journal {} vanished", journal.id)));
        }
        self.get_journal(journal.id)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("journal {} vanished", journal.id)))
    }

    async fn delete_journal(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM journals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_comment(&self, comment: Comment) -> StoreResult<Comment> {
        sqlx::query(
            "INSERT INTO journal_comments (id, journal_id, owner_id, content, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(comment.id)
        .bind(comment.journal_id)
        .bind(comment.owner_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, journal_id: Uuid, comment_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM journal_comments WHERE id = $1 AND journal_id = $2")
            .bind(comment_id)
            .bind(journal_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle_like(&self, journal_id: Uuid, user_id: Uuid) -> StoreResult<LikeState> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM journal_likes WHERE journal_id = $1 AND user_id = $2")
            .bind(journal_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        if !removed {
            sqlx::query(
                "INSERT INTO journal_likes (journal_id, user_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(journal_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let likes =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM journal_likes WHERE journal_id = $1")
                .bind(journal_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(LikeState {
            liked: !removed,
            count: usize::try_from(likes).unwrap_or_default(),
        })
    }
}

// ---------------------------------------------------------------------------
// Flights
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    owner_id: Uuid,
    flight_number: String,
    departure_city: String,
    arrival_city: String,
    departure_airport: String,
    arrival_airport: String,
    departure_longitude: f64,
    departure_latitude: f64,
    arrival_longitude: f64,
    arrival_latitude: f64,
    date: DateTime<Utc>,
    airline: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<FlightRow> for Flight {
    type Error = StoreError;

    fn try_from(row: FlightRow) -> Result<Self, Self::Error> {
        Ok(Flight {
            id: row.id,
            owner_id: row.owner_id,
            flight_number: row.flight_number,
            departure_city: row.departure_city,
            arrival_city: row.arrival_city,
            departure_airport: row.departure_airport,
            arrival_airport: row.arrival_airport,
            departure: Coordinates {
                longitude: row.departure_longitude,
                latitude: row.departure_latitude,
            },
            arrival: Coordinates {
                longitude: row.arrival_longitude,
                latitude: row.arrival_latitude,
            },
            date: row.date,
            airline: row.airline,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const FLIGHT_COLUMNS: &str = "id, owner_id, flight_number, departure_city, arrival_city, \
     departure_airport, arrival_airport, departure_longitude, departure_latitude, \
     arrival_longitude, arrival_latitude, date, airline, status, created_at, updated_at";

#[async_trait]
impl FlightStore for PgStore {
    async fn list_flights(&self, owner_id: Uuid) -> StoreResult<Vec<Flight>> {
        let rows = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights WHERE owner_id = $1 ORDER BY date DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Flight::try_from).collect()
    }

    async fn get_flight(&self, id: Uuid) -> StoreResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Flight::try_from).transpose()
    }

    async fn insert_flight(&self, flight: Flight) -> StoreResult<Flight> {
        sqlx::query(&format!(
            "INSERT INTO flights ({FLIGHT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        ))
        .bind(flight.id)
        .bind(flight.owner_id)
        .bind(&flight.flight_number)
        .bind(&flight.departure_city)
        .bind(&flight.arrival_city)
        .bind(&flight.departure_airport)
        .bind(&flight.arrival_airport)
        .bind(flight.departure.longitude)
        .bind(flight.departure.latitude)
        .bind(flight.arrival.longitude)
        .bind(flight.arrival.latitude)
        .bind(flight.date)
        .bind(&flight.airline)
        .bind(flight.status.as_str())
        .bind(flight.created_at)
        .bind(flight.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_db(e, "flight"))?;
        Ok(flight)
    }

    async fn update_flight_status(
        &self,
        id: Uuid,
        status: FlightStatus,
    ) -> StoreResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            "UPDATE flights SET status = $1, updated_at = now() WHERE id = $2 \
             RETURNING {FLIGHT_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Flight::try_from).transpose()
    }

    async fn update_flight(&self, flight: Flight) -> StoreResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            r#"
            UPDATE flights SET
                flight_number = $1,
                departure_city = $2,
                arrival_city = $3,
                departure_airport = $4,
                arrival_airport = $5,
                departure_longitude = $6,
                departure_latitude = $7,
                arrival_longitude = $8,
                arrival_latitude = $9,
                date = $10,
                airline = $11,
                status = $12,
                updated_at = $13
            WHERE id = $14
            RETURNING {FLIGHT_COLUMNS}
            "#
        ))
        .bind(&flight.flight_number)
        .bind(&flight.departure_city)
        .bind(&flight.arrival_city)
        .bind(&flight.departure_airport)
        .bind(&flight.arrival_airport)
        .bind(flight.departure.longitude)
        .bind(flight.departure.latitude)
        .bind(flight.arrival.longitude)
        .bind(flight.arrival.latitude)
        .bind(flight.date)
        .bind(&flight.airline)
        .bind(flight.status.as_str())
        .bind(flight.updated_at)
        .bind(flight.id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Flight::try_from).transpose()
    }

    async fn delete_flight(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM flights WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_flights(&self, owner_id: Uuid) -> StoreResult<u64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM flights WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count(n))
    }
}

// ---------------------------------------------------------------------------
// Memos
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct MemoRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    content: String,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MemoRow> for Memo {
    fn from(row: MemoRow) -> Self {
        Memo {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            content: row.content,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const MEMO_COLUMNS: &str = "id, owner_id, title, content, completed, created_at, updated_at";

#[async_trait]
impl MemoStore for PgStore {
    async fn list_memos(&self, owner_id: Uuid) -> StoreResult<Vec<Memo>> {
        let rows = sqlx::query_as::<_, MemoRow>(&format!(
            "SELECT {MEMO_COLUMNS} FROM memos WHERE owner_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Memo::from).collect())
    }

    async fn get_memo(&self, id: Uuid) -> StoreResult<Option<Memo>> {
        let row = sqlx::query_as::<_, MemoRow>(&format!(
            "SELECT {MEMO_COLUMNS} FROM memos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Memo::from))
    }

    async fn insert_memo(&self, memo: Memo) -> StoreResult<Memo> {
        sqlx::query(&format!(
            "INSERT INTO memos ({MEMO_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(memo.id)
        .bind(memo.owner_id)
        .bind(&memo.title)
        .bind(&memo.content)
        .bind(memo.completed)
        .bind(memo.created_at)
        .bind(memo.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_db(e, "memo"))?;
        Ok(memo)
    }

    async fn update_memo(&self, memo: Memo) -> StoreResult<Option<Memo>> {
        let row = sqlx::query_as::<_, MemoRow>(&format!(
            "UPDATE memos SET title = $1, content = $2, completed = $3, updated_at = $4 \
             WHERE id = $5 RETURNING {MEMO_COLUMNS}"
        ))
        .bind(&memo.title)
        .bind(&memo.content)
        .bind(memo.completed)
        .bind(memo.updated_at)
        .bind(memo.id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Memo::from))
    }

    async fn delete_memo(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM memos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_memos(&self, owner_id: Uuid) -> StoreResult<u64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM memos WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count(n))
    }
}
