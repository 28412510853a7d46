//! Request and response bodies (camelCase on the wire).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skylog_core::models::auth::{Identity, Role};
use skylog_core::models::flight::{Coordinates, Flight, FlightStatus, NewFlight};
use skylog_core::models::journal::{Comment, Journal};
use skylog_core::models::memo::Memo;
use uuid::Uuid;

/// Error body returned for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCodeRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// Public view of an identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub avatar: Option<String>,
    pub is_verified: bool,
}

impl From<&Identity> for UserResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            name: identity.name.clone(),
            email: identity.email.clone(),
            role: identity.role,
            avatar: identity.avatar.clone(),
            is_verified: identity.is_verified,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Journals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalUpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub location: Option<String>,
    /// Replaces the image list when present.
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub journal_id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for CommentResponse {
    fn from(c: &Comment) -> Self {
        Self {
            id: c.id,
            journal_id: c.journal_id,
            owner_id: c.owner_id,
            content: c.content.clone(),
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub location: Option<String>,
    pub images: Vec<String>,
    pub likes: Vec<Uuid>,
    pub like_count: usize,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Journal> for JournalResponse {
    fn from(j: &Journal) -> Self {
        Self {
            id: j.id,
            owner_id: j.owner_id,
            title: j.title.clone(),
            content: j.content.clone(),
            location: j.location.clone(),
            images: j.images.clone(),
            likes: j.likes.clone(),
            like_count: j.likes.len(),
            comments: j.comments.iter().map(CommentResponse::from).collect(),
            created_at: j.created_at,
            updated_at: j.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalListResponse {
    pub items: Vec<JournalResponse>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: usize,
}

// ---------------------------------------------------------------------------
// Flights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRequest {
    #[serde(default)]
    pub flight_number: Option<String>,
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_longitude: f64,
    pub departure_latitude: f64,
    pub arrival_longitude: f64,
    pub arrival_latitude: f64,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub airline: Option<String>,
}

impl From<FlightRequest> for NewFlight {
    fn from(req: FlightRequest) -> Self {
        NewFlight {
            flight_number: req.flight_number,
            departure_city: req.departure_city,
            arrival_city: req.arrival_city,
            departure_airport: req.departure_airport,
            arrival_airport: req.arrival_airport,
            departure: Coordinates {
                longitude: req.departure_longitude,
                latitude: req.departure_latitude,
            },
            arrival: Coordinates {
                longitude: req.arrival_longitude,
                latitude: req.arrival_latitude,
            },
            date: req.date,
            airline: req.airline,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub flight_number: String,
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_coords: Coordinates,
    pub arrival_coords: Coordinates,
    pub date: DateTime<Utc>,
    pub airline: Option<String>,
    pub status: FlightStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Flight> for FlightResponse {
    fn from(f: &Flight) -> Self {
        Self {
            id: f.id,
            owner_id: f.owner_id,
            flight_number: f.flight_number.clone(),
            departure_city: f.departure_city.clone(),
            arrival_city: f.arrival_city.clone(),
            departure_airport: f.departure_airport.clone(),
            arrival_airport: f.arrival_airport.clone(),
            departure_coords: f.departure,
            arrival_coords: f.arrival,
            date: f.date,
            airline: f.airline.clone(),
            status: f.status,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightListResponse {
    pub items: Vec<FlightResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightStatusRequest {
    pub status: FlightStatus,
}

// ---------------------------------------------------------------------------
// Memos
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoUpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Memo> for MemoResponse {
    fn from(m: &Memo) -> Self {
        Self {
            id: m.id,
            owner_id: m.owner_id,
            title: m.title.clone(),
            content: m.content.clone(),
            completed: m.completed,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoListResponse {
    pub items: Vec<MemoResponse>,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Record counts for the signed-in identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatsResponse {
    pub flights: u64,
    pub journals: u64,
    pub memos: u64,
}
