//! Flight log request handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use skylog_core::uuid::parse_id;
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{FlightListResponse, FlightRequest, FlightResponse, FlightStatusRequest};
use crate::services::flights;

fn flight_id(raw: &str) -> AppResult<Uuid> {
    parse_id(raw).ok_or_else(|| AppError::NotFound("Flight not found".into()))
}

/// `GET /api/flights`: the caller's flights.
pub async fn list_flights_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
) -> AppResult<Json<FlightListResponse>> {
    let resp = flights::list(&state, &claims).await?;
    Ok(Json(resp))
}

/// `POST /api/flights`
pub async fn create_flight_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Json(body): Json<FlightRequest>,
) -> AppResult<(StatusCode, Json<FlightResponse>)> {
    let resp = flights::create(&state, &claims, body).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `GET /api/flights/{id}`
pub async fn get_flight_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<FlightResponse>> {
    let resp = flights::get(&state, &claims, flight_id(&id)?).await?;
    Ok(Json(resp))
}

/// `PUT /api/flights/{id}`: owner only.
pub async fn update_flight_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<FlightRequest>,
) -> AppResult<Json<FlightResponse>> {
    let resp = flights::update(&state, &claims, flight_id(&id)?, body).await?;
    Ok(Json(resp))
}

/// `PATCH /api/flights/{id}/status`
pub async fn update_flight_status_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<FlightStatusRequest>,
) -> AppResult<Json<FlightResponse>> {
    let resp = flights::update_status(&state, &claims, flight_id(&id)?, body.status).await?;
    Ok(Json(resp))
}

/// `DELETE /api/flights/{id}`
pub async fn delete_flight_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    flights::delete(&state, &claims, flight_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
