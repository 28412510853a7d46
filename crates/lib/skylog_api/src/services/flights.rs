//! Flight log service. Flights are private to their owner.

use skylog_core::auth::ownership::require_owner;
use skylog_core::models::auth::TokenClaims;
use skylog_core::models::flight::{Flight, FlightStatus, NewFlight};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{FlightListResponse, FlightRequest, FlightResponse};

/// Load a flight and check that the requester owns it.
async fn load_owned(state: &AppState, claims: &TokenClaims, id: Uuid) -> AppResult<Flight> {
    let flight = state
        .stores
        .flights
        .get_flight(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".into()))?;
    require_owner(claims, &flight)?;
    Ok(flight)
}

pub async fn list(state: &AppState, claims: &TokenClaims) -> AppResult<FlightListResponse> {
    let flights = state.stores.flights.list_flights(claims.sub).await?;
    Ok(FlightListResponse {
        items: flights.iter().map(FlightResponse::from).collect(),
    })
}

pub async fn get(state: &AppState, claims: &TokenClaims, id: Uuid) -> AppResult<FlightResponse> {
    let flight = load_owned(state, claims, id).await?;
    Ok(FlightResponse::from(&flight))
}

pub async fn create(
    state: &AppState,
    claims: &TokenClaims,
    req: FlightRequest,
) -> AppResult<FlightResponse> {
    let draft = NewFlight::from(req);
    draft.validate().map_err(AppError::Validation)?;
    let flight = state
        .stores
        .flights
        .insert_flight(Flight::new(claims.sub, draft))
        .await?;
    info!(flight_id = %flight.id, number = %flight.flight_number, "flight logged");
    Ok(FlightResponse::from(&flight))
}

/// Replace the descriptive fields of a flight. Status is changed separately.
pub async fn update(
    state: &AppState,
    claims: &TokenClaims,
    id: Uuid,
    req: FlightRequest,
) -> AppResult<FlightResponse> {
    let mut flight = load_owned(state, claims, id).await?;
    let draft = NewFlight::from(req);
    draft.validate().map_err(AppError::Validation)?;
    flight.apply_draft(draft);
    let flight = state
        .stores
        .flights
        .update_flight(flight)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".into()))?;
    info!(flight_id = %flight.id, "flight updated");
    Ok(FlightResponse::from(&flight))
}

pub async fn update_status(
    state: &AppState,
    claims: &TokenClaims,
    id: Uuid,
    status: FlightStatus,
) -> AppResult<FlightResponse> {
    load_owned(state, claims, id).await?;
    let flight = state
        .stores
        .flights
        .update_flight_status(id, status)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".into()))?;
    Ok(FlightResponse::from(&flight))
}

pub async fn delete(state: &AppState, claims: &TokenClaims, id: Uuid) -> AppResult<()> {
    load_owned(state, claims, id).await?;
    if !state.stores.flights.delete_flight(id).await? {
        return Err(AppError::NotFound("Flight not found".into()));
    }
    info!(flight_id = %id, "flight deleted");
    Ok(())
}
