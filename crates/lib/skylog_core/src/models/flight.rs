//! Logged flight models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::ownership::Owned;
use crate::uuid::uuidv7;

/// Flight lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightStatus {
    #[default]
    Scheduled,
    Departed,
    Arrived,
    Cancelled,
}

impl FlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "scheduled",
            FlightStatus::Departed => "departed",
            FlightStatus::Arrived => "arrived",
            FlightStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(FlightStatus::Scheduled),
            "departed" => Ok(FlightStatus::Departed),
            "arrived" => Ok(FlightStatus::Arrived),
            "cancelled" => Ok(FlightStatus::Cancelled),
            other => Err(format!("unknown flight status '{other}'")),
        }
    }
}

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.longitude) && (-90.0..=90.0).contains(&self.latitude)
    }
}

/// A flight logged by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub flight_number: String,
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure: Coordinates,
    pub arrival: Coordinates,
    pub date: DateTime<Utc>,
    pub airline: Option<String>,
    pub status: FlightStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flight {
    pub fn new(owner_id: Uuid, draft: NewFlight) -> Self {
        let now = Utc::now();
        Self {
            id: uuidv7(),
            owner_id,
            flight_number: draft
                .flight_number
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(generate_flight_number),
            departure_city: draft.departure_city,
            arrival_city: draft.arrival_city,
            departure_airport: draft.departure_airport,
            arrival_airport: draft.arrival_airport,
            departure: draft.departure,
            arrival: draft.arrival,
            date: draft.date,
            airline: draft.airline,
            status: FlightStatus::Scheduled,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Flight {
    /// Overwrite the descriptive fields from `draft`, keeping id, owner and
    /// status. An omitted flight number keeps the current one.
    pub fn apply_draft(&mut self, draft: NewFlight) {
        if let Some(number) = draft.flight_number.filter(|n| !n.trim().is_empty()) {
            self.flight_number = number;
        }
        self.departure_city = draft.departure_city;
        self.arrival_city = draft.arrival_city;
        self.departure_airport = draft.departure_airport;
        self.arrival_airport = draft.arrival_airport;
        self.departure = draft.departure;
        self.arrival = draft.arrival;
        self.date = draft.date;
        self.airline = draft.airline;
        self.updated_at = Utc::now();
    }
}

impl Owned for Flight {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Fields supplied when logging a flight.
#[derive(Debug, Clone)]
pub struct NewFlight {
    pub flight_number: Option<String>,
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure: Coordinates,
    pub arrival: Coordinates,
    pub date: DateTime<Utc>,
    pub airline: Option<String>,
}

impl NewFlight {
    /// Check required fields and coordinate ranges.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("departureCity", &self.departure_city),
            ("arrivalCity", &self.arrival_city),
            ("departureAirport", &self.departure_airport),
            ("arrivalAirport", &self.arrival_airport),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(format!("{field} is required"));
            }
        }
        if !self.departure.is_valid() {
            return Err("departure coordinates out of range".into());
        }
        if !self.arrival.is_valid() {
            return Err("arrival coordinates out of range".into());
        }
        Ok(())
    }
}

/// `FL` followed by four random digits.
pub fn generate_flight_number() -> String {
    format!("FL{:04}", rng().random_range(0..10_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewFlight {
        NewFlight {
            flight_number: None,
            departure_city: "Shanghai".into(),
            arrival_city: "Tokyo".into(),
            departure_airport: "PVG".into(),
            arrival_airport: "HND".into(),
            departure: Coordinates { longitude: 121.8, latitude: 31.1 },
            arrival: Coordinates { longitude: 139.8, latitude: 35.5 },
            date: Utc::now(),
            airline: Some("ANA".into()),
        }
    }

    #[test]
    fn generated_flight_number_shape() {
        let number = generate_flight_number();
        assert_eq!(number.len(), 6);
        assert!(number.starts_with("FL"));
        assert!(number[2..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn new_flight_defaults() {
        let flight = Flight::new(uuidv7(), draft());
        assert_eq!(flight.status, FlightStatus::Scheduled);
        assert!(flight.flight_number.starts_with("FL"));
    }

    #[test]
    fn explicit_flight_number_is_kept() {
        let mut d = draft();
        d.flight_number = Some("NH920".into());
        assert_eq!(Flight::new(uuidv7(), d).flight_number, "NH920");
    }

    #[test]
    fn apply_draft_keeps_number_and_status() {
        let mut flight = Flight::new(uuidv7(), draft());
        flight.status = FlightStatus::Departed;
        let number = flight.flight_number.clone();

        let mut d = draft();
        d.arrival_city = "Osaka".into();
        d.arrival_airport = "KIX".into();
        flight.apply_draft(d);
        assert_eq!(flight.arrival_city, "Osaka");
        assert_eq!(flight.flight_number, number);
        assert_eq!(flight.status, FlightStatus::Departed);

        let mut d = draft();
        d.flight_number = Some("MU521".into());
        flight.apply_draft(d);
        assert_eq!(flight.flight_number, "MU521");
    }

    #[test]
    fn validate_rejects_bad_coordinates() {
        let mut d = draft();
        d.arrival.latitude = 91.0;
        assert!(d.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_city() {
        let mut d = draft();
        d.departure_city = " ".into();
        assert_eq!(d.validate(), Err("departureCity is required".into()));
    }

    #[test]
    fn status_parses() {
        assert_eq!("arrived".parse::<FlightStatus>(), Ok(FlightStatus::Arrived));
        assert!("delayed".parse::<FlightStatus>().is_err());
    }
}
