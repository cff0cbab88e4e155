//! Booking documents as stored by the reservation backend.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::types::{BookingId, CustomerId};

/// Raised when the caller hands over a booking type that has no mapping.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("unknown booking type: {0}")]
    UnknownBookingType(String),
}

/// Product category of a booking, as persisted in the `type` field.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingType {
    Flight,
    Hotel,
    Car,
    Experience,
}

impl BookingType {
    /// Stored representation of the type.
    pub const fn as_str(self) -> &'static str {
        match self {
            BookingType::Flight => "FLIGHT",
            BookingType::Hotel => "HOTEL",
            BookingType::Car => "CAR",
            BookingType::Experience => "EXPERIENCE",
        }
    }

    /// Label shown in the report's "Tipo" column.
    pub const fn translated(self) -> &'static str {
        match self {
            BookingType::Flight => "AÉREO",
            BookingType::Hotel => "HOTEL",
            BookingType::Car => "CARRO",
            BookingType::Experience => "EXPERIÊNCIA",
        }
    }
}

impl Display for BookingType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route segment selecting which booking type a list shows.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingRoute {
    Experiencias,
    Aereo,
    Hotel,
    Carro,
}

impl BookingRoute {
    pub const ALL: [BookingRoute; 4] = [
        BookingRoute::Experiencias,
        BookingRoute::Aereo,
        BookingRoute::Hotel,
        BookingRoute::Carro,
    ];

    pub const fn slug(self) -> &'static str {
        match self {
            BookingRoute::Experiencias => "experiencias",
            BookingRoute::Aereo => "aereo",
            BookingRoute::Hotel => "hotel",
            BookingRoute::Carro => "carro",
        }
    }

    /// Stored booking type the route lists.
    pub const fn booking_type(self) -> BookingType {
        match self {
            BookingRoute::Experiencias => BookingType::Experience,
            BookingRoute::Aereo => BookingType::Flight,
            BookingRoute::Hotel => BookingType::Hotel,
            BookingRoute::Carro => BookingType::Car,
        }
    }

    /// Human readable title used in page headings and export filenames.
    pub const fn title(self) -> &'static str {
        match self {
            BookingRoute::Experiencias => "Experiências",
            BookingRoute::Aereo => "Aéreo",
            BookingRoute::Hotel => "Hotel",
            BookingRoute::Carro => "Carro",
        }
    }
}

impl Display for BookingRoute {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for BookingRoute {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingRoute::ALL
            .into_iter()
            .find(|route| route.slug() == s)
            .ok_or_else(|| ConfigurationError::UnknownBookingType(s.to_string()))
    }
}

/// Lifecycle status of a booking.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "EMITIDO")]
    Issued,
    #[serde(rename = "EXPIRADO")]
    Expired,
    #[serde(rename = "FINALIZADO")]
    Finished,
    #[serde(rename = "CANCELADO")]
    Cancelled,
    #[serde(rename = "CONFIRMADO")]
    Confirmed,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 6] = [
        BookingStatus::Pending,
        BookingStatus::Issued,
        BookingStatus::Expired,
        BookingStatus::Finished,
        BookingStatus::Cancelled,
        BookingStatus::Confirmed,
    ];

    /// Stored representation of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pendente",
            BookingStatus::Issued => "EMITIDO",
            BookingStatus::Expired => "EXPIRADO",
            BookingStatus::Finished => "FINALIZADO",
            BookingStatus::Cancelled => "CANCELADO",
            BookingStatus::Confirmed => "CONFIRMADO",
        }
    }

    /// Label shown in the status filter select.
    pub const fn label(self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pendente",
            BookingStatus::Issued => "Emitido",
            BookingStatus::Expired => "Expirado",
            BookingStatus::Finished => "Finalizado",
            BookingStatus::Cancelled => "Cancelado",
            BookingStatus::Confirmed => "Confirmado",
        }
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown booking status: {s}"))
    }
}

/// Status as found on a stored document. Values outside the known vocabulary
/// are kept verbatim and rendered as stored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StoredStatus {
    Known(BookingStatus),
    Other(String),
}

impl StoredStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StoredStatus::Known(status) => status.as_str(),
            StoredStatus::Other(raw) => raw,
        }
    }
}

impl From<BookingStatus> for StoredStatus {
    fn from(status: BookingStatus) -> Self {
        StoredStatus::Known(status)
    }
}

impl PartialEq<BookingStatus> for StoredStatus {
    fn eq(&self, other: &BookingStatus) -> bool {
        matches!(self, StoredStatus::Known(status) if status == other)
    }
}

impl Display for StoredStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner of the booking, embedded in the document.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingUser {
    pub user_name: String,
}

/// A traveller listed on a booking.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub document_type: Option<String>,
    pub document_id: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
}

/// Trip-level monetary totals. They belong to the booking, not to passengers.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripTotals {
    pub points_total_value: Option<f64>,
    pub cash_total_value: Option<f64>,
    pub cash_price: Option<f64>,
}

/// Every booking field except passengers and monetary totals.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub id: BookingId,
    pub booking_code: String,
    pub customer_id: CustomerId,
    #[serde(rename = "type")]
    pub booking_type: BookingType,
    pub campaign_name: Option<String>,
    pub customer_name: Option<String>,
    /// Epoch milliseconds.
    pub booking_date: i64,
    pub status: StoredStatus,
    pub user: BookingUser,
    pub locator: Option<String>,
    pub purchase_id: Option<String>,
    pub description: Option<String>,
    /// Epoch milliseconds of the trip or experience.
    pub date: Option<i64>,
}

/// Booking document. Serializes to the same camelCase shape the store keeps.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    #[serde(flatten)]
    pub details: BookingDetails,
    #[serde(flatten)]
    pub totals: TripTotals,
    #[serde(default)]
    pub passengers: Vec<Passenger>,
}

impl Booking {
    pub fn id(&self) -> &BookingId {
        &self.details.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn route_maps_to_stored_type() {
        assert_eq!(
            "experiencias".parse::<BookingRoute>().unwrap().booking_type(),
            BookingType::Experience
        );
        assert_eq!(
            "aereo".parse::<BookingRoute>().unwrap().booking_type(),
            BookingType::Flight
        );
        assert_eq!(
            "hotel".parse::<BookingRoute>().unwrap().booking_type(),
            BookingType::Hotel
        );
        assert_eq!(
            "carro".parse::<BookingRoute>().unwrap().booking_type(),
            BookingType::Car
        );
    }

    #[test]
    fn unknown_route_is_a_configuration_error() {
        assert_eq!(
            "onibus".parse::<BookingRoute>(),
            Err(ConfigurationError::UnknownBookingType("onibus".to_string()))
        );
    }

    #[test]
    fn booking_document_round_trips_through_camel_case_json() {
        let document = json!({
            "id": "doc-1",
            "bookingCode": "X1",
            "customerId": 42,
            "type": "HOTEL",
            "campaignName": "Verão",
            "bookingDate": 1_620_000_000_000i64,
            "status": "Pendente",
            "user": { "userName": "ana" },
            "pointsTotalValue": 100.0,
            "passengers": [{ "name": "Ana", "lastName": "Silva" }]
        });

        let booking: Booking = serde_json::from_value(document).unwrap();

        assert_eq!(booking.details.booking_type, BookingType::Hotel);
        assert_eq!(booking.details.status, BookingStatus::Pending);
        assert_eq!(booking.details.user.user_name, "ana");
        assert_eq!(booking.totals.points_total_value, Some(100.0));
        assert_eq!(booking.totals.cash_price, None);
        assert_eq!(booking.passengers[0].last_name.as_deref(), Some("Silva"));

        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(value["type"], "HOTEL");
        assert_eq!(value["user"]["userName"], "ana");
    }

    #[test]
    fn unknown_stored_status_is_kept_verbatim() {
        let status: StoredStatus = serde_json::from_value(json!("Aguardando")).unwrap();
        assert_eq!(status, StoredStatus::Other("Aguardando".to_string()));
        assert_eq!(status.to_string(), "Aguardando");
        assert_ne!(status, BookingStatus::Pending);

        let known: StoredStatus = serde_json::from_value(json!("EMITIDO")).unwrap();
        assert_eq!(known, BookingStatus::Issued);
        assert_eq!(serde_json::to_value(&known).unwrap(), json!("EMITIDO"));
    }

    #[test]
    fn status_parses_stored_vocabulary() {
        assert_eq!("CANCELADO".parse(), Ok(BookingStatus::Cancelled));
        assert!("cancelado".parse::<BookingStatus>().is_err());
    }
}
