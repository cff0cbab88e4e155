//! Flat, one-row-per-passenger view of bookings used by the report table and
//! the CSV export.

use serde::Serialize;

use crate::domain::booking::{Booking, BookingDetails, Passenger, TripTotals};

/// One passenger of one booking, flattened next to the booking fields.
///
/// `totals` is only populated on the first passenger row of a booking, so a
/// booking's monetary values appear exactly once in the report. Summing a
/// column across rows counts each booking once, not once per passenger.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedRow {
    #[serde(flatten)]
    pub details: BookingDetails,
    pub passenger_name: Option<String>,
    pub passenger_last_name: Option<String>,
    pub passenger_email: Option<String>,
    pub passenger_phone: Option<String>,
    pub passenger_document_type: Option<String>,
    pub passenger_document_id: Option<String>,
    pub passenger_birthdate: Option<String>,
    pub passenger_address: Option<String>,
    #[serde(flatten)]
    pub totals: Option<TripTotals>,
}

impl ExpandedRow {
    fn new(details: &BookingDetails, passenger: &Passenger, totals: Option<TripTotals>) -> Self {
        let Passenger {
            name,
            last_name,
            email,
            phone,
            document_type,
            document_id,
            birthdate,
            address,
        } = passenger.clone();

        Self {
            details: details.clone(),
            passenger_name: name,
            passenger_last_name: last_name,
            passenger_email: email,
            passenger_phone: phone,
            passenger_document_type: document_type,
            passenger_document_id: document_id,
            passenger_birthdate: birthdate,
            passenger_address: address,
            totals,
        }
    }
}

/// Expands bookings into report rows, preserving booking and passenger order.
///
/// A booking without passengers contributes no rows.
pub fn expand_bookings(bookings: &[Booking]) -> Vec<ExpandedRow> {
    bookings
        .iter()
        .flat_map(|booking| {
            booking
                .passengers
                .iter()
                .enumerate()
                .map(|(index, passenger)| {
                    let totals = (index == 0).then(|| booking.totals.clone());
                    ExpandedRow::new(&booking.details, passenger, totals)
                })
        })
        .collect()
}
