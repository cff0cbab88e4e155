use diesel::prelude::*;

use crate::domain::booking::Booking as DomainBooking;
use crate::domain::types::BookingId;
use crate::repository::errors::RepositoryError;

#[derive(Debug, Clone, Queryable)]
/// Stored booking: the document key and the full JSON document, selected as
/// `(bookings::id, bookings::document)`.
pub struct Booking {
    pub id: String,
    pub document: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::bookings)]
/// Insertable form of a booking. The scalar columns are projections of the
/// document used for filtering and ordering.
pub struct NewBooking<'a> {
    pub id: &'a str,
    pub booking_code: &'a str,
    pub customer_id: i64,
    pub booking_type: &'a str,
    pub booking_date: i64,
    pub status: &'a str,
    pub user_name: &'a str,
    pub document: String,
}

impl TryFrom<Booking> for DomainBooking {
    type Error = RepositoryError;

    fn try_from(record: Booking) -> Result<Self, Self::Error> {
        let mut booking: DomainBooking = serde_json::from_str(&record.document)?;
        // The row key is authoritative over whatever the document carries.
        booking.details.id = BookingId::new(record.id)
            .map_err(|e| RepositoryError::MalformedDocument(e.to_string()))?;
        Ok(booking)
    }
}

impl<'a> TryFrom<&'a DomainBooking> for NewBooking<'a> {
    type Error = RepositoryError;

    fn try_from(booking: &'a DomainBooking) -> Result<Self, Self::Error> {
        let details = &booking.details;
        Ok(Self {
            id: details.id.as_str(),
            booking_code: details.booking_code.as_str(),
            customer_id: details.customer_id.get(),
            booking_type: details.booking_type.as_str(),
            booking_date: details.booking_date,
            status: details.status.as_str(),
            user_name: details.user.user_name.as_str(),
            document: serde_json::to_string(booking)?,
        })
    }
}
