//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::booking::Booking;
use crate::domain::types::BookingId;
use crate::repository::errors::RepositoryResult;
use crate::repository::{BookingQuery, BookingReader, BookingWriter};

mock! {
    pub Repository {}

    impl BookingReader for Repository {
        fn list_bookings(&self, query: &BookingQuery) -> RepositoryResult<Vec<Booking>>;
    }

    impl BookingWriter for Repository {
        fn upsert_bookings(&self, bookings: &[Booking]) -> RepositoryResult<usize>;
        fn delete_booking(&self, id: &BookingId) -> RepositoryResult<()>;
    }
}
