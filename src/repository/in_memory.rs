//! Process-local booking store evaluating queries with the same semantics as
//! the database-backed one. Used by service tests.

use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::domain::booking::Booking;
use crate::domain::types::BookingId;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{BookingQuery, BookingReader, BookingWriter};

#[derive(Default)]
pub struct InMemoryRepository {
    bookings: Mutex<Vec<Booking>>,
    failing: AtomicBool,
    queries: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new(bookings: Vec<Booking>) -> Self {
        Self {
            bookings: Mutex::new(bookings),
            ..Self::default()
        }
    }

    /// Makes every following query fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of queries served so far, failed ones included.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl BookingReader for InMemoryRepository {
    fn list_bookings(&self, query: &BookingQuery) -> RepositoryResult<Vec<Booking>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::ConnectionError(
                "store unavailable".to_string(),
            ));
        }
        let bookings = self.bookings.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(query.evaluate(bookings.iter()))
    }
}

impl BookingWriter for InMemoryRepository {
    fn upsert_bookings(&self, new_bookings: &[Booking]) -> RepositoryResult<usize> {
        let mut bookings = self.bookings.lock().unwrap_or_else(PoisonError::into_inner);
        for booking in new_bookings {
            bookings.retain(|existing| existing.id() != booking.id());
            bookings.push(booking.clone());
        }
        Ok(new_bookings.len())
    }

    fn delete_booking(&self, id: &BookingId) -> RepositoryResult<()> {
        let mut bookings = self.bookings.lock().unwrap_or_else(PoisonError::into_inner);
        let before = bookings.len();
        bookings.retain(|existing| existing.id() != id);
        if bookings.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
