use std::cmp::Ordering as CmpOrdering;
use std::fmt::{Display, Formatter};

use crate::db::DbPool;
use crate::domain::booking::{Booking, BookingStatus, BookingType};
use crate::domain::types::{BookingCode, BookingId, CustomerId, UserName};
use crate::repository::errors::RepositoryResult;

pub mod booking;
pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod fixtures;
#[cfg(any(test, feature = "test-mocks"))]
pub mod in_memory;
#[cfg(feature = "test-mocks")]
pub mod mock;

/// Diesel-backed booking store sharing one connection pool.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// A single condition over a booking document. Conditions in a query are
/// combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `type == <value>`
    TypeIs(BookingType),
    /// `customerId == <value>`
    CustomerIs(CustomerId),
    /// `bookingCode == <value>`
    BookingCodeIs(BookingCode),
    /// `user.userName == <value>`
    UserNameIs(UserName),
    /// `status == <value>`
    StatusIs(BookingStatus),
    /// `bookingDate >= <epoch ms>`
    BookedFrom(i64),
    /// `bookingDate <= <epoch ms>`
    BookedUntil(i64),
}

impl Predicate {
    /// Evaluates the predicate against a document.
    pub fn matches(&self, booking: &Booking) -> bool {
        let details = &booking.details;
        match self {
            Predicate::TypeIs(booking_type) => details.booking_type == *booking_type,
            Predicate::CustomerIs(customer_id) => details.customer_id == *customer_id,
            Predicate::BookingCodeIs(code) => details.booking_code == code.as_str(),
            Predicate::UserNameIs(user_name) => details.user.user_name == user_name.as_str(),
            Predicate::StatusIs(status) => details.status == *status,
            Predicate::BookedFrom(from) => details.booking_date >= *from,
            Predicate::BookedUntil(until) => details.booking_date <= *until,
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::TypeIs(value) => write!(f, "type == {value}"),
            Predicate::CustomerIs(value) => write!(f, "customerId == {value}"),
            Predicate::BookingCodeIs(value) => write!(f, "bookingCode == {value}"),
            Predicate::UserNameIs(value) => write!(f, "user.userName == {value}"),
            Predicate::StatusIs(value) => write!(f, "status == {value}"),
            Predicate::BookedFrom(value) => write!(f, "bookingDate >= {value}"),
            Predicate::BookedUntil(value) => write!(f, "bookingDate <= {value}"),
        }
    }
}

/// Result ordering. Without an explicit order the store returns documents by
/// ascending document key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryOrder {
    #[default]
    DocumentKey,
    /// `ORDER BY bookingDate DESC`, ties broken by descending document key.
    BookingDateDesc,
}

impl QueryOrder {
    /// Compares two documents by this ordering.
    pub fn compare(self, a: &PageCursor, b: &PageCursor) -> CmpOrdering {
        match self {
            QueryOrder::DocumentKey => a.id.cmp(&b.id),
            QueryOrder::BookingDateDesc => b
                .booking_date
                .cmp(&a.booking_date)
                .then_with(|| b.id.cmp(&a.id)),
        }
    }
}

/// Position of a document within an ordered result, used as a keyset cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub booking_date: i64,
    pub id: BookingId,
}

impl From<&Booking> for PageCursor {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_date: booking.details.booking_date,
            id: booking.details.id.clone(),
        }
    }
}

/// Slice of the ordered result a query asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Window {
    /// The first `limit` documents.
    First(usize),
    /// Up to `limit` documents strictly after the cursor (`startAfter`).
    After(PageCursor, usize),
    /// Up to `limit` documents strictly before the cursor (`endBefore` with
    /// limit-to-last); still returned in query order.
    Before(PageCursor, usize),
}

/// Structured query over the booking collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookingQuery {
    predicates: Vec<Predicate>,
    order: QueryOrder,
    window: Option<Window>,
}

impl BookingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn order_by_booking_date_desc(mut self) -> Self {
        self.order = QueryOrder::BookingDateDesc;
        self
    }

    pub fn window(mut self, window: Window) -> Self {
        self.window = Some(window);
        self
    }

    /// Same predicates and ordering without any window: the full result set.
    pub fn unbounded(&self) -> Self {
        Self {
            window: None,
            ..self.clone()
        }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn order(&self) -> QueryOrder {
        self.order
    }

    pub fn current_window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    /// Evaluates the whole query over an in-memory collection.
    pub fn evaluate<'a, I>(&self, bookings: I) -> Vec<Booking>
    where
        I: IntoIterator<Item = &'a Booking>,
    {
        let mut matching: Vec<Booking> = bookings
            .into_iter()
            .filter(|booking| self.predicates.iter().all(|p| p.matches(booking)))
            .cloned()
            .collect();
        let order = self.order;
        matching.sort_by(|a, b| order.compare(&PageCursor::from(a), &PageCursor::from(b)));

        match &self.window {
            None => matching,
            Some(Window::First(limit)) => matching.into_iter().take(*limit).collect(),
            Some(Window::After(cursor, limit)) => matching
                .into_iter()
                .filter(|b| order.compare(&PageCursor::from(b), cursor) == CmpOrdering::Greater)
                .take(*limit)
                .collect(),
            Some(Window::Before(cursor, limit)) => {
                let before: Vec<Booking> = matching
                    .into_iter()
                    .filter(|b| order.compare(&PageCursor::from(b), cursor) == CmpOrdering::Less)
                    .collect();
                let skip = before.len().saturating_sub(*limit);
                before.into_iter().skip(skip).collect()
            }
        }
    }
}

impl Display for BookingQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let predicates = self
            .predicates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" AND ");
        f.write_str(&predicates)?;
        if self.order == QueryOrder::BookingDateDesc {
            f.write_str(" ORDER BY bookingDate DESC")?;
        }
        match &self.window {
            None => Ok(()),
            Some(Window::First(limit)) => write!(f, " LIMIT {limit}"),
            Some(Window::After(cursor, limit)) => {
                write!(f, " START AFTER {} LIMIT {limit}", cursor.id)
            }
            Some(Window::Before(cursor, limit)) => {
                write!(f, " END BEFORE {} LIMIT {limit}", cursor.id)
            }
        }
    }
}

pub trait BookingReader {
    /// Runs the query and returns the matching documents in query order.
    fn list_bookings(&self, query: &BookingQuery) -> RepositoryResult<Vec<Booking>>;
}

pub trait BookingWriter {
    /// Inserts or replaces documents by key, returning the affected count.
    fn upsert_bookings(&self, bookings: &[Booking]) -> RepositoryResult<usize>;
    fn delete_booking(&self, id: &BookingId) -> RepositoryResult<()>;
}
