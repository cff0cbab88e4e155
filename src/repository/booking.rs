use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;

use crate::db::get_connection;
use crate::domain::booking::Booking;
use crate::domain::types::BookingId;
use crate::models::booking::{Booking as DbBooking, NewBooking as DbNewBooking};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    BookingQuery, BookingReader, BookingWriter, DieselRepository, PageCursor, Predicate,
    QueryOrder, Window,
};
use crate::schema::bookings;

type BoxedBookings<'a> = bookings::BoxedQuery<'a, Sqlite, (Text, Text)>;

fn apply_predicate<'a>(query: BoxedBookings<'a>, predicate: &'a Predicate) -> BoxedBookings<'a> {
    match predicate {
        Predicate::TypeIs(booking_type) => {
            query.filter(bookings::booking_type.eq(booking_type.as_str()))
        }
        Predicate::CustomerIs(customer_id) => {
            query.filter(bookings::customer_id.eq(customer_id.get()))
        }
        Predicate::BookingCodeIs(code) => query.filter(bookings::booking_code.eq(code.as_str())),
        Predicate::UserNameIs(user_name) => {
            query.filter(bookings::user_name.eq(user_name.as_str()))
        }
        Predicate::StatusIs(status) => query.filter(bookings::status.eq(status.as_str())),
        Predicate::BookedFrom(from) => query.filter(bookings::booking_date.ge(*from)),
        Predicate::BookedUntil(until) => query.filter(bookings::booking_date.le(*until)),
    }
}

/// Keeps documents strictly after `cursor` in query order.
fn start_after<'a>(
    query: BoxedBookings<'a>,
    order: QueryOrder,
    cursor: &'a PageCursor,
) -> BoxedBookings<'a> {
    match order {
        QueryOrder::DocumentKey => query.filter(bookings::id.gt(cursor.id.as_str())),
        QueryOrder::BookingDateDesc => query.filter(
            bookings::booking_date.lt(cursor.booking_date).or(bookings::booking_date
                .eq(cursor.booking_date)
                .and(bookings::id.lt(cursor.id.as_str()))),
        ),
    }
}

/// Keeps documents strictly before `cursor` in query order.
fn end_before<'a>(
    query: BoxedBookings<'a>,
    order: QueryOrder,
    cursor: &'a PageCursor,
) -> BoxedBookings<'a> {
    match order {
        QueryOrder::DocumentKey => query.filter(bookings::id.lt(cursor.id.as_str())),
        QueryOrder::BookingDateDesc => query.filter(
            bookings::booking_date.gt(cursor.booking_date).or(bookings::booking_date
                .eq(cursor.booking_date)
                .and(bookings::id.gt(cursor.id.as_str()))),
        ),
    }
}

/// Orders the query, optionally in reverse so a limit takes the documents
/// closest to an `end_before` cursor.
fn ordered(query: BoxedBookings<'_>, order: QueryOrder, reversed: bool) -> BoxedBookings<'_> {
    match (order, reversed) {
        (QueryOrder::DocumentKey, false) => query.order(bookings::id.asc()),
        (QueryOrder::DocumentKey, true) => query.order(bookings::id.desc()),
        (QueryOrder::BookingDateDesc, false) => {
            query.order((bookings::booking_date.desc(), bookings::id.desc()))
        }
        (QueryOrder::BookingDateDesc, true) => {
            query.order((bookings::booking_date.asc(), bookings::id.asc()))
        }
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl BookingReader for DieselRepository {
    fn list_bookings(&self, query: &BookingQuery) -> RepositoryResult<Vec<Booking>> {
        let mut conn = get_connection(&self.pool)?;

        let mut items: BoxedBookings = bookings::table
            .select((bookings::id, bookings::document))
            .into_boxed();
        for predicate in query.predicates() {
            items = apply_predicate(items, predicate);
        }

        let order = query.order();
        let (items, reversed) = match query.current_window() {
            None => (ordered(items, order, false), false),
            Some(Window::First(limit)) => (
                ordered(items, order, false).limit(sql_limit(*limit)),
                false,
            ),
            Some(Window::After(cursor, limit)) => (
                ordered(start_after(items, order, cursor), order, false).limit(sql_limit(*limit)),
                false,
            ),
            Some(Window::Before(cursor, limit)) => (
                ordered(end_before(items, order, cursor), order, true).limit(sql_limit(*limit)),
                true,
            ),
        };

        let mut records = items.load::<DbBooking>(&mut conn)?;
        if reversed {
            records.reverse();
        }

        // Documents are written by another system; one unreadable document
        // must not hide the rest of the result.
        Ok(records
            .into_iter()
            .filter_map(|record| {
                let id = record.id.clone();
                Booking::try_from(record)
                    .map_err(|err| log::warn!("Skipping unreadable booking {id}: {err}"))
                    .ok()
            })
            .collect())
    }
}

impl BookingWriter for DieselRepository {
    fn upsert_bookings(&self, new_bookings: &[Booking]) -> RepositoryResult<usize> {
        let mut conn = get_connection(&self.pool)?;
        let insertables = new_bookings
            .iter()
            .map(DbNewBooking::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let mut affected = 0;
            for insertable in &insertables {
                affected += diesel::replace_into(bookings::table)
                    .values(insertable)
                    .execute(conn)?;
            }
            Ok(affected)
        })
    }

    fn delete_booking(&self, id: &BookingId) -> RepositoryResult<()> {
        let mut conn = get_connection(&self.pool)?;

        let deleted = diesel::delete(bookings::table.find(id.as_str())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
