use destino_ferias_admin::domain::booking::{BookingStatus, BookingType, StoredStatus};
use destino_ferias_admin::domain::types::{BookingCode, BookingId, CustomerId, UserName};
use destino_ferias_admin::models::booking::NewBooking;
use destino_ferias_admin::repository::errors::RepositoryError;
use destino_ferias_admin::repository::{
    BookingQuery, BookingReader, BookingWriter, DieselRepository, PageCursor, Predicate, Window,
};
use destino_ferias_admin::schema::bookings;
use diesel::prelude::*;

mod common;

fn ids(bookings: &[destino_ferias_admin::domain::booking::Booking]) -> Vec<String> {
    bookings.iter().map(|b| b.id().to_string()).collect()
}

#[test]
fn test_booking_repository_crud() {
    let test_db = common::TestDb::new("test_booking_repository_crud.db");
    let repo = DieselRepository::new(test_db.pool());

    let hotel = common::booking("h1", BookingType::Hotel, 42, 1_000);
    let car = common::booking("c1", BookingType::Car, 42, 2_000);
    assert_eq!(repo.upsert_bookings(&[hotel.clone(), car]).unwrap(), 2);

    let query = BookingQuery::new().filter(Predicate::TypeIs(BookingType::Hotel));
    let found = repo.list_bookings(&query).unwrap();
    assert_eq!(found, vec![hotel.clone()]);

    let mut cancelled = hotel.clone();
    cancelled.details.status = BookingStatus::Cancelled.into();
    repo.upsert_bookings(&[cancelled]).unwrap();

    let found = repo.list_bookings(&query).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].details.status, BookingStatus::Cancelled);

    repo.delete_booking(hotel.id()).unwrap();
    assert!(repo.list_bookings(&query).unwrap().is_empty());
    assert!(matches!(
        repo.delete_booking(hotel.id()),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_predicates_are_combined_with_and() {
    let test_db = common::TestDb::new("test_predicates_are_combined_with_and.db");
    let repo = DieselRepository::new(test_db.pool());

    let mut other_user = common::booking("e2", BookingType::Experience, 42, 2_000);
    other_user.details.user.user_name = "bruno".to_string();
    let mut other_code = common::booking("e3", BookingType::Experience, 42, 3_000);
    other_code.details.booking_code = "ZZZ".to_string();
    repo.upsert_bookings(&[
        common::booking("e1", BookingType::Experience, 42, 1_000),
        other_user,
        other_code,
        common::booking("e4", BookingType::Experience, 7, 4_000),
        common::booking("f1", BookingType::Flight, 42, 5_000),
    ])
    .unwrap();

    let base = BookingQuery::new()
        .filter(Predicate::TypeIs(BookingType::Experience))
        .filter(Predicate::CustomerIs(CustomerId::new(42).unwrap()));

    let by_user = base
        .clone()
        .filter(Predicate::UserNameIs(UserName::new("ana").unwrap()));
    assert_eq!(ids(&repo.list_bookings(&by_user).unwrap()), ["e1", "e3"]);

    let by_code = base
        .clone()
        .filter(Predicate::BookingCodeIs(BookingCode::new("ZZZ").unwrap()));
    assert_eq!(ids(&repo.list_bookings(&by_code).unwrap()), ["e3"]);

    let by_range = base
        .clone()
        .filter(Predicate::BookedFrom(2_000))
        .filter(Predicate::BookedUntil(3_000));
    assert_eq!(ids(&repo.list_bookings(&by_range).unwrap()), ["e2", "e3"]);

    let by_status = base.filter(Predicate::StatusIs(BookingStatus::Cancelled));
    assert!(repo.list_bookings(&by_status).unwrap().is_empty());
}

#[test]
fn test_booking_date_order_breaks_ties_by_descending_key() {
    let test_db = common::TestDb::new("test_booking_date_order_ties.db");
    let repo = DieselRepository::new(test_db.pool());

    repo.upsert_bookings(&[
        common::booking("a", BookingType::Car, 42, 1_000),
        common::booking("b", BookingType::Car, 42, 2_000),
        common::booking("c", BookingType::Car, 42, 2_000),
        common::booking("d", BookingType::Car, 42, 500),
    ])
    .unwrap();

    let ordered = BookingQuery::new()
        .filter(Predicate::TypeIs(BookingType::Car))
        .order_by_booking_date_desc();
    assert_eq!(
        ids(&repo.list_bookings(&ordered).unwrap()),
        ["c", "b", "a", "d"]
    );

    let unordered = BookingQuery::new().filter(Predicate::TypeIs(BookingType::Car));
    assert_eq!(
        ids(&repo.list_bookings(&unordered).unwrap()),
        ["a", "b", "c", "d"]
    );
}

#[test]
fn test_windows_match_in_memory_evaluation() {
    let test_db = common::TestDb::new("test_windows_match_in_memory.db");
    let repo = DieselRepository::new(test_db.pool());

    let mut series = common::experience_series(12);
    // Duplicate dates exercise the key tie-break at page boundaries.
    series[5].details.booking_date = series[4].details.booking_date;
    series[6].details.booking_date = series[4].details.booking_date;
    repo.upsert_bookings(&series).unwrap();

    let base = BookingQuery::new()
        .filter(Predicate::TypeIs(BookingType::Experience))
        .order_by_booking_date_desc();
    let cursor = PageCursor::from(&series[5]);

    let windows = [
        Window::First(4),
        Window::After(cursor.clone(), 4),
        Window::Before(cursor.clone(), 4),
        Window::Before(PageCursor::from(&series[1]), 4),
        Window::After(PageCursor::from(&series[11]), 4),
    ];
    for window in windows {
        let query = base.clone().window(window);
        assert_eq!(
            repo.list_bookings(&query).unwrap(),
            query.evaluate(series.iter()),
            "{query}"
        );
    }
}

#[test]
fn test_before_window_returns_closest_documents_in_query_order() {
    let test_db = common::TestDb::new("test_before_window_query_order.db");
    let repo = DieselRepository::new(test_db.pool());
    let series = common::experience_series(10);
    repo.upsert_bookings(&series).unwrap();

    let query = BookingQuery::new()
        .filter(Predicate::TypeIs(BookingType::Experience))
        .order_by_booking_date_desc()
        .window(Window::Before(PageCursor::from(&series[6]), 3));

    assert_eq!(
        ids(&repo.list_bookings(&query).unwrap()),
        ["exp-0003", "exp-0004", "exp-0005"]
    );
}

#[test]
fn test_row_key_overrides_document_id() {
    let test_db = common::TestDb::new("test_row_key_overrides_document_id.db");
    let pool = test_db.pool();
    let repo = DieselRepository::new(pool.clone());

    let booking = common::booking("inside-document", BookingType::Hotel, 42, 1_000);
    let mut record = NewBooking::try_from(&booking).unwrap();
    record.id = "row-key";
    insert_raw(&pool, &record);

    let found = repo.list_bookings(&BookingQuery::new()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), &BookingId::new("row-key").unwrap());
}

fn insert_raw(pool: &destino_ferias_admin::db::DbPool, record: &NewBooking<'_>) {
    let mut conn = pool.get().unwrap();
    diesel::insert_into(bookings::table)
        .values(record)
        .execute(&mut conn)
        .unwrap();
}

#[test]
fn test_unreadable_document_is_skipped() {
    let test_db = common::TestDb::new("test_unreadable_document_is_skipped.db");
    let pool = test_db.pool();
    let repo = DieselRepository::new(pool.clone());

    let readable = common::booking("readable", BookingType::Hotel, 42, 2_000);
    repo.upsert_bookings(&[readable.clone()]).unwrap();
    let broken = common::booking("broken", BookingType::Hotel, 42, 1_000);
    let mut record = NewBooking::try_from(&broken).unwrap();
    record.document = "{\"bookingCode\": 1}".to_string();
    insert_raw(&pool, &record);

    let found = repo.list_bookings(&BookingQuery::new()).unwrap();
    assert_eq!(found, vec![readable]);
}

#[test]
fn test_unknown_status_is_listed_as_stored() {
    let test_db = common::TestDb::new("test_unknown_status_is_listed_as_stored.db");
    let pool = test_db.pool();
    let repo = DieselRepository::new(pool.clone());

    repo.upsert_bookings(&common::experience_series(4)).unwrap();
    let waiting = common::booking("waiting", BookingType::Experience, 42, 1_000);
    let mut document = serde_json::to_value(&waiting).unwrap();
    document["status"] = serde_json::json!("Aguardando");
    let mut record = NewBooking::try_from(&waiting).unwrap();
    record.status = "Aguardando";
    record.document = document.to_string();
    insert_raw(&pool, &record);

    let query = BookingQuery::new()
        .filter(Predicate::TypeIs(BookingType::Experience))
        .order_by_booking_date_desc();
    let found = repo.list_bookings(&query).unwrap();
    assert_eq!(found.len(), 5);
    assert_eq!(
        found[4].details.status,
        StoredStatus::Other("Aguardando".to_string())
    );

    let issued = query.filter(Predicate::StatusIs(BookingStatus::Issued));
    assert_eq!(repo.list_bookings(&issued).unwrap().len(), 4);
}
