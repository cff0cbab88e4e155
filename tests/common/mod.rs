#![allow(dead_code)]

use destino_ferias_admin::db::{DbPool, establish_connection_pool};
use destino_ferias_admin::domain::booking::{
    Booking, BookingDetails, BookingStatus, BookingType, BookingUser, Passenger, TripTotals,
};
use destino_ferias_admin::domain::types::{BookingId, CustomerId};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tempfile::TempDir;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// SQLite database in a temporary directory, migrated and removed on drop.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("create pool");
        let mut conn = pool.get().expect("get connection");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("run migrations");
        Self { _dir: dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

pub fn booking(
    id: &str,
    booking_type: BookingType,
    customer_id: i64,
    booking_date: i64,
) -> Booking {
    Booking {
        details: BookingDetails {
            id: BookingId::new(id).unwrap(),
            booking_code: format!("CODE-{id}"),
            customer_id: CustomerId::new(customer_id).unwrap(),
            booking_type,
            campaign_name: Some("Verão".to_string()),
            customer_name: Some("Empresa".to_string()),
            booking_date,
            status: BookingStatus::Issued.into(),
            user: BookingUser {
                user_name: "ana".to_string(),
            },
            locator: Some("LOC1".to_string()),
            purchase_id: None,
            description: None,
            date: None,
        },
        totals: TripTotals {
            points_total_value: Some(100.0),
            cash_total_value: Some(50.0),
            cash_price: None,
        },
        passengers: vec![Passenger {
            name: Some("Ana".to_string()),
            last_name: Some("Silva".to_string()),
            ..Passenger::default()
        }],
    }
}

/// `count` experience bookings of customer 42 with strictly decreasing dates.
pub fn experience_series(count: usize) -> Vec<Booking> {
    (0..count)
        .map(|i| {
            booking(
                &format!("exp-{i:04}"),
                BookingType::Experience,
                42,
                1_700_000_000_000 - (i as i64) * 60_000,
            )
        })
        .collect()
}
