//! Builders for booking documents used across service tests.

use crate::domain::booking::{
    Booking, BookingDetails, BookingStatus, BookingType, BookingUser, Passenger, TripTotals,
};
use crate::domain::types::{BookingId, CustomerId};

pub struct BookingFixture(Booking);

impl BookingFixture {
    pub fn new(id: &str, booking_type: BookingType, customer_id: i64, booking_date: i64) -> Self {
        Self(Booking {
            details: BookingDetails {
                id: BookingId::new(id).expect("fixture id"),
                booking_code: format!("CODE-{id}"),
                customer_id: CustomerId::new(customer_id).expect("fixture customer"),
                booking_type,
                campaign_name: Some("Campanha".to_string()),
                customer_name: Some("Empresa".to_string()),
                booking_date,
                status: BookingStatus::Confirmed.into(),
                user: BookingUser {
                    user_name: "user".to_string(),
                },
                locator: None,
                purchase_id: None,
                description: None,
                date: None,
            },
            totals: TripTotals::default(),
            passengers: vec![Passenger {
                name: Some(format!("Passenger {id}")),
                ..Passenger::default()
            }],
        })
    }

    pub fn code(mut self, code: &str) -> Self {
        self.0.details.booking_code = code.to_string();
        self
    }

    pub fn status(mut self, status: BookingStatus) -> Self {
        self.0.details.status = status.into();
        self
    }

    pub fn user(mut self, user_name: &str) -> Self {
        self.0.details.user.user_name = user_name.to_string();
        self
    }

    pub fn totals(mut self, points: f64, cash: f64, price: f64) -> Self {
        self.0.totals = TripTotals {
            points_total_value: Some(points),
            cash_total_value: Some(cash),
            cash_price: Some(price),
        };
        self
    }

    pub fn passengers(mut self, names: &[&str]) -> Self {
        self.0.passengers = names
            .iter()
            .map(|name| Passenger {
                name: Some(name.to_string()),
                last_name: Some("Lima".to_string()),
                ..Passenger::default()
            })
            .collect();
        self
    }

    pub fn build(self) -> Booking {
        self.0
    }
}

/// `count` experience bookings of customer 42, one passenger each, with
/// strictly decreasing booking dates as the index grows.
pub fn experience_series(count: usize) -> Vec<Booking> {
    (0..count)
        .map(|i| {
            let date = 1_700_000_000_000 - (i as i64) * 60_000;
            BookingFixture::new(&format!("exp-{i:04}"), BookingType::Experience, 42, date).build()
        })
        .collect()
}
