//! Domain aggregates exposed by the booking report layer.

pub mod booking;
pub mod report_row;
pub mod types;
