//! DTO modules that bridge services with templates.

pub mod bookings;
