pub mod booking_list;
pub mod bookings;
pub mod errors;
pub mod export;
pub mod filter;
pub mod pagination;
pub mod query_builder;
pub mod registry;

pub use errors::{ServiceError, ServiceResult};
