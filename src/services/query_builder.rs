//! Builds the store queries a booking list runs.

use crate::domain::booking::BookingRoute;
use crate::domain::types::CustomerId;
use crate::repository::{BookingQuery, Predicate};
use crate::services::errors::{ServiceError, ServiceResult};
use crate::services::filter::BookingFilter;

/// Which customers' bookings a viewer may see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    AllCustomers,
    Customer(CustomerId),
}

/// Who is looking at which booking list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookingListContext {
    pub route: BookingRoute,
    pub scope: Scope,
}

impl BookingListContext {
    /// System administrators see every customer. Anyone else is confined to
    /// their own customer and must have one.
    pub fn new(
        route: BookingRoute,
        is_system_admin: bool,
        user_customer_id: Option<CustomerId>,
    ) -> ServiceResult<Self> {
        let scope = match (is_system_admin, user_customer_id) {
            (true, _) => Scope::AllCustomers,
            (false, Some(customer_id)) => Scope::Customer(customer_id),
            (false, None) => return Err(ServiceError::Unauthorized),
        };
        Ok(Self { route, scope })
    }

    pub fn is_system_admin(&self) -> bool {
        self.scope == Scope::AllCustomers
    }

    fn scoped(&self) -> BookingQuery {
        let query = BookingQuery::new().filter(Predicate::TypeIs(self.route.booking_type()));
        match self.scope {
            Scope::AllCustomers => query,
            Scope::Customer(customer_id) => query.filter(Predicate::CustomerIs(customer_id)),
        }
    }
}

/// Every booking of the route's type visible to the viewer, newest first.
/// Pagination and export both run over this query.
pub fn base_query(context: &BookingListContext) -> BookingQuery {
    context.scoped().order_by_booking_date_desc()
}

/// One-shot filtered query. Carries no ordering, so results come back in the
/// store's default order.
pub fn filtered_query(context: &BookingListContext, filter: &BookingFilter) -> BookingQuery {
    context.scoped().filter(filter.predicate())
}
