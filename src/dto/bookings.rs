use serde::Serialize;

use crate::domain::booking::{BookingRoute, BookingStatus};
use crate::domain::report_row::ExpandedRow;
use crate::services::filter::{FilterDraft, FilterField, FilterInput};
use crate::services::pagination::PageState;

/// Snapshot of a booking list's observable state.
#[derive(Debug, Clone, Serialize)]
pub struct BookingListView {
    /// Rows currently displayed: the cursor's page, or a filter/clear result.
    pub rows: Vec<ExpandedRow>,
    pub filtered: bool,
    pub filter: Option<FilterDraft>,
    pub page_state: PageState,
    pub is_start: bool,
    pub is_end: bool,
    /// True while any fetch for this list is in flight.
    pub is_loading: bool,
}

/// Option of the "Filtrar por" select.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOption {
    pub key: &'static str,
    pub label: &'static str,
    pub input: FilterInput,
}

impl From<FilterField> for FilterOption {
    fn from(field: FilterField) -> Self {
        Self {
            key: field.key(),
            label: field.label(),
            input: field.input(),
        }
    }
}

/// Option of the status value select.
#[derive(Debug, Clone, Serialize)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
}

impl From<BookingStatus> for StatusOption {
    fn from(status: BookingStatus) -> Self {
        Self {
            value: status.as_str(),
            label: status.label(),
        }
    }
}

/// Data required to render the booking list template.
#[derive(Debug, Clone, Serialize)]
pub struct BookingListPageData {
    pub route: BookingRoute,
    /// Page heading, e.g. `Reservas - Experiências`.
    pub title: String,
    pub headers: Vec<String>,
    pub table: Vec<Vec<String>>,
    pub filtered: bool,
    pub filter: Option<FilterDraft>,
    /// Label of the chosen filter field, for the value input.
    pub filter_label: Option<&'static str>,
    pub filter_input: Option<FilterInput>,
    pub filter_fields: Vec<FilterOption>,
    pub statuses: Vec<StatusOption>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub can_choose_filter: bool,
    pub can_submit_filter: bool,
    pub can_export: bool,
    pub is_loading: bool,
}
