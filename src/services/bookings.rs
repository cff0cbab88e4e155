use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::domain::booking::BookingStatus;
use crate::dto::bookings::{BookingListPageData, BookingListView, FilterOption, StatusOption};
use crate::forms::bookings::FilterForm;
use crate::repository::BookingReader;
use crate::services::booking_list::BookingList;
use crate::services::errors::{ServiceError, ServiceResult};
use crate::services::export::{ColumnDef, CsvExport, default_columns, visible_columns};
use crate::services::filter::FilterField;
use crate::services::pagination::Direction;
use crate::services::query_builder::BookingListContext;
use crate::services::registry::BookingListRegistry;

/// Returns the viewer's list for the context's route. A new list is created
/// on first visit, or when the viewer's scope changed since the last one.
/// `expires_at` is the end of the viewer's login in epoch seconds; lists of
/// logins that already ended are dropped first.
pub fn open_booking_list<R>(
    registry: &BookingListRegistry<R>,
    repo: &R,
    owner: &str,
    expires_at: i64,
    context: BookingListContext,
) -> Arc<BookingList<R>>
where
    R: BookingReader + Clone,
{
    let evicted = registry.evict_expired(Utc::now().timestamp());
    if evicted > 0 {
        log::debug!("Evicted {evicted} booking lists of expired logins");
    }
    registry.get_or_insert_with(
        owner,
        context.route,
        expires_at,
        |list| *list.context() == context,
        || {
            log::debug!("Opening {} booking list for {owner}", context.route);
            BookingList::new(repo.clone(), context)
        },
    )
}

/// Loads the first page unless one has already been shown.
pub fn ensure_loaded<R>(list: &BookingList<R>) -> ServiceResult<()>
where
    R: BookingReader,
{
    if list.needs_initial_load() {
        list.load()?;
    }
    Ok(())
}

/// Builds the template data for the list's current state.
pub fn load_booking_list_page<R>(list: &BookingList<R>) -> BookingListPageData
where
    R: BookingReader,
{
    build_page_data(list, &default_columns())
}

fn build_page_data<R>(list: &BookingList<R>, columns: &[ColumnDef]) -> BookingListPageData
where
    R: BookingReader,
{
    let route = list.route();
    let BookingListView {
        rows,
        filtered,
        filter,
        is_start,
        is_end,
        is_loading,
        ..
    } = list.view();

    let columns = visible_columns(columns);
    let headers = columns.iter().map(|c| c.title.clone()).collect();
    let table = rows
        .iter()
        .map(|row| columns.iter().map(|c| c.cell(row)).collect::<Vec<_>>())
        .collect();
    let has_rows = !rows.is_empty();

    BookingListPageData {
        route,
        title: format!("Reservas - {}", route.title()),
        headers,
        table,
        filtered,
        filter_label: filter.as_ref().map(|draft| draft.field.label()),
        filter_input: filter.as_ref().map(|draft| draft.field.input()),
        can_submit_filter: filter.is_some(),
        filter,
        filter_fields: FilterField::ALL.into_iter().map(FilterOption::from).collect(),
        statuses: BookingStatus::ALL.into_iter().map(StatusOption::from).collect(),
        can_go_back: has_rows && !filtered && !is_start,
        can_go_forward: has_rows && !filtered && !is_end,
        can_choose_filter: has_rows && !filtered,
        can_export: has_rows,
        is_loading,
    }
}

pub fn navigate<R>(list: &BookingList<R>, direction: Direction) -> ServiceResult<BookingListView>
where
    R: BookingReader,
{
    list.advance(direction)
}

/// Applies the submitted filter, or clears the applied one. While a filter is
/// applied the submitted field and value are ignored.
pub fn submit_filter<R>(list: &BookingList<R>, form: FilterForm) -> ServiceResult<BookingListView>
where
    R: BookingReader,
{
    if let Err(err) = form.validate() {
        log::error!("Failed to validate filter form: {err}");
        return Err(ServiceError::Form("Filtro inválido".to_string()));
    }

    if !list.view().filtered {
        let field = form.field()?;
        list.set_filter(field);
        if field.is_some() {
            list.set_value(form.value);
        }
    }

    list.apply_filter()
}

pub fn export_bookings<R>(list: &BookingList<R>) -> ServiceResult<CsvExport>
where
    R: BookingReader,
{
    list.export_csv(&default_columns())
}
