//! Stateful controller behind one booking list page.
//!
//! A [`BookingList`] is shared between concurrent requests of the same
//! viewer. Its state sits behind a mutex that is never held across a store
//! call. Every operation that replaces the displayed rows takes a new
//! generation number before fetching, and a response is only committed when
//! its generation is still the newest one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::booking::BookingRoute;
use crate::domain::report_row::{ExpandedRow, expand_bookings};
use crate::dto::bookings::BookingListView;
use crate::repository::{BookingQuery, BookingReader};
use crate::services::errors::{ServiceError, ServiceResult};
use crate::services::export::{ColumnDef, CsvExport, write_csv};
use crate::services::filter::{BookingFilter, FilterAction, FilterController, FilterField};
use crate::services::pagination::{Direction, PageRequest, PaginationCursor};
use crate::services::query_builder::{BookingListContext, base_query, filtered_query};

struct ListState {
    cursor: PaginationCursor,
    filter: FilterController,
    rows: Vec<ExpandedRow>,
    generation: u64,
    in_flight: usize,
}

impl ListState {
    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn view(&self) -> BookingListView {
        BookingListView {
            rows: self.rows.clone(),
            filtered: self.filter.is_filtered(),
            filter: self.filter.draft().cloned(),
            page_state: self.cursor.state(),
            is_start: self.cursor.is_start(),
            is_end: self.cursor.is_end(),
            is_loading: self.in_flight > 0,
        }
    }
}

/// One unit of the in-flight counter. Released explicitly when the response
/// is committed, or on drop if the fetch unwinds.
struct InFlight<'a> {
    state: &'a Mutex<ListState>,
    released: bool,
}

impl<'a> InFlight<'a> {
    fn acquire(state: &'a Mutex<ListState>, guard: &mut ListState) -> Self {
        guard.in_flight += 1;
        Self {
            state,
            released: false,
        }
    }

    fn release(mut self, guard: &mut ListState) {
        guard.in_flight = guard.in_flight.saturating_sub(1);
        self.released = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.released {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.in_flight = state.in_flight.saturating_sub(1);
        }
    }
}

/// Marks an export as running; at most one per list.
struct ExportSlot<'a>(&'a AtomicBool);

impl<'a> ExportSlot<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ExportSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct BookingList<R> {
    repo: R,
    context: BookingListContext,
    base: BookingQuery,
    state: Mutex<ListState>,
    exporting: AtomicBool,
}

impl<R> BookingList<R>
where
    R: BookingReader,
{
    /// Creates an idle list. Nothing is fetched until [`Self::load`].
    pub fn new(repo: R, context: BookingListContext) -> Self {
        let base = base_query(&context);
        Self {
            repo,
            context,
            state: Mutex::new(ListState {
                cursor: PaginationCursor::new(base.clone()),
                filter: FilterController::new(),
                rows: Vec::new(),
                generation: 0,
                in_flight: 0,
            }),
            base,
            exporting: AtomicBool::new(false),
        }
    }

    pub fn context(&self) -> &BookingListContext {
        &self.context
    }

    pub fn route(&self) -> BookingRoute {
        self.context.route
    }

    fn lock(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn view(&self) -> BookingListView {
        self.lock().view()
    }

    /// True until the first page has been loaded.
    pub fn needs_initial_load(&self) -> bool {
        self.lock().cursor.needs_initial_load()
    }

    /// Fetches the first page of the base query.
    pub fn load(&self) -> ServiceResult<BookingListView> {
        self.run_page_request(|state| state.cursor.begin_initial())
    }

    /// Moves one page in `direction`. A no-op at the boundary, while another
    /// page transition is running, or while a filter is applied.
    pub fn advance(&self, direction: Direction) -> ServiceResult<BookingListView> {
        self.run_page_request(|state| {
            if state.filter.is_filtered() {
                log::debug!("Ignoring page navigation while a filter is applied");
                return None;
            }
            state.cursor.begin_advance(direction)
        })
    }

    fn run_page_request<F>(&self, plan: F) -> ServiceResult<BookingListView>
    where
        F: FnOnce(&mut ListState) -> Option<PageRequest>,
    {
        let (request, generation, in_flight) = {
            let mut state = self.lock();
            let Some(request) = plan(&mut state) else {
                return Ok(state.view());
            };
            let generation = state.next_generation();
            let in_flight = InFlight::acquire(&self.state, &mut state);
            (request, generation, in_flight)
        };

        log::debug!("Fetching booking page: {}", request.query);
        let result = self.repo.list_bookings(&request.query);

        let mut state = self.lock();
        in_flight.release(&mut state);
        if state.generation != generation {
            log::debug!("Discarding superseded booking page");
            state.cursor.abandon(request);
            return Ok(state.view());
        }
        let page = state
            .cursor
            .complete(request, result)
            .map(expand_bookings)
            .map_err(|err| {
                log::error!("Failed to load bookings page: {err}");
                ServiceError::from(err)
            })?;
        state.rows = page;
        Ok(state.view())
    }

    /// Chooses the filter field. Ignored while a filter is applied.
    pub fn set_filter(&self, field: Option<FilterField>) {
        self.lock().filter.set_filter(field);
    }

    /// Sets the raw filter value. Ignored while a filter is applied.
    pub fn set_value(&self, value: impl Into<String>) {
        self.lock().filter.set_value(value);
    }

    /// Submits the filter form: applies the drafted filter when unfiltered,
    /// clears the applied one otherwise.
    pub fn apply_filter(&self) -> ServiceResult<BookingListView> {
        let action = self.lock().filter.submit()?;
        match action {
            FilterAction::Nothing => Ok(self.view()),
            FilterAction::Clear => self.clear_filter(),
            FilterAction::Apply(filter) => self.run_filter(filter),
        }
    }

    fn run_filter(&self, filter: BookingFilter) -> ServiceResult<BookingListView> {
        let query = filtered_query(&self.context, &filter);
        log::info!("Filtering {} bookings: {query}", self.context.route);
        self.replace_rows(&query, move |state| state.filter.mark_applied(filter))
    }

    /// Drops the filter and shows every booking of the base query. The
    /// cursor keeps its page; the next page transition shows cursor pages
    /// again.
    pub fn clear_filter(&self) -> ServiceResult<BookingListView> {
        self.replace_rows(&self.base, |state| state.filter.reset())
    }

    /// Runs a one-shot query and, if still the newest operation, displays its
    /// rows and applies `on_commit`. On failure nothing changes.
    fn replace_rows<F>(&self, query: &BookingQuery, on_commit: F) -> ServiceResult<BookingListView>
    where
        F: FnOnce(&mut ListState),
    {
        let (generation, in_flight) = {
            let mut state = self.lock();
            let generation = state.next_generation();
            (generation, InFlight::acquire(&self.state, &mut state))
        };

        let result = self.repo.list_bookings(query);

        let mut state = self.lock();
        in_flight.release(&mut state);
        let bookings = result.map_err(|err| {
            log::error!("Failed to query bookings: {err}");
            ServiceError::from(err)
        })?;
        if state.generation != generation {
            log::debug!("Discarding superseded booking query: {query}");
            return Ok(state.view());
        }
        state.rows = expand_bookings(&bookings);
        on_commit(&mut state);
        Ok(state.view())
    }

    /// Exports every booking of the base query, regardless of the page shown
    /// or any applied filter. Fails with [`ServiceError::Busy`] while another
    /// export of this list is running.
    pub fn export_csv(&self, columns: &[ColumnDef]) -> ServiceResult<CsvExport> {
        let Some(_slot) = ExportSlot::try_acquire(&self.exporting) else {
            return Err(ServiceError::Busy);
        };

        let bookings = self.repo.list_bookings(&self.base).map_err(|err| {
            log::error!("Failed to fetch bookings for export: {err}");
            ServiceError::Export(err.to_string())
        })?;
        let rows = expand_bookings(&bookings);
        let csv = write_csv(&rows, columns).map_err(|err| {
            log::error!("Failed to write bookings export: {err}");
            err
        })?;

        log::info!(
            "Exported {} rows of {} bookings",
            rows.len(),
            self.context.route
        );
        Ok(CsvExport::new(self.context.route, csv))
    }
}
