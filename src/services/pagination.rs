//! Cursor-based paging over an ordered booking query.
//!
//! The cursor never talks to the store itself: `begin_*` plans the next fetch
//! and `complete` records its outcome.

use serde::Serialize;

use crate::domain::booking::Booking;
use crate::repository::errors::RepositoryResult;
use crate::repository::{BookingQuery, PageCursor, Window};

/// Bookings per page.
pub const PAGE_SIZE: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageState {
    Idle,
    Loading,
    Loaded,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Transition {
    Initial,
    Step(Direction),
}

/// A planned page fetch. Run `query` against the store and hand the answer
/// back to [`PaginationCursor::complete`].
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    transition: Transition,
    pub query: BookingQuery,
}

#[derive(Debug, Clone)]
pub struct PaginationCursor {
    base: BookingQuery,
    page_size: usize,
    page: Vec<Booking>,
    state: PageState,
    is_start: bool,
    is_end: bool,
    has_page: bool,
}

impl PaginationCursor {
    pub fn new(base: BookingQuery) -> Self {
        Self {
            base: base.unbounded(),
            page_size: PAGE_SIZE,
            page: Vec::new(),
            state: PageState::Idle,
            is_start: true,
            is_end: true,
            has_page: false,
        }
    }

    #[cfg(test)]
    fn page(&self) -> &[Booking] {
        &self.page
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn is_start(&self) -> bool {
        self.is_start
    }

    pub fn is_end(&self) -> bool {
        self.is_end
    }

    pub fn is_loading(&self) -> bool {
        self.state == PageState::Loading
    }

    /// True until a first page has been loaded successfully.
    pub fn needs_initial_load(&self) -> bool {
        !self.has_page && self.state != PageState::Loading
    }

    /// Plans a fetch of the first page. `None` while another fetch is running.
    pub fn begin_initial(&mut self) -> Option<PageRequest> {
        if self.is_loading() {
            return None;
        }
        self.state = PageState::Loading;
        Some(PageRequest {
            transition: Transition::Initial,
            query: self.base.clone().window(Window::First(self.page_size + 1)),
        })
    }

    /// Plans a fetch of the adjacent page. `None` (and no state change) at the
    /// boundary in that direction, before the first page, or while loading.
    pub fn begin_advance(&mut self, direction: Direction) -> Option<PageRequest> {
        if self.is_loading() || !self.has_page {
            return None;
        }
        let window = match direction {
            Direction::Forward if !self.is_end => self
                .page
                .last()
                .map(|last| Window::After(PageCursor::from(last), self.page_size + 1)),
            Direction::Backward if !self.is_start => self
                .page
                .first()
                .map(|first| Window::Before(PageCursor::from(first), self.page_size + 1)),
            _ => None,
        }?;

        self.state = PageState::Loading;
        Some(PageRequest {
            transition: Transition::Step(direction),
            query: self.base.clone().window(window),
        })
    }

    /// Drops a planned fetch whose answer is no longer wanted. The page and
    /// boundary flags stay as they were before the request was planned.
    pub fn abandon(&mut self, request: PageRequest) {
        log::debug!("Abandoning booking page request: {}", request.query);
        if self.state == PageState::Loading {
            self.state = if self.has_page {
                PageState::Loaded
            } else {
                PageState::Idle
            };
        }
    }

    /// Records the outcome of a planned fetch. On error the previous page and
    /// boundary flags are kept so navigation can be retried.
    pub fn complete(
        &mut self,
        request: PageRequest,
        result: RepositoryResult<Vec<Booking>>,
    ) -> RepositoryResult<&[Booking]> {
        let mut documents = match result {
            Ok(documents) => documents,
            Err(err) => {
                self.state = PageState::Error;
                return Err(err);
            }
        };
        // One extra document was requested to learn whether more exist.
        let has_more = documents.len() > self.page_size;

        match request.transition {
            Transition::Initial => {
                documents.truncate(self.page_size);
                self.page = documents;
                self.is_start = true;
                self.is_end = !has_more;
                self.has_page = true;
            }
            Transition::Step(Direction::Forward) => {
                if documents.is_empty() {
                    self.is_end = true;
                } else {
                    documents.truncate(self.page_size);
                    self.page = documents;
                    self.is_start = false;
                    self.is_end = !has_more;
                }
            }
            Transition::Step(Direction::Backward) => {
                if documents.is_empty() {
                    self.is_start = true;
                } else {
                    // Backward windows come in query order; the surplus
                    // document is the one furthest from the cursor.
                    let surplus = documents.len().saturating_sub(self.page_size);
                    documents.drain(..surplus);
                    self.page = documents;
                    self.is_start = !has_more;
                    self.is_end = false;
                }
            }
        }

        self.state = PageState::Loaded;
        Ok(&self.page)
    }
}
