//! Pagination state machine and page cursor
//!
//! [`LoadState`] encodes the transition table of a paged list:
//!
//! | Current            | Event                 | Next            |
//! |--------------------|-----------------------|-----------------|
//! | any except loading | fetch requested       | `Loading`       |
//! | `Loading`          | page with items       | `DataLoaded`    |
//! | `Loading`          | empty page            | `AllDataLoaded` |
//! | `Loading`          | fetch failed          | `Error`         |
//! | `Loading`          | fetch requested       | ignored         |
//! | any                | clear                 | `Initial`       |
//!
//! [`PageCursor`] tracks which offset to request next. Whether the first page
//! has been loaded is an explicit flag, never derived from the product list.

use crate::types::PageRequest;
use serde::{Deserialize, Serialize};

/// Loading state of a paged list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Nothing fetched yet
    #[default]
    Initial,
    /// A page fetch is in flight
    Loading,
    /// The last page returned at least one item
    DataLoaded,
    /// The last page returned no items; the list is complete
    AllDataLoaded,
    /// The last page fetch failed
    Error,
}

/// Result of one page fetch, as seen by the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page returned this many items (at least one)
    Items(usize),
    /// The page returned nothing
    Empty,
    /// The fetch failed
    Failed,
}

impl PageOutcome {
    /// Classify a successful page by its item count
    pub fn from_count(count: usize) -> Self {
        if count == 0 {
            PageOutcome::Empty
        } else {
            PageOutcome::Items(count)
        }
    }
}

impl LoadState {
    /// Transition for "fetch requested"
    ///
    /// Returns `None` when the request must be ignored (a fetch is already in flight).
    pub fn on_fetch_requested(self) -> Option<LoadState> {
        match self {
            LoadState::Loading => None,
            _ => Some(LoadState::Loading),
        }
    }

    /// Transition for a completed page fetch
    ///
    /// Outcomes only apply while `Loading`; in any other state they are stale
    /// and the state is returned unchanged.
    pub fn on_page_outcome(self, outcome: PageOutcome) -> LoadState {
        match (self, outcome) {
            (LoadState::Loading, PageOutcome::Items(_)) => LoadState::DataLoaded,
            (LoadState::Loading, PageOutcome::Empty) => LoadState::AllDataLoaded,
            (LoadState::Loading, PageOutcome::Failed) => LoadState::Error,
            (state, _) => state,
        }
    }

    /// Transition for "clear requested"
    pub fn on_clear(self) -> LoadState {
        LoadState::Initial
    }

    /// Returns true while a page fetch is in flight
    pub fn is_loading(self) -> bool {
        self == LoadState::Loading
    }

    /// Returns true once an empty page has been seen
    pub fn is_exhausted(self) -> bool {
        self == LoadState::AllDataLoaded
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LoadState::Initial => "initial",
            LoadState::Loading => "loading",
            LoadState::DataLoaded => "data_loaded",
            LoadState::AllDataLoaded => "all_data_loaded",
            LoadState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Offset bookkeeping for sequential page fetches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageCursor {
    current_page: u32,
    page_size: u32,
    has_loaded_page: bool,
}

impl PageCursor {
    /// Create a cursor at the first page
    ///
    /// A zero page size is raised to one; [`Config::validate`](crate::Config::validate)
    /// rejects it earlier.
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 0,
            page_size: page_size.max(1),
            has_loaded_page: false,
        }
    }

    /// Page number of the most recently loaded page (0 before any load)
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Fixed number of items per page
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Offset of the current page: `current_page × page_size`
    pub fn offset(&self) -> u32 {
        self.current_page.saturating_mul(self.page_size)
    }

    /// Returns true once a page with items has been loaded
    pub fn has_loaded_page(&self) -> bool {
        self.has_loaded_page
    }

    /// The page to request next and its request parameters
    ///
    /// The first request uses offset 0. After that, the page following the
    /// last loaded one. Does not move the cursor: a failed or empty fetch
    /// leaves it where it was, so a retry asks for the same page.
    pub fn next_request(&self) -> (u32, PageRequest) {
        let page = if self.has_loaded_page {
            self.current_page.saturating_add(1)
        } else {
            0
        };
        let request = PageRequest {
            limit: self.page_size,
            skip: page.saturating_mul(self.page_size),
        };
        (page, request)
    }

    /// Record that `page` returned at least one item
    pub fn advance_to(&mut self, page: u32) {
        self.current_page = page;
        self.has_loaded_page = true;
    }

    /// Return to the first page
    pub fn reset(&mut self) {
        self.current_page = 0;
        self.has_loaded_page = false;
    }
}
