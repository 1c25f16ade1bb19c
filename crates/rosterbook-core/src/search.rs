//! Composable filter specification and pagination contract for window lists.
//!
//! An empty `sport_ids`/`team_types`/`statuses` vector means "no restriction
//! on that dimension", never "match nothing". Every filter-changing builder
//! method resets the page to 1. The classifier is applied to results for
//! display only; it participates in filtering only when `statuses` is
//! explicitly set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::reference::TeamType;
use crate::models::window::{Concentration, TimeWindow, WindowStatus};

/// Default number of items per list page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    StartDate,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(rename = "sportIds")]
    pub sport_ids: Vec<i64>,
    #[serde(rename = "teamTypes")]
    pub team_types: Vec<TeamType>,
    pub statuses: Vec<WindowStatus>,
    pub year: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: SortBy,
    #[serde(rename = "sortOrder")]
    pub sort_order: SortOrder,
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
}

impl Default for FilterSpec {
    /// Unrestricted first page, newest window first.
    fn default() -> Self {
        FilterSpec {
            sport_ids: Vec::new(),
            team_types: Vec::new(),
            statuses: Vec::new(),
            year: None,
            sort_by: SortBy::StartDate,
            sort_order: SortOrder::Desc,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterSpec {
    pub fn with_sports(mut self, sport_ids: Vec<i64>) -> Self {
        self.sport_ids = sport_ids;
        self.page = 1;
        self
    }

    pub fn with_team_types(mut self, team_types: Vec<TeamType>) -> Self {
        self.team_types = team_types;
        self.page = 1;
        self
    }

    pub fn with_statuses(mut self, statuses: Vec<WindowStatus>) -> Self {
        self.statuses = statuses;
        self.page = 1;
        self
    }

    pub fn with_year(mut self, year: Option<String>) -> Self {
        self.year = year;
        self.page = 1;
        self
    }

    pub fn sorted_by(mut self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self.page = 1;
        self
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Whether a window passes every restricted dimension. The status check
    /// runs the classifier only when `statuses` is non-empty.
    pub fn matches(&self, window: &Concentration, now: DateTime<Utc>) -> bool {
        if !self.sport_ids.is_empty() && !self.sport_ids.contains(&window.sport.id) {
            return false;
        }
        if !self.team_types.is_empty() && !self.team_types.contains(&window.team_type) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&window.status(now)) {
            return false;
        }
        if let Some(ref year) = self.year {
            if window.year().to_string() != *year {
                return false;
            }
        }
        true
    }

    /// Order a filtered result set according to the sort fields.
    pub fn sort(&self, windows: &mut [Concentration]) {
        match self.sort_by {
            SortBy::StartDate => {
                windows.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)))
            }
            SortBy::Name => windows.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then(a.id.cmp(&b.id))
            }),
        }
        if self.sort_order == SortOrder::Desc {
            windows.reverse();
        }
    }
}

/// One page of results plus the totals the pagination contract promises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
}

impl<T> PagedResult<T> {
    /// Slice an already filtered and sorted set into one page. Page numbers
    /// are 1-based; a page past the end yields an empty item list with the
    /// totals intact.
    pub fn paginate(items: Vec<T>, page: u32, page_size: u32) -> Self {
        let page = page.max(1) as usize;
        let page_size = page_size.max(1) as usize;
        let total = items.len();
        let total_pages = total.div_ceil(page_size);
        let items = items
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();
        PagedResult {
            items,
            total,
            total_pages,
        }
    }
}
