use serde::{Deserialize, Serialize};

/// Width of the page-number link window.
pub const PAGES_PER_SET: u64 = 10;

/// Pagination window derived from a total row count, a page size, and a
/// 1-based current page. Pure arithmetic: constructing a pager never touches
/// storage, and out-of-range pages yield an empty entry window, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pager {
    pub total_entries: u64,
    pub entries_per_page: u64,
    pub current_page: u64,
}

impl Pager {
    pub fn new(total_entries: u64, entries_per_page: u64, current_page: u64) -> Self {
        Self {
            total_entries,
            entries_per_page: entries_per_page.max(1),
            current_page: current_page.max(1),
        }
    }

    pub fn first_page(&self) -> u64 {
        1
    }

    pub fn last_page(&self) -> u64 {
        self.total_entries.div_ceil(self.entries_per_page).max(1)
    }

    /// 1-based ordinal of the first entry on this page, 0 when the page
    /// holds nothing.
    pub fn first(&self) -> u64 {
        if self.total_entries == 0 || self.current_page > self.last_page() {
            return 0;
        }
        (self.current_page - 1) * self.entries_per_page + 1
    }

    /// 1-based ordinal of the last entry on this page, 0 when the page
    /// holds nothing.
    pub fn last(&self) -> u64 {
        if self.first() == 0 {
            return 0;
        }
        (self.current_page * self.entries_per_page).min(self.total_entries)
    }

    pub fn entries_on_this_page(&self) -> u64 {
        if self.first() == 0 {
            0
        } else {
            self.last() - self.first() + 1
        }
    }

    pub fn previous_page(&self) -> Option<u64> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }

    pub fn next_page(&self) -> Option<u64> {
        (self.current_page < self.last_page()).then(|| self.current_page + 1)
    }

    /// Sliding window of page-number links, at most `PAGES_PER_SET` wide,
    /// kept centered on the current page where the page range allows.
    pub fn pages_in_set(&self) -> Vec<u64> {
        let last = self.last_page();
        let mut start = self.current_page.saturating_sub(PAGES_PER_SET / 2).max(1);
        if start.saturating_add(PAGES_PER_SET - 1) > last {
            start = last.saturating_sub(PAGES_PER_SET - 1).max(1);
        }
        let end = start.saturating_add(PAGES_PER_SET - 1).min(last);
        (start..=end).collect()
    }
}
