//! Offset pagination over the lead listing.

use serde::{Deserialize, Serialize};

/// Fixed page size of the lead listing.
pub const LEADS_PER_PAGE: u32 = 10;

/// A requested page (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Page numbers below 1 are clamped to 1, as is a zero page size.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Parse a `page` query value. Missing, non-numeric or out-of-range
    /// values select the first page.
    pub fn parse(raw: Option<&str>, per_page: u32) -> Self {
        let page = raw.and_then(|v| v.trim().parse::<u32>().ok()).unwrap_or(1);
        Self::new(page, per_page)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, LEADS_PER_PAGE)
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
    /// 1-based position of the first row on this page; `None` for an empty page.
    pub from: Option<u64>,
    /// 1-based position of the last row on this page; `None` for an empty page.
    pub to: Option<u64>,
}

impl PageMeta {
    pub fn new(request: PageRequest, total: u64, returned: usize) -> Self {
        let per_page = u64::from(request.per_page());
        let last_page = total.div_ceil(per_page).max(1);
        let (from, to) = if returned == 0 {
            (None, None)
        } else {
            let from = request.offset() + 1;
            (Some(from), Some(from + returned as u64 - 1))
        };

        Self {
            current_page: request.page(),
            per_page: request.per_page(),
            total,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            from,
            to,
        }
    }
}
