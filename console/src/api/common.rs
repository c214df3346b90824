//! Shared wire types for the backend's list endpoints.
//!
//! Every list endpoint answers with one page of records plus pagination
//! metadata. The metadata field names are camelCase on the wire and are kept
//! that way here via serde renames.

use serde::{Deserialize, Serialize};

/// Pagination metadata attached to every list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total_items: u64,
    /// Number of items per page
    pub items_per_page: u32,
    /// Current page number (1-indexed)
    pub current_page: u32,
    /// Total number of pages
    pub total_pages: u32,
    /// Whether there is a next page
    pub has_next_page: bool,
    /// Whether there is a previous page
    pub has_previous_page: bool,
}

/// One page of records plus its pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Page window requested from a list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        PageRequest { page, page_size }
    }

    pub fn first(page_size: u32) -> Self {
        Self::new(1, page_size)
    }

    /// Query pairs in the shape the backend expects.
    pub fn to_query(self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ]
    }
}

impl PaginationMeta {
    /// Builds metadata from page parameters and a total count.
    pub fn new(current_page: u32, items_per_page: u32, total_items: u64) -> Self {
        let total_pages = if total_items == 0 {
            1
        } else {
            ((total_items - 1) / items_per_page as u64 + 1) as u32
        };

        PaginationMeta {
            total_items,
            items_per_page,
            current_page,
            total_pages,
            has_next_page: current_page < total_pages,
            has_previous_page: current_page > 1,
        }
    }

    /// 1-based inclusive window of the rows on display, for captions like
    /// "Showing 11 to 20 of 42 results". Empty collections report (0, 0).
    pub fn display_range(&self) -> (u64, u64) {
        if self.total_items == 0 {
            return (0, 0);
        }
        let start = (self.current_page as u64 - 1) * self.items_per_page as u64 + 1;
        let end = (self.current_page as u64 * self.items_per_page as u64).min(self.total_items);
        (start, end)
    }
}

/// Response for actions that only return a human-readable message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
