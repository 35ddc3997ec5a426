//! Server-side pagination envelope

use serde::{Deserialize, Serialize};

use super::DiaryEntry;

/// One page of a (possibly keyword-filtered) diary collection.
///
/// Field names follow the server's page envelope; extra envelope fields such
/// as `pageable` or `sort` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryPage {
    #[serde(rename = "content", default)]
    pub items: Vec<DiaryEntry>,
    pub total_elements: u64,
    pub total_pages: u32,
    #[serde(rename = "size")]
    pub page_size: u32,
    #[serde(rename = "number")]
    pub page_index: u32,
    #[serde(rename = "first")]
    pub is_first: bool,
    #[serde(rename = "last")]
    pub is_last: bool,
}

impl DiaryPage {
    #[must_use]
    pub fn empty(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            page_size,
            page_index: 0,
            is_first: true,
            is_last: true,
        }
    }

    /// Index of the following page, if the server reports one.
    #[must_use]
    pub const fn next_page_index(&self) -> Option<u32> {
        if self.is_last {
            None
        } else {
            Some(self.page_index + 1)
        }
    }
}
