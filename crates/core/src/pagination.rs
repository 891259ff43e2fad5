use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

const CURSOR_PREFIX: &str = "tessera-offset:";

/// Cursor metadata attached to every page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Cursor the page was requested with.
    pub start_cursor: String,
    /// Cursor for the next page, empty on the last page.
    pub end_cursor: String,
    /// Whether more rows follow this page.
    pub has_next_page: bool,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Total rows matching the query across all pages.
    pub total_count: usize,
    /// Cursor metadata.
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Builds a page from an offset window over `total_count` rows.
    #[must_use]
    pub fn from_offset_window(
        data: Vec<T>,
        total_count: usize,
        cursor: &str,
        offset: usize,
        page_size: usize,
    ) -> Self {
        let has_next_page = total_count > offset + data.len();
        let end_cursor = if has_next_page {
            encode_offset_cursor(offset, page_size)
        } else {
            String::new()
        };

        Self {
            data,
            total_count,
            page_info: PageInfo {
                start_cursor: cursor.to_owned(),
                end_cursor,
                has_next_page,
            },
        }
    }

    /// Returns an empty page for the given cursor.
    #[must_use]
    pub fn empty(cursor: &str) -> Self {
        Self::from_offset_window(Vec::new(), 0, cursor, 0, 0)
    }
}

/// Encodes the cursor pointing at the page after `offset`.
#[must_use]
pub fn encode_offset_cursor(offset: usize, page_size: usize) -> String {
    STANDARD.encode(format!("{CURSOR_PREFIX}{}", offset + page_size))
}

/// Decodes an offset cursor, treating the empty cursor as offset zero.
pub fn decode_offset_cursor(cursor: &str) -> AppResult<usize> {
    if cursor.is_empty() {
        return Ok(0);
    }

    let decoded = STANDARD
        .decode(cursor)
        .map_err(|error| AppError::Validation(format!("cursor is not correct: {error}")))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|error| AppError::Validation(format!("cursor is not correct: {error}")))?;
    let raw_offset = decoded
        .strip_prefix(CURSOR_PREFIX)
        .ok_or_else(|| AppError::Validation("cursor is not correct".to_owned()))?;
    let offset = raw_offset
        .parse::<i64>()
        .map_err(|error| AppError::Validation(format!("cursor is not correct: {error}")))?;

    usize::try_from(offset)
        .map_err(|_| AppError::Validation("cursor offset cannot be negative".to_owned()))
}
