//! Record window arithmetic.
//!
//! Records are numbered sequentially from 1, so "the Nth most recent page"
//! can be turned into an inclusive id range from nothing but the current
//! record count. Batch 1 is always the newest page and every following batch
//! moves backwards in id space without gaps or overlaps.
//!
//! Everything here is pure; the fetch orchestration lives in
//! [`crate::panels::monitor`].

use serde::Serialize;

use crate::error::PageError;

/// Records shown per page.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Inclusive `[start_id, end_id]` range of record ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdWindow {
    pub start_id: u64,
    pub end_id: u64,
}

impl IdWindow {
    /// Number of ids in the window. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end_id - self.start_id + 1
    }
}

/// Compute the id window of `batch` (1 = newest) for `total_count` records.
///
/// Returns `Ok(None)` when there is nothing to fetch: either no records exist
/// or the batch lies beyond the oldest record. A zero batch or zero page size
/// is a caller bug and is rejected.
pub fn record_window(
    total_count: u64,
    batch: u64,
    page_size: u64,
) -> Result<Option<IdWindow>, PageError> {
    if batch == 0 {
        return Err(PageError::ZeroPage);
    }
    if page_size == 0 {
        return Err(PageError::ZeroPageSize);
    }

    let skipped = match (batch - 1).checked_mul(page_size) {
        Some(n) if n < total_count => n,
        _ => return Ok(None),
    };

    let end_id = total_count - skipped;
    let start_id = end_id.saturating_sub(page_size - 1).max(1);

    Ok(Some(IdWindow { start_id, end_id }))
}

/// Number of pages needed to show `total_count` records.
pub fn total_pages(total_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}

/// Whether a batch older than `batch` still holds records.
pub fn has_older(total_count: u64, batch: u64, page_size: u64) -> bool {
    match batch.checked_mul(page_size) {
        Some(shown) => total_count > shown,
        None => false,
    }
}

/// Row offset of `page` (1-based) for limit/offset queries.
pub fn page_offset(page: u64, page_size: u64) -> Result<u64, PageError> {
    if page == 0 {
        return Err(PageError::ZeroPage);
    }
    if page_size == 0 {
        return Err(PageError::ZeroPageSize);
    }
    Ok((page - 1).saturating_mul(page_size))
}
