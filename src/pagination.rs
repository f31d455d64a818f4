// Reverse pagination: newest-first pages via descending identifier windows

use anyhow::Result;
use serde::Serialize;

use crate::anchor::AnchorCache;
use crate::constants;
use crate::materialize;
use crate::progress::ProgressSink;
use crate::record::{self, ImageMeta};
use crate::remote::{image_scope, RemoteStore};

/// Identifier window `(lower, upper]` for one page. Consecutive pages
/// produce contiguous, disjoint windows, clipped at 0 for the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub lower: u64,
    pub upper: u64,
}

impl Window {
    /// A window whose upper bound reached 0 covers no identifiers.
    pub fn is_empty(&self) -> bool {
        self.upper == 0
    }
}

/// Compute the identifier window for a 1-based page of `per_page` records,
/// counting down from `max_id`.
pub fn window_for(max_id: u64, page: usize, per_page: usize) -> Window {
    let offset = (page.saturating_sub(1) as u64).saturating_mul(per_page as u64);
    let upper = max_id.saturating_sub(offset);
    let lower = upper.saturating_sub(per_page as u64);
    Window { lower, upper }
}

/// Ceiling division of `total` by `per_page`.
pub fn total_pages(total: u64, per_page: usize) -> u64 {
    total.div_ceil(per_page as u64)
}

#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    pub images: Vec<ImageMeta>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub per_page: usize,
    /// Estimated on the windowed path (anchor value), exact after a drain.
    pub total: u64,
    pub total_pages: u64,
}

/// Fetch one newest-first page through a bounded identifier range query.
///
/// The range query asks for a little more than `per_page` records to absorb
/// gaps in the identifier sequence, then the result is sorted descending
/// client-side in case the store ignored the requested order. A page-1
/// query that comes back empty against a positive anchor means the
/// identifiers are not stored range-queryable; that flips to the
/// full-materialization fallback instead of erroring.
pub async fn fetch_page(
    store: &dyn RemoteStore,
    anchor: &AnchorCache,
    page: usize,
    per_page: usize,
    progress: &dyn ProgressSink,
) -> Result<PageResult> {
    let max_id = anchor.ensure(store).await?;
    let window = window_for(max_id, page, per_page);

    let mut images = Vec::new();
    if !window.is_empty() {
        let spec = image_scope(per_page + constants::RANGE_HEADROOM)
            .gt(constants::ATTR_ID, window.lower)
            .le(constants::ATTR_ID, window.upper);
        let mut cursor = store.query(spec).await?;
        loop {
            images.extend(record::project(cursor.records()));
            if images.len() >= per_page || !cursor.has_next_page() {
                break;
            }
            cursor.next_page().await?;
        }
    }

    // Fallback deliberately fires for page 1 only; later pages with the
    // same data-shape problem return empty pages instead.
    if images.is_empty() && page == 1 && max_id > 0 {
        log::warn!(
            "[Pages] range query empty at anchor {}, falling back to full drain",
            max_id
        );
        let all = materialize::drain_all(store, anchor, progress).await?;
        return Ok(materialize::slice_page(&all, page, per_page));
    }

    images.sort_by(|a, b| b.numeric_id().cmp(&a.numeric_id()));
    images.truncate(per_page);

    let total = anchor.estimate_total().await;
    Ok(PageResult {
        images,
        pagination: PageInfo {
            page,
            per_page,
            total,
            total_pages: total_pages(total, per_page),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_anchor_120_per_page_50() {
        assert_eq!(window_for(120, 1, 50), Window { lower: 70, upper: 120 });
        assert_eq!(window_for(120, 2, 50), Window { lower: 20, upper: 70 });
        // Clipped at 0: 120 - 2*50 = 20 < 50.
        assert_eq!(window_for(120, 3, 50), Window { lower: 0, upper: 20 });
        // Beyond the data: empty window.
        assert!(window_for(120, 4, 50).is_empty());
    }

    #[test]
    fn test_windows_are_contiguous_and_disjoint() {
        let per_page = 7;
        for page in 1..=20 {
            let current = window_for(1000, page, per_page);
            let next = window_for(1000, page + 1, per_page);
            assert_eq!(current.lower, next.upper);
            if !next.is_empty() {
                assert_eq!(current.upper, next.upper + per_page as u64);
            }
        }
    }

    #[test]
    fn test_window_empty_collection() {
        assert!(window_for(0, 1, 10).is_empty());
    }

    #[test]
    fn test_window_huge_page_number_is_empty() {
        // Client-supplied page numbers can be arbitrarily large; the
        // offset must saturate instead of wrapping into a bogus window.
        assert!(window_for(120, usize::MAX, 50).is_empty());
        assert!(window_for(u64::MAX, usize::MAX, usize::MAX).is_empty());
    }

    #[test]
    fn test_total_pages_rounding() {
        assert_eq!(total_pages(120, 50), 3);
        assert_eq!(total_pages(100, 50), 2);
        assert_eq!(total_pages(1, 50), 1);
        assert_eq!(total_pages(0, 50), 0);
    }
}
