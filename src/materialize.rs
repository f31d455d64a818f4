// Full materialization: drain every remote page into memory
//
// This is the expensive path. It exists because the remote predicate
// language has no substring operator, so search (and anything else global)
// must see the whole collection.

use anyhow::Result;

use crate::anchor::AnchorCache;
use crate::constants;
use crate::pagination::{total_pages, PageInfo, PageResult};
use crate::progress::ProgressSink;
use crate::record::{self, ImageMeta};
use crate::remote::{image_scope, RemoteStore};

/// Drain the remote cursor to completion and return every image record,
/// newest first. Progress is reported after each remote page. As a side
/// effect the anchor is raised to the maximum identifier observed, keeping
/// the two caches eventually consistent. A mid-drain failure aborts the
/// whole operation; no partial result is returned or cached.
pub async fn drain_all(
    store: &dyn RemoteStore,
    anchor: &AnchorCache,
    progress: &dyn ProgressSink,
) -> Result<Vec<ImageMeta>> {
    let mut cursor = store.query(image_scope(constants::MATERIALIZE_PAGE_SIZE)).await?;
    let mut records = Vec::new();
    loop {
        records.extend(record::project(cursor.records()));
        progress.notify("Fetching images", records.len());
        if !cursor.has_next_page() {
            break;
        }
        cursor.next_page().await?;
    }

    records.sort_by(|a, b| b.numeric_id().cmp(&a.numeric_id()));
    if let Some(max) = records.first().map(|meta| meta.numeric_id()) {
        anchor.raise(max).await;
    }
    log::debug!("[Drain] materialized {} records", records.len());
    Ok(records)
}

/// Case-insensitive substring filter on the prompt text.
pub fn filter_search(records: Vec<ImageMeta>, term: &str) -> Vec<ImageMeta> {
    let needle = term.to_lowercase();
    records
        .into_iter()
        .filter(|meta| meta.prompt.to_lowercase().contains(&needle))
        .collect()
}

/// Paginate an already materialized, already sorted sequence with plain
/// offset arithmetic. The total here is exact, not an anchor estimate.
pub fn slice_page(records: &[ImageMeta], page: usize, per_page: usize) -> PageResult {
    let total = records.len() as u64;
    let start = page.saturating_sub(1).saturating_mul(per_page);
    let images = records.iter().skip(start).take(per_page).cloned().collect();
    PageResult {
        images,
        pagination: PageInfo {
            page,
            per_page,
            total,
            total_pages: total_pages(total, per_page),
        },
    }
}
