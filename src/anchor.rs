// Anchor cache: newest known identifier, raised lazily and incrementally

use anyhow::Result;
use tokio::sync::Mutex;

use crate::constants;
use crate::record;
use crate::remote::{image_scope, RemoteStore};

/// Process-wide single-slot cache of the newest known numeric identifier.
///
/// The slot only ever moves upward. Identifiers are assigned in
/// non-decreasing order by the remote store, so a cached value is always a
/// lower bound on the true maximum; it may lag but never overshoots. The
/// mutex is held across the probe fetch, which makes concurrent refreshes
/// single-flight instead of issuing duplicate probes.
pub struct AnchorCache {
    slot: Mutex<Option<u64>>,
}

impl AnchorCache {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the anchor, probing the remote store as needed.
    ///
    /// Unset: one unordered probe over the image scope; the anchor becomes
    /// the maximum observed identifier, or 0 for an empty collection.
    /// Set: one bounded probe for identifiers strictly greater than the
    /// current anchor. Each call issues at most one remote request; if more
    /// than a probe page of newer records exists, the next call catches up
    /// further rather than draining exhaustively here.
    pub async fn ensure(&self, store: &dyn RemoteStore) -> Result<u64> {
        let mut slot = self.slot.lock().await;
        let spec = match *slot {
            None => image_scope(constants::PROBE_PAGE_SIZE),
            Some(current) => {
                image_scope(constants::PROBE_PAGE_SIZE).gt(constants::ATTR_ID, current)
            }
        };
        let cursor = store.query(spec).await?;
        let observed = record::project(cursor.records())
            .iter()
            .map(|meta| meta.numeric_id())
            .max()
            .unwrap_or(0);
        let anchor = (*slot).unwrap_or(0).max(observed);
        if *slot != Some(anchor) {
            log::debug!("[Anchor] raised to {} (probe observed {})", anchor, observed);
        }
        *slot = Some(anchor);
        Ok(anchor)
    }

    /// Raise the anchor to at least `observed`. Never lowers it and never
    /// touches the remote store; used by the drain path to keep the two
    /// caches consistent.
    pub async fn raise(&self, observed: u64) {
        let mut slot = self.slot.lock().await;
        match *slot {
            Some(current) if current >= observed => {}
            _ => *slot = Some(observed),
        }
    }

    /// Current anchor interpreted as an estimated record count.
    ///
    /// Identifiers form a dense sequence starting near zero, so the newest
    /// identifier doubles as a cheap total. Intentionally an estimate: an
    /// exact count would mean a full drain on every page request.
    pub async fn estimate_total(&self) -> u64 {
        (*self.slot.lock().await).unwrap_or(0)
    }
}

impl Default for AnchorCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_raise_is_monotonic() {
        let anchor = AnchorCache::new();
        assert_eq!(anchor.estimate_total().await, 0);

        anchor.raise(10).await;
        assert_eq!(anchor.estimate_total().await, 10);

        anchor.raise(5).await;
        assert_eq!(anchor.estimate_total().await, 10);

        anchor.raise(11).await;
        assert_eq!(anchor.estimate_total().await, 11);
    }
}
