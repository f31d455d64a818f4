// Gallery facade: owns the remote store, the anchor cache, and the sessions

use anyhow::Result;
use std::sync::Arc;

use crate::anchor::AnchorCache;
use crate::constants;
use crate::materialize;
use crate::pagination::{self, PageResult};
use crate::progress::ProgressSink;
use crate::remote::RemoteStore;
use crate::session::{SessionOutcome, SessionPage, SessionStore};

/// The one piece of process-wide state the server holds. Both pagination
/// strategies (newest-first windowed and resumable-forward) hang off this,
/// selected by caller intent rather than by any shared hierarchy.
pub struct Gallery {
    store: Arc<dyn RemoteStore>,
    anchor: AnchorCache,
    sessions: Arc<SessionStore>,
}

impl Gallery {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            anchor: AnchorCache::new(),
            sessions: Arc::new(SessionStore::new(constants::SESSION_TTL)),
        }
    }

    /// Newest-first page through descending identifier windows.
    pub async fn page(
        &self,
        page: usize,
        per_page: usize,
        progress: &dyn ProgressSink,
    ) -> Result<PageResult> {
        pagination::fetch_page(self.store.as_ref(), &self.anchor, page, per_page, progress).await
    }

    /// Substring search: drain the whole collection, filter in memory,
    /// paginate the filtered sequence with an exact total.
    pub async fn search(
        &self,
        term: &str,
        page: usize,
        per_page: usize,
        progress: &dyn ProgressSink,
    ) -> Result<PageResult> {
        let all = materialize::drain_all(self.store.as_ref(), &self.anchor, progress).await?;
        let matched = materialize::filter_search(all, term);
        Ok(materialize::slice_page(&matched, page, per_page))
    }

    /// Start a forward-cursor session in the remote store's native order.
    pub async fn open_session(&self, per_page: usize) -> Result<SessionPage> {
        self.sessions.create(self.store.as_ref(), per_page).await
    }

    /// Resume a forward-cursor session by token.
    pub async fn continue_session(&self, token: &str) -> Result<SessionOutcome> {
        self.sessions.advance(token).await
    }

    /// Binary payload of a single record by remote key.
    pub async fn image_payload(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.store.fetch_payload(key).await
    }

    pub async fn estimated_total(&self) -> u64 {
        self.anchor.estimate_total().await
    }

    pub fn sessions(&self) -> Arc<SessionStore> {
        Arc::clone(&self.sessions)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
