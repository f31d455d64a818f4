// Cursor sessions: resumable forward paging over live remote cursors

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::constants;
use crate::record::{self, ImageMeta};
use crate::remote::{image_scope, RecordCursor, RemoteStore};

/// A live remote cursor parked between requests, addressed by an opaque
/// token. The cursor advances forward only; there is no random access.
struct SessionEntry {
    cursor: Box<dyn RecordCursor>,
    page_index: usize,
    per_page: usize,
    last_touch: Instant,
}

/// One page handed back to a session client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPage {
    pub images: Vec<ImageMeta>,
    pub session_id: String,
    pub has_more: bool,
}

pub enum SessionOutcome {
    Page(SessionPage),
    /// Unknown token, or a token whose last touch exceeded the TTL.
    NotFound,
}

/// Holds live cursors keyed by unguessable tokens, with a sliding TTL.
///
/// The outer map lock is never held across an await; each entry carries its
/// own async mutex so two requests racing on the same token serialize
/// instead of both advancing one cursor.
pub struct SessionStore {
    entries: Mutex<HashMap<String, Arc<tokio::sync::Mutex<SessionEntry>>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Open a new session: one descending-by-id query, first page returned
    /// immediately, live cursor stored under a fresh token.
    pub async fn create(
        &self,
        store: &dyn RemoteStore,
        per_page: usize,
    ) -> Result<SessionPage> {
        let spec = image_scope(per_page).order_desc(constants::ATTR_ID);
        let cursor = store.query(spec).await?;
        let images = record::project(cursor.records());
        let has_more = cursor.has_next_page();

        let token = Uuid::new_v4().to_string();
        let entry = SessionEntry {
            cursor,
            page_index: 1,
            per_page,
            last_touch: Instant::now(),
        };
        self.entries
            .lock()
            .unwrap()
            .insert(token.clone(), Arc::new(tokio::sync::Mutex::new(entry)));
        log::debug!("[Session] created {} (perPage {})", token, per_page);

        Ok(SessionPage {
            images,
            session_id: token,
            has_more,
        })
    }

    /// Advance a session by exactly one page, refreshing its TTL.
    ///
    /// An exhausted cursor yields an empty page with `has_more = false`
    /// without mutating anything, so clients polling past the end are
    /// harmless.
    pub async fn advance(&self, token: &str) -> Result<SessionOutcome> {
        let entry = {
            let entries = self.entries.lock().unwrap();
            entries.get(token).cloned()
        };
        let Some(entry) = entry else {
            return Ok(SessionOutcome::NotFound);
        };

        let mut entry = entry.lock().await;
        if entry.last_touch.elapsed() > self.ttl {
            // Expired but not yet swept; indistinguishable from missing.
            return Ok(SessionOutcome::NotFound);
        }
        if !entry.cursor.has_next_page() {
            return Ok(SessionOutcome::Page(SessionPage {
                images: Vec::new(),
                session_id: token.to_string(),
                has_more: false,
            }));
        }

        entry.cursor.next_page().await?;
        entry.page_index += 1;
        entry.last_touch = Instant::now();
        let images = record::project(entry.cursor.records());
        let has_more = entry.cursor.has_next_page();
        log::debug!(
            "[Session] {} advanced to page {} ({} of {} requested)",
            token,
            entry.page_index,
            images.len(),
            entry.per_page
        );

        Ok(SessionOutcome::Page(SessionPage {
            images,
            session_id: token.to_string(),
            has_more,
        }))
    }

    /// Drop every entry whose last touch is older than the TTL. Dropping an
    /// entry drops its boxed cursor and with it the underlying remote
    /// resources. Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|token, entry| match entry.try_lock() {
            Ok(guard) => {
                let keep = guard.last_touch.elapsed() <= self.ttl;
                if !keep {
                    log::debug!("[Session] expired {}", token);
                }
                keep
            }
            // Locked means a request is touching it right now.
            Err(_) => true,
        });
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

/// Spawn the background sweeper: one scan per interval until shutdown.
pub fn spawn_sweeper(
    sessions: Arc<SessionStore>,
    mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(constants::SWEEP_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = sessions.sweep();
                    if removed > 0 {
                        log::debug!("[Session] swept {} expired sessions", removed);
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    })
}
