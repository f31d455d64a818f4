// Shared test fixtures: an in-memory remote store and a test server

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use imagedeck::remote::{Attribute, Predicate, QuerySpec, RawRecord, RecordCursor, RemoteStore};
use imagedeck::server::{create_router, ServerConfig};
use imagedeck::Gallery;

#[derive(Clone)]
pub struct MockRecord {
    pub key: String,
    pub id: u64,
    pub prompt: String,
    pub payload: Vec<u8>,
}

pub fn image(id: u64, prompt: &str) -> MockRecord {
    MockRecord {
        key: format!("0x{:04x}", id),
        id,
        prompt: prompt.to_string(),
        payload: vec![0x89, b'P', b'N', b'G', id as u8],
    }
}

/// In-memory stand-in for the remote entity store. With `numeric_ids`
/// false it ignores range predicates on `id`, mimicking a store whose
/// identifiers are not range-queryable.
pub struct MockStore {
    records: Mutex<Vec<MockRecord>>,
    numeric_ids: bool,
    queries: AtomicUsize,
    fetch_budget: Arc<Mutex<Option<usize>>>,
}

impl MockStore {
    pub fn new(records: Vec<MockRecord>, numeric_ids: bool) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
            numeric_ids,
            queries: AtomicUsize::new(0),
            fetch_budget: Arc::new(Mutex::new(None)),
        })
    }

    #[allow(dead_code)]
    pub fn push(&self, record: MockRecord) {
        self.records.lock().unwrap().push(record);
    }

    #[allow(dead_code)]
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Allow `n` more remote fetches (queries, page advances, payload
    /// lookups), then fail every one after that.
    #[allow(dead_code)]
    pub fn fail_after(&self, n: usize) {
        *self.fetch_budget.lock().unwrap() = Some(n);
    }
}

fn charge(budget: &Mutex<Option<usize>>) -> Result<()> {
    let mut budget = budget.lock().unwrap();
    if let Some(remaining) = budget.as_mut() {
        if *remaining == 0 {
            anyhow::bail!("remote store unavailable");
        }
        *remaining -= 1;
    }
    Ok(())
}

fn matches(record: &MockRecord, predicates: &[Predicate], numeric_ids: bool) -> bool {
    predicates.iter().all(|predicate| match predicate {
        Predicate::Eq { key, value } => key == "type" && value == "image",
        Predicate::Gt { key, value } => numeric_ids && key == "id" && record.id > *value,
        Predicate::Le { key, value } => numeric_ids && key == "id" && record.id <= *value,
    })
}

fn to_raw(record: &MockRecord) -> RawRecord {
    RawRecord {
        key: record.key.clone(),
        attributes: vec![
            Attribute {
                key: "id".to_string(),
                value: json!(record.id.to_string()),
            },
            Attribute {
                key: "prompt".to_string(),
                value: json!(record.prompt),
            },
            Attribute {
                key: "type".to_string(),
                value: json!("image"),
            },
        ],
    }
}

#[async_trait]
impl RemoteStore for MockStore {
    async fn query(&self, spec: QuerySpec) -> Result<Box<dyn RecordCursor>> {
        charge(&self.fetch_budget)?;
        self.queries.fetch_add(1, Ordering::SeqCst);
        let mut matched: Vec<MockRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| matches(record, &spec.predicates, self.numeric_ids))
            .cloned()
            .collect();
        if spec.order_desc_by.as_deref() == Some("id") {
            matched.sort_by(|a, b| b.id.cmp(&a.id));
        }
        let pages: Vec<Vec<RawRecord>> = matched
            .chunks(spec.page_size.max(1))
            .map(|chunk| chunk.iter().map(to_raw).collect())
            .collect();
        Ok(Box::new(MockCursor {
            pages,
            index: 0,
            fetch_budget: Arc::clone(&self.fetch_budget),
        }))
    }

    async fn fetch_payload(&self, key: &str) -> Result<Option<Vec<u8>>> {
        charge(&self.fetch_budget)?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.key == key)
            .map(|record| record.payload.clone()))
    }
}

struct MockCursor {
    pages: Vec<Vec<RawRecord>>,
    index: usize,
    fetch_budget: Arc<Mutex<Option<usize>>>,
}

#[async_trait]
impl RecordCursor for MockCursor {
    fn records(&self) -> &[RawRecord] {
        self.pages
            .get(self.index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn has_next_page(&self) -> bool {
        self.index + 1 < self.pages.len()
    }

    async fn next_page(&mut self) -> Result<()> {
        // Each advance is a remote fetch and can fail like one.
        charge(&self.fetch_budget)?;
        // Advancing past the end leaves an empty current page.
        self.index = (self.index + 1).min(self.pages.len());
        Ok(())
    }
}

#[allow(dead_code)]
pub fn gallery_over(store: Arc<MockStore>) -> Gallery {
    let store: Arc<dyn RemoteStore> = store;
    Gallery::new(store)
}

#[allow(dead_code)]
pub async fn start_test_server(
    store: Arc<MockStore>,
    port: u16,
) -> Result<tokio::task::JoinHandle<()>> {
    let gallery = Arc::new(gallery_over(store));
    let config = ServerConfig {
        version: "test".to_string(),
        owner: "0xowner".to_string(),
    };
    let app = create_router(gallery, config, Instant::now());
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    Ok(tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    }))
}
