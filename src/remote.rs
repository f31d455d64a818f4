// Remote entity store boundary - query specs, cursor traits, and the JSON-RPC client

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::constants;

/// One key/value attribute attached to a remote record. Values arrive as
/// arbitrary JSON; projection decides what to make of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: serde_json::Value,
}

/// A record as the remote store returns it: an opaque key plus whatever
/// attributes the query asked to include.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub key: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// The predicate vocabulary the remote store understands. There is no
/// substring or full-text operator; anything richer happens client-side.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Predicate {
    Eq { key: String, value: String },
    Gt { key: String, value: u64 },
    Le { key: String, value: u64 },
}

/// A single remote query: predicates, page size, and result shaping.
/// Owner scoping is applied by the store implementation, not here.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub predicates: Vec<Predicate>,
    pub page_size: usize,
    pub include_attributes: bool,
    pub include_payload: bool,
    pub order_desc_by: Option<String>,
}

impl QuerySpec {
    pub fn new(page_size: usize) -> Self {
        Self {
            predicates: Vec::new(),
            page_size,
            include_attributes: true,
            include_payload: false,
            order_desc_by: None,
        }
    }

    pub fn eq(mut self, key: &str, value: &str) -> Self {
        self.predicates.push(Predicate::Eq {
            key: key.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn gt(mut self, key: &str, value: u64) -> Self {
        self.predicates.push(Predicate::Gt {
            key: key.to_string(),
            value,
        });
        self
    }

    pub fn le(mut self, key: &str, value: u64) -> Self {
        self.predicates.push(Predicate::Le {
            key: key.to_string(),
            value,
        });
        self
    }

    pub fn order_desc(mut self, key: &str) -> Self {
        self.order_desc_by = Some(key.to_string());
        self
    }
}

/// Query scoped to image records, attributes included, payloads excluded.
pub fn image_scope(page_size: usize) -> QuerySpec {
    QuerySpec::new(page_size).eq(constants::ATTR_TYPE, constants::IMAGE_TYPE)
}

/// One page of results plus the ability to move forward. The remote store
/// only supports forward iteration; there is no rewind and no random access.
#[async_trait]
pub trait RecordCursor: Send {
    /// Records of the current page.
    fn records(&self) -> &[RawRecord];

    /// Whether the store reports further pages after this one.
    fn has_next_page(&self) -> bool;

    /// Advance to the next page, replacing the current records.
    async fn next_page(&mut self) -> Result<()>;
}

/// The constrained remote query interface everything in this crate sits on.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Execute a query and return a live cursor positioned on its first page.
    async fn query(&self, spec: QuerySpec) -> Result<Box<dyn RecordCursor>>;

    /// Point lookup of a record's binary payload by key.
    async fn fetch_payload(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// JSON-RPC implementation of [`RemoteStore`].
///
/// Failures surface as a single "failed to fetch" condition and are never
/// retried here; the HTTP layer maps them to 500s.
#[derive(Clone)]
pub struct RpcStore {
    client: reqwest::Client,
    endpoint: String,
    owner: String,
}

impl RpcStore {
    pub fn new(endpoint: impl Into<String>, owner: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
                .user_agent(constants::user_agent())
                .build()
                .context("Failed to build HTTP client")?,
            endpoint: endpoint.into(),
            owner: owner.into(),
        })
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("RPC request '{}' failed", method))?;
        if !response.status().is_success() {
            bail!("RPC endpoint returned HTTP {}", response.status());
        }
        let envelope: serde_json::Value = response
            .json()
            .await
            .context("Invalid RPC response body")?;
        if let Some(err) = envelope.get("error").filter(|e| !e.is_null()) {
            bail!("RPC error: {}", err);
        }
        Ok(envelope
            .get("result")
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn query_page(&self, spec: &QuerySpec, cursor: Option<&str>) -> Result<QueryPage> {
        let params = json!([{
            "owner": &self.owner,
            "predicates": &spec.predicates,
            "limit": spec.page_size,
            "includeAttributes": spec.include_attributes,
            "includePayload": spec.include_payload,
            "orderDescBy": &spec.order_desc_by,
            "cursor": cursor,
        }]);
        let result = self.call("entity_queryEntities", params).await?;
        serde_json::from_value(result).context("Malformed query result")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryPage {
    #[serde(default)]
    entities: Vec<RawRecord>,
    #[serde(default)]
    next: Option<String>,
}

#[async_trait]
impl RemoteStore for RpcStore {
    async fn query(&self, spec: QuerySpec) -> Result<Box<dyn RecordCursor>> {
        let first = self.query_page(&spec, None).await?;
        Ok(Box::new(RpcCursor {
            store: self.clone(),
            spec,
            records: first.entities,
            next: first.next,
        }))
    }

    async fn fetch_payload(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let result = self.call("entity_getPayload", json!([key])).await?;
        match result {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::String(encoded) => {
                let bytes = BASE64
                    .decode(encoded.as_bytes())
                    .context("Payload is not valid base64")?;
                Ok(Some(bytes))
            }
            other => bail!("Unexpected payload representation: {}", other),
        }
    }
}

/// Live cursor over a JSON-RPC query; `next` is the continuation token the
/// store handed back with the previous page.
struct RpcCursor {
    store: RpcStore,
    spec: QuerySpec,
    records: Vec<RawRecord>,
    next: Option<String>,
}

#[async_trait]
impl RecordCursor for RpcCursor {
    fn records(&self) -> &[RawRecord] {
        &self.records
    }

    fn has_next_page(&self) -> bool {
        self.next.is_some()
    }

    async fn next_page(&mut self) -> Result<()> {
        let Some(token) = self.next.take() else {
            self.records.clear();
            return Ok(());
        };
        let page = self.store.query_page(&self.spec, Some(&token)).await?;
        self.records = page.entities;
        self.next = page.next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_scope_predicates() {
        let spec = image_scope(25);
        assert_eq!(spec.page_size, 25);
        assert!(spec.include_attributes);
        assert!(!spec.include_payload);
        assert!(matches!(
            &spec.predicates[0],
            Predicate::Eq { key, value } if key == "type" && value == "image"
        ));
    }

    #[test]
    fn test_query_spec_range_builders() {
        let spec = QuerySpec::new(10).gt("id", 70).le("id", 120);
        assert_eq!(spec.predicates.len(), 2);
        assert!(matches!(&spec.predicates[0], Predicate::Gt { value: 70, .. }));
        assert!(matches!(&spec.predicates[1], Predicate::Le { value: 120, .. }));
    }

    #[test]
    fn test_raw_record_missing_attributes_deserializes() {
        let record: RawRecord = serde_json::from_str(r#"{"key":"0xabc"}"#).unwrap();
        assert_eq!(record.key, "0xabc");
        assert!(record.attributes.is_empty());
    }
}
