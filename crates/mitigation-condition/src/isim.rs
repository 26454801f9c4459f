use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use mitigation_common::Primitive;
use thiserror::Error;

/// One row of an ISIM query result: a field-keyed map of primitives.
pub type IsimRow = HashMap<String, Primitive>;

#[derive(Debug, Error)]
pub enum IsimQueryError {
    #[error("ISIM unreachable: {0}")]
    Unreachable(String),
    #[error("ISIM query error: {0}")]
    Query(String),
    #[error("ISIM query timed out")]
    Timeout,
}

/// Client for the Information Security Infrastructure Model graph database.
///
/// Out of scope per spec §1 — only the interface is specified (§6): issue a
/// parameterised query, get back a sequence of field-keyed rows.
#[async_trait]
pub trait IsimClient: Send + Sync {
    async fn query(
        &self,
        query: &str,
        params: &HashMap<String, Primitive>,
    ) -> Result<Vec<IsimRow>, IsimQueryError>;
}

/// Production client: POSTs `(query, parameters)` to the ISIM's HTTP query
/// endpoint and expects back a JSON array of field-keyed rows (spec §6: "a
/// graph-query endpoint accepting `(query_string, parameters_map)`").
pub struct ReqwestIsimClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ReqwestIsimClient {
    /// `timeout` bounds the whole request (spec §5: every external call
    /// carries a configurable timeout; exceeding it is a query failure, not
    /// a hang).
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client config is static and always valid");
        Self { client, endpoint }
    }
}

#[derive(serde::Serialize)]
struct IsimQueryRequest<'a> {
    query: &'a str,
    parameters: &'a HashMap<String, Primitive>,
}

#[async_trait]
impl IsimClient for ReqwestIsimClient {
    async fn query(
        &self,
        query: &str,
        params: &HashMap<String, Primitive>,
    ) -> Result<Vec<IsimRow>, IsimQueryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&IsimQueryRequest { query, parameters: params })
            .send()
            .await
            .map_err(|e| if e.is_timeout() { IsimQueryError::Timeout } else { IsimQueryError::Unreachable(e.to_string()) })?;

        if !response.status().is_success() {
            return Err(IsimQueryError::Query(format!("ISIM returned status {}", response.status())));
        }

        response
            .json::<Vec<IsimRow>>()
            .await
            .map_err(|e| IsimQueryError::Query(e.to_string()))
    }
}

/// In-memory stand-in for tests: returns a fixed row set for any query.
#[derive(Default)]
pub struct MockIsimClient {
    pub rows: Vec<IsimRow>,
}

impl MockIsimClient {
    pub fn with_rows(rows: Vec<IsimRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl IsimClient for MockIsimClient {
    async fn query(
        &self,
        _query: &str,
        _params: &HashMap<String, Primitive>,
    ) -> Result<Vec<IsimRow>, IsimQueryError> {
        Ok(self.rows.clone())
    }
}
