use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use mitigation_common::Primitive;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("actuator request failed: {0}")]
    Request(String),
    #[error("actuator request timed out")]
    Timeout,
}

/// The outcome of POSTing a workflow's bound parameters to its `url`.
pub struct ActuatorResponse {
    pub status: u16,
    pub body: Option<serde_json::Value>,
}

/// Client for the HTTP endpoint a Workflow names in its `url` field.
#[async_trait]
pub trait ActuatorClient: Send + Sync {
    async fn invoke(
        &self,
        url: &str,
        body: &HashMap<String, Primitive>,
    ) -> Result<ActuatorResponse, ActuatorError>;
}

/// Production implementation: a plain JSON POST.
pub struct ReqwestActuator {
    client: reqwest::Client,
}

impl ReqwestActuator {
    /// `timeout` bounds the whole request (spec §5): an unresponsive
    /// actuator must fail the dispatch, not hang the ingest task.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client config is static and always valid");
        Self { client }
    }
}

#[async_trait]
impl ActuatorClient for ReqwestActuator {
    async fn invoke(
        &self,
        url: &str,
        body: &HashMap<String, Primitive>,
    ) -> Result<ActuatorResponse, ActuatorError> {
        let json_body: HashMap<String, serde_json::Value> =
            body.iter().map(|(k, v)| (k.clone(), serde_json::Value::from(v))).collect();
        let response = self
            .client
            .post(url)
            .json(&json_body)
            .send()
            .await
            .map_err(|e| if e.is_timeout() { ActuatorError::Timeout } else { ActuatorError::Request(e.to_string()) })?;
        let status = response.status().as_u16();
        let body = response.json::<serde_json::Value>().await.ok();
        Ok(ActuatorResponse { status, body })
    }
}

/// In-memory stand-in for tests: always returns a fixed response.
pub struct MockActuator {
    pub status: u16,
    pub body: Option<serde_json::Value>,
}

impl MockActuator {
    pub fn ok(body: serde_json::Value) -> Self {
        Self { status: 200, body: Some(body) }
    }

    pub fn failing(status: u16) -> Self {
        Self { status, body: None }
    }
}

#[async_trait]
impl ActuatorClient for MockActuator {
    async fn invoke(
        &self,
        _url: &str,
        _body: &HashMap<String, Primitive>,
    ) -> Result<ActuatorResponse, ActuatorError> {
        Ok(ActuatorResponse { status: self.status, body: self.body.clone() })
    }
}
