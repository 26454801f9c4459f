use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::primitive::{ArgBinding, Primitive};

/// A remediation action reachable via an HTTP endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub url: String,
    pub cost: i64,
    pub effective_attacks: Vec<String>,
    pub params: HashMap<String, Primitive>,
    pub args: HashMap<String, ArgBinding>,
    /// Must all be met for this workflow to be executable.
    pub conditions: Vec<Condition>,
}

/// Transient, per-invocation execution state — never persisted as part of
/// the Workflow definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub executed: bool,
    pub results: Option<serde_json::Value>,
    pub executed_at: Option<DateTime<Utc>>,
}
