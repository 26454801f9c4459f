//! Workflow Executor (spec §4.7): decides whether a workflow can fire for an
//! alert, and fires it.

pub mod actuator;

use mitigation_common::{Alert, Workflow, WorkflowExecution};
use mitigation_condition::{bind_parameters, is_met, IsimClient};

use crate::actuator::ActuatorClient;

/// All of the workflow's conditions must be met (spec §4.2) for it to run.
pub async fn is_executable(workflow: &Workflow, alert: &Alert, isim: &dyn IsimClient) -> bool {
    for condition in &workflow.conditions {
        if !is_met(condition, alert, isim).await {
            return false;
        }
    }
    true
}

/// Fire-and-record: binds the request body the same way condition
/// parameters are bound, then POSTs it to `workflow.url`. Never retries.
pub async fn execute(
    workflow: &Workflow,
    alert: &Alert,
    actuator: &dyn ActuatorClient,
) -> WorkflowExecution {
    let Some(body) = bind_parameters(&workflow.args, &workflow.params, alert) else {
        tracing::warn!(workflow_id = workflow.id, "workflow parameter binding incomplete, skipping");
        return WorkflowExecution::default();
    };

    let executed_at = Some(chrono::Utc::now());
    match actuator.invoke(&workflow.url, &body).await {
        Ok(response) if response.status == 200 => {
            tracing::info!(workflow_id = workflow.id, status = response.status, "workflow executed");
            WorkflowExecution { executed: true, results: response.body, executed_at }
        }
        Ok(response) => {
            tracing::warn!(
                workflow_id = workflow.id,
                status = response.status,
                body = ?response.body,
                "workflow actuator returned non-200"
            );
            WorkflowExecution { executed: false, results: response.body, executed_at }
        }
        Err(err) => {
            tracing::warn!(workflow_id = workflow.id, error = %err, "workflow actuator request failed");
            WorkflowExecution { executed_at, ..WorkflowExecution::default() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::MockActuator;
    use mitigation_common::{ArgBinding, CheckKind, Condition};
    use mitigation_condition::MockIsimClient;
    use std::collections::{HashMap, HashSet};

    fn workflow_with(conditions: Vec<Condition>) -> Workflow {
        let mut args = HashMap::new();
        args.insert("ip".to_string(), ArgBinding::Single("agent_ip".into()));
        Workflow {
            id: 1,
            name: "block-ip".into(),
            description: String::new(),
            url: "http://actuator.local/block".into(),
            cost: 1,
            effective_attacks: vec!["T1204.002".into()],
            params: HashMap::new(),
            args,
            conditions,
        }
    }

    fn condition_requiring_any_result() -> Condition {
        Condition {
            id: 1,
            name: "host-known".into(),
            description: String::new(),
            params: HashMap::new(),
            args: HashMap::new(),
            query: "MATCH (n) RETURN n".into(),
            checks: HashSet::from([CheckKind::AnyResult]),
        }
    }

    #[tokio::test]
    async fn not_executable_when_condition_unmet() {
        let workflow = workflow_with(vec![condition_requiring_any_result()]);
        let mut alert = Alert::empty(serde_json::json!({}));
        alert.agent_ip = Some("10.0.0.1".into());
        let isim = MockIsimClient::default();
        assert!(!is_executable(&workflow, &alert, &isim).await);
    }

    #[tokio::test]
    async fn execute_skips_when_binding_incomplete() {
        let workflow = workflow_with(vec![]);
        let alert = Alert::empty(serde_json::json!({})); // no agent_ip
        let actuator = MockActuator::ok(serde_json::json!({"ok": true}));
        let execution = execute(&workflow, &alert, &actuator).await;
        assert!(!execution.executed);
        assert!(execution.results.is_none());
    }

    #[tokio::test]
    async fn execute_records_success_on_http_200() {
        let workflow = workflow_with(vec![]);
        let mut alert = Alert::empty(serde_json::json!({}));
        alert.agent_ip = Some("10.0.0.1".into());
        let actuator = MockActuator::ok(serde_json::json!({"blocked": true}));
        let execution = execute(&workflow, &alert, &actuator).await;
        assert!(execution.executed);
        assert_eq!(execution.results, Some(serde_json::json!({"blocked": true})));
    }

    #[tokio::test]
    async fn execute_records_failure_on_non_200() {
        let workflow = workflow_with(vec![]);
        let mut alert = Alert::empty(serde_json::json!({}));
        alert.agent_ip = Some("10.0.0.1".into());
        let actuator = MockActuator::failing(500);
        let execution = execute(&workflow, &alert, &actuator).await;
        assert!(!execution.executed);
    }
}
