//! Ingest Core (spec §4.5): the per-alert pipeline — parse, advance live
//! attacks, admit new ones, re-score reachable nodes, classify, and dispatch
//! mitigations.

use std::sync::Arc;

use mitigation_common::{Alert, Attack, AttackNode, WorkflowExecution};
use mitigation_condition::IsimClient;
use mitigation_executor::actuator::ActuatorClient;
use mitigation_graph::ScoringConfig;
use mitigation_store::{StateStore, StoreError};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("ingest worker pool is closed")]
    WorkerPoolClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Past,
    Present,
    Future,
}

/// What happened while ingesting one alert, surfaced for observability and
/// tests. Not part of the wire contract.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub dropped: bool,
    pub advanced: Vec<i64>,
    pub started: Vec<i64>,
    pub completed: Vec<i64>,
    pub rescored: Vec<i64>,
    pub classifications: Vec<(i64, i64, Classification)>,
    pub dispatched: Vec<(i64, WorkflowExecution)>,
}

impl IngestReport {
    fn dropped() -> Self {
        IngestReport { dropped: true, ..Default::default() }
    }
}

/// Orchestrates one alert through the full pipeline (spec §4.5 steps 1-8).
pub struct IngestCore {
    store: StateStore,
    isim: Arc<dyn IsimClient>,
    actuator: Arc<dyn ActuatorClient>,
    scoring: ScoringConfig,
    worker_pool: Arc<Semaphore>,
}

impl IngestCore {
    pub fn new(
        store: StateStore,
        isim: Arc<dyn IsimClient>,
        actuator: Arc<dyn ActuatorClient>,
        scoring: ScoringConfig,
        max_in_flight: usize,
    ) -> Self {
        IngestCore { store, isim, actuator, scoring, worker_pool: Arc::new(Semaphore::new(max_in_flight)) }
    }

    pub async fn ingest(&self, raw: serde_json::Value) -> Result<IngestReport, IngestError> {
        let _permit = self.worker_pool.acquire().await.map_err(|_| IngestError::WorkerPoolClosed)?;

        let alert = match mitigation_parser::parse(&raw) {
            Ok(alert) => alert,
            Err(err) => {
                tracing::warn!(error = %err, "dropping malformed alert");
                return Ok(IngestReport::dropped());
            }
        };
        tracing::debug!(rule_id = ?alert.rule_id, "ingesting alert");

        let mut report = IngestReport::default();
        let mut live: Vec<Attack> = Vec::new();

        // Step 3: advance every live attack whose front the alert triggers.
        for mut attack in self.store.retrieve_state().await? {
            let (arena, front) = self.store.retrieve_full_graph(attack.attack_graph, Some(attack.id)).await?;
            if mitigation_graph::is_triggered(&arena, front, &alert, self.isim.as_ref()).await {
                let completed = self.store.advance(&mut attack, &alert).await?;
                report.advanced.push(attack.id);
                if completed {
                    report.completed.push(attack.id);
                    continue;
                }
            }
            live.push(attack);
        }

        // Step 4: admit new attacks for graphs the alert newly triggers.
        for graph in self.store.retrieve_new_graphs(&alert).await? {
            let mut attack = self.store.start_attack(graph.initial_node).await?;
            report.started.push(attack.id);
            let completed = self.store.advance(&mut attack, &alert).await?;
            if completed {
                report.completed.push(attack.id);
            } else {
                live.push(attack);
            }
        }

        // Step 5: re-score every node reachable from each live attack's front.
        for attack in &live {
            let (mut arena, front) = self.store.retrieve_full_graph(attack.attack_graph, Some(attack.id)).await?;
            for node_id in arena.all(front) {
                let updated =
                    mitigation_graph::update_probability(&mut arena, node_id, &alert, self.isim.as_ref(), &self.scoring)
                        .await;
                if updated {
                    let node = arena.get(node_id).expect("node just updated must exist").clone();
                    self.store.update_probability(&node).await?;
                    report.rescored.push(node_id);
                }
            }
        }

        // Step 6: commit. SQLite autocommits each statement; nothing further
        // to flush here (see StateStore's single-writer note).

        // Steps 7-8: classify reachable nodes, then dispatch mitigations
        // for classified nodes concurrently.
        for attack in &live {
            let (mut arena, front) = self.store.retrieve_full_graph(attack.attack_graph, Some(attack.id)).await?;
            let classified = self.classify(&mut arena, front, &alert);
            for (node_id, classification) in &classified {
                report.classifications.push((attack.id, *node_id, *classification));
            }

            let mut dispatches = JoinSet::new();
            for (node_id, _) in classified {
                let node = arena.get(node_id).expect("classified node must exist").clone();
                let store = self.store.clone();
                let isim = self.isim.clone();
                let actuator = self.actuator.clone();
                let alert = alert.clone();
                dispatches.spawn(async move { dispatch_mitigation(store, node, alert, isim, actuator).await });
            }
            while let Some(outcome) = dispatches.join_next().await {
                match outcome {
                    Ok(Ok(Some((workflow_id, execution)))) => report.dispatched.push((workflow_id, execution)),
                    Ok(Ok(None)) => {}
                    Ok(Err(err)) => tracing::warn!(error = %err, "mitigation dispatch failed"),
                    Err(join_err) => tracing::warn!(error = %join_err, "mitigation dispatch task panicked"),
                }
            }
        }

        Ok(report)
    }

    /// Past/present/future classification of nodes reachable from `front`
    /// (spec §4.5 step 7).
    fn classify(
        &self,
        arena: &mut mitigation_graph::GraphArena,
        front: i64,
        alert: &Alert,
    ) -> Vec<(i64, Classification)> {
        let mut out = Vec::new();

        for ancestor_id in arena.all_before(front) {
            if let Some(node) = arena.get(ancestor_id) {
                if node.historically_risky(self.scoring.probability_threshold) {
                    out.push((ancestor_id, Classification::Past));
                }
            }
        }

        if let Some(node) = arena.get(front) {
            if alert.techniques().iter().any(|t| t == &node.technique) {
                out.push((front, Classification::Present));
            }
        }

        for descendant_id in arena.all_after(front) {
            if let Some(node) = arena.get(descendant_id) {
                if node.current_probability() > self.scoring.probability_threshold {
                    out.push((descendant_id, Classification::Future));
                }
            }
        }

        out
    }
}

async fn dispatch_mitigation(
    store: StateStore,
    node: AttackNode,
    alert: Alert,
    isim: Arc<dyn IsimClient>,
    actuator: Arc<dyn ActuatorClient>,
) -> Result<Option<(i64, WorkflowExecution)>, IngestError> {
    let candidates = store.retrieve_applicable_workflows(&node.technique).await?;
    let Some(workflow) = mitigation_selector::locate(&node, &candidates) else {
        return Ok(None);
    };
    if !mitigation_executor::is_executable(&workflow, &alert, isim.as_ref()).await {
        tracing::info!(workflow_id = workflow.id, node_id = node.id, "workflow not executable, skipping");
        return Ok(None);
    }
    let execution = mitigation_executor::execute(&workflow, &alert, actuator.as_ref()).await;
    Ok(Some((workflow.id, execution)))
}
