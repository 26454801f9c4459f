//! Relational persistence for conditions, attack nodes, attack graphs,
//! workflows and live attacks (spec §4.4), backed by `sqlx` against SQLite
//! (a relational-DB **path**, per spec §6 — see DESIGN.md for why that's
//! SQLite rather than the teacher's MySQL).

mod attacks;
mod conditions;
pub mod error;
mod graphs;
mod nodes;
mod schema;
pub mod serialize;
mod workflows;

use std::str::FromStr;
use std::time::Duration;

use mitigation_common::{Attack, AttackGraph, ContextValue, Workflow};
use mitigation_graph::GraphArena;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub use error::{InvalidDatabaseStateError, StoreError};
pub use mitigation_common::{AttackNode, Condition};

/// Facade over the relational store. All mutations from one ingest step are
/// expected to be committed within a single call chain (spec §4.4); SQLite's
/// connection-per-operation autocommit mode already gives us that for the
/// single-writer model this engine runs under (spec §5).
#[derive(Clone)]
pub struct StateStore {
    pool: SqlitePool,
}

impl StateStore {
    /// `timeout` bounds both connection acquisition and how long a statement
    /// blocked on a lock may wait (spec §5: the relational store is an
    /// external call like any other — exceeding it surfaces as
    /// `StoreError::Db`, never a hang).
    pub async fn connect(path: &str, timeout: Duration) -> Result<Self, StoreError> {
        let url = format!("sqlite://{path}?mode=rwc");
        let connect_options = SqliteConnectOptions::from_str(&url)?.busy_timeout(timeout);
        let pool = SqlitePoolOptions::new()
            .acquire_timeout(timeout)
            .connect_with(connect_options)
            .await?;
        schema::init(&pool).await?;
        tracing::info!(path, "state store ready");
        Ok(StateStore { pool })
    }

    /// For tests: an in-memory database with the schema already applied.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(5))
            .connect("sqlite::memory:")
            .await?;
        schema::init(&pool).await?;
        Ok(StateStore { pool })
    }

    pub async fn store_condition(&self, condition: &Condition) -> Result<(), StoreError> {
        conditions::store(&self.pool, condition).await
    }

    pub async fn retrieve_condition(&self, id: i64) -> Result<Option<Condition>, StoreError> {
        conditions::retrieve(&self.pool, id).await
    }

    pub async fn store_node(&self, node: &AttackNode) -> Result<(), StoreError> {
        nodes::store(&self.pool, node).await
    }

    pub async fn retrieve_node(&self, id: i64) -> Result<Option<AttackNode>, StoreError> {
        nodes::retrieve(&self.pool, id).await
    }

    pub async fn store_graph(&self, graph: &AttackGraph) -> Result<(), StoreError> {
        graphs::store(&self.pool, graph).await
    }

    pub async fn retrieve_graph(&self, initial_node: i64) -> Result<Option<AttackGraph>, StoreError> {
        graphs::retrieve(&self.pool, initial_node).await
    }

    pub async fn store_workflow(&self, workflow: &Workflow) -> Result<(), StoreError> {
        workflows::store(&self.pool, workflow).await
    }

    pub async fn retrieve_workflow(&self, id: i64) -> Result<Option<Workflow>, StoreError> {
        workflows::retrieve(&self.pool, id).await
    }

    /// All live attacks.
    pub async fn retrieve_state(&self) -> Result<Vec<Attack>, StoreError> {
        attacks::retrieve_state(&self.pool).await
    }

    pub async fn retrieve_applicable_workflows(&self, technique: &str) -> Result<Vec<Workflow>, StoreError> {
        workflows::retrieve_applicable(&self.pool, technique).await
    }

    /// Attack graphs whose initial node's technique is one of the alert's,
    /// excluding graphs where an attack is already tracking this exact
    /// alert instance (spec §4.4 duplicate-detection policy: byte-equal to
    /// an alert stored in any `Attack.context` of any Attack on that graph).
    pub async fn retrieve_new_graphs(
        &self,
        alert: &mitigation_common::Alert,
    ) -> Result<Vec<AttackGraph>, StoreError> {
        let mut eligible = Vec::new();
        for graph in graphs::list(&self.pool).await? {
            let Some(node) = nodes::retrieve(&self.pool, graph.initial_node).await? else {
                return Err(StoreError::invalid_state(format!(
                    "attack graph {} references missing initial node",
                    graph.initial_node
                )));
            };
            if !alert.techniques().iter().any(|t| t == &node.technique) {
                continue;
            }
            let already_tracked = attacks::for_graph(&self.pool, graph.initial_node)
                .await?
                .iter()
                .any(|attack| attack.context.values().any(|v| matches!(v, ContextValue::Alert(existing) if existing == alert)));
            if !already_tracked {
                eligible.push(graph);
            }
        }
        Ok(eligible)
    }

    /// Reconstructs the whole chain starting at `initial_node`. The
    /// returned front is the chain's current front for `attack_id` if given,
    /// otherwise the initial node itself.
    pub async fn retrieve_full_graph(
        &self,
        initial_node: i64,
        attack_id: Option<i64>,
    ) -> Result<(GraphArena, i64), StoreError> {
        let mut arena = GraphArena::new();
        let mut visited = std::collections::HashSet::new();
        let mut current = Some(initial_node);
        while let Some(id) = current {
            if !visited.insert(id) {
                return Err(StoreError::invalid_state(format!(
                    "chain from node {initial_node} revisits node {id}, expected an acyclic chain"
                )));
            }
            let Some(node) = nodes::retrieve(&self.pool, id).await? else {
                return Err(StoreError::invalid_state(format!(
                    "chain from node {initial_node} references missing node {id}"
                )));
            };
            let successors = nodes::successor_count(&self.pool, id).await?;
            if successors > 1 {
                return Err(StoreError::invalid_state(format!(
                    "node {id} has {successors} successors, expected at most one"
                )));
            }
            current = node.nxt;
            arena.insert(node);
        }

        let front = match attack_id {
            None => initial_node,
            Some(attack_id) => {
                let Some(attack) = attacks::retrieve(&self.pool, attack_id).await? else {
                    return Err(StoreError::invalid_state(format!("attack {attack_id} not found")));
                };
                if !arena.contains(attack.attack_front) {
                    return Err(StoreError::invalid_state(format!(
                        "attack {attack_id} front {} does not belong to chain from {initial_node}",
                        attack.attack_front
                    )));
                }
                attack.attack_front
            }
        };
        Ok((arena, front))
    }

    pub async fn start_attack(&self, initial_node: i64) -> Result<Attack, StoreError> {
        attacks::start(&self.pool, initial_node).await
    }

    /// Records `alert` under the current front, then advances the front or
    /// completes the attack. Returns `true` iff the attack completed.
    pub async fn advance(
        &self,
        attack: &mut Attack,
        alert: &mitigation_common::Alert,
    ) -> Result<bool, StoreError> {
        let Some(front_node) = nodes::retrieve(&self.pool, attack.attack_front).await? else {
            return Err(StoreError::invalid_state(format!(
                "attack {} front {} references missing node",
                attack.id, attack.attack_front
            )));
        };
        attack
            .context
            .insert(front_node.id.to_string(), ContextValue::Alert(alert.clone()));

        match front_node.nxt {
            Some(next_id) => {
                attack.attack_front = next_id;
                attacks::persist(&self.pool, attack).await?;
                tracing::debug!(attack_id = attack.id, front = next_id, "attack advanced");
                Ok(false)
            }
            None => {
                attacks::delete(&self.pool, attack.id).await?;
                attack.is_complete = true;
                tracing::info!(attack_id = attack.id, "attack completed");
                Ok(true)
            }
        }
    }

    pub async fn update_probability(&self, node: &AttackNode) -> Result<(), StoreError> {
        nodes::update_probability_history(&self.pool, node.id, &node.probability_history).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitigation_common::{Alert, AttackGraph};
    use std::collections::{HashMap, HashSet};

    fn node(id: i64, technique: &str, prv: Option<i64>, nxt: Option<i64>) -> AttackNode {
        AttackNode {
            id,
            technique: technique.to_string(),
            conditions: Vec::new(),
            probability_history: Vec::new(),
            prv,
            nxt,
            description: String::new(),
        }
    }

    async fn seed_two_node_graph(store: &StateStore) {
        store.store_node(&node(1, "T0001", None, Some(2))).await.unwrap();
        store.store_node(&node(2, "T0002", Some(1), None)).await.unwrap();
        store.store_graph(&AttackGraph { initial_node: 1 }).await.unwrap();
    }

    fn alert_with_techniques(techniques: &[&str]) -> Alert {
        let mut alert = Alert::empty(serde_json::json!({"seed": techniques}));
        alert.rule_mitre_ids = techniques.iter().map(|s| s.to_string()).collect();
        alert
    }

    #[tokio::test]
    async fn initial_node_trigger_creates_one_attack() {
        let store = StateStore::in_memory().await.unwrap();
        seed_two_node_graph(&store).await;

        let alert = alert_with_techniques(&["T0001"]);
        let graphs = store.retrieve_new_graphs(&alert).await.unwrap();
        assert_eq!(graphs.len(), 1);

        let mut attack = store.start_attack(graphs[0].initial_node).await.unwrap();
        store.advance(&mut attack, &alert).await.unwrap();
        assert_eq!(attack.attack_front, 2);
        assert!(!attack.is_complete);

        let state = store.retrieve_state().await.unwrap();
        assert_eq!(state.len(), 1);
    }

    #[tokio::test]
    async fn advance_past_terminal_node_deletes_attack() {
        let store = StateStore::in_memory().await.unwrap();
        seed_two_node_graph(&store).await;

        let first = alert_with_techniques(&["T0001"]);
        let mut attack = store.start_attack(1).await.unwrap();
        store.advance(&mut attack, &first).await.unwrap();

        let second = alert_with_techniques(&["T0002"]);
        let completed = store.advance(&mut attack, &second).await.unwrap();
        assert!(completed);
        assert!(attack.is_complete);
        assert!(store.retrieve_state().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_duplicate_attacks_for_the_same_alert() {
        let store = StateStore::in_memory().await.unwrap();
        seed_two_node_graph(&store).await;

        let alert = alert_with_techniques(&["T0001"]);
        let mut attack = store.start_attack(1).await.unwrap();
        store.advance(&mut attack, &alert).await.unwrap();

        // Ingesting the same alert again must not surface a new eligible graph.
        let graphs_again = store.retrieve_new_graphs(&alert).await.unwrap();
        assert!(graphs_again.is_empty());
    }

    #[tokio::test]
    async fn retrieve_full_graph_rejects_a_cycle() {
        let store = StateStore::in_memory().await.unwrap();
        store.store_node(&node(1, "T0001", None, Some(2))).await.unwrap();
        store.store_node(&node(2, "T0002", Some(1), Some(1))).await.unwrap();
        store.store_graph(&AttackGraph { initial_node: 1 }).await.unwrap();

        let result = store.retrieve_full_graph(1, None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn retrieve_full_graph_rejects_front_outside_chain() {
        let store = StateStore::in_memory().await.unwrap();
        seed_two_node_graph(&store).await;
        store.store_node(&node(99, "T9999", None, None)).await.unwrap();

        let attack = Attack {
            id: 1,
            attack_graph: 1,
            attack_front: 99,
            context: HashMap::new(),
            is_complete: false,
        };
        sqlx::query("INSERT INTO attacks (id, attack_graph, attack_front, context, is_complete) VALUES (1, 1, 99, '{}', 0)")
            .execute(&store.pool)
            .await
            .unwrap();
        let result = store.retrieve_full_graph(attack.attack_graph, Some(1)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn condition_round_trips_through_checks_and_args() {
        let store = StateStore::in_memory().await.unwrap();
        let mut args = HashMap::new();
        args.insert("ip".to_string(), mitigation_common::ArgBinding::Single("agent_ip".into()));
        let condition = Condition {
            id: 1,
            name: "test".into(),
            description: "".into(),
            params: HashMap::new(),
            args,
            query: "MATCH (n) RETURN n".into(),
            checks: HashSet::from([mitigation_common::CheckKind::AnyResult]),
        };
        store.store_condition(&condition).await.unwrap();
        let fetched = store.retrieve_condition(1).await.unwrap().unwrap();
        assert_eq!(fetched.checks, condition.checks);
        assert_eq!(fetched.args.len(), 1);
    }
}
