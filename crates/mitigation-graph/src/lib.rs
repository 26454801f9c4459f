//! Attack graph model (spec §4.3): linked attack nodes addressed through an
//! in-memory arena, per-node ancestor/descendant caches, and the
//! probabilistic node-scoring function.

pub mod arena;
pub mod scoring;

pub use arena::GraphArena;
pub use scoring::ScoringConfig;

use mitigation_common::Alert;
use mitigation_condition::IsimClient;

/// True iff the alert triggers `id`: its technique matches one of the
/// alert's, and every one of its conditions is met.
pub async fn is_triggered(arena: &GraphArena, id: i64, alert: &Alert, isim: &dyn IsimClient) -> bool {
    let Some(node) = arena.get(id) else { return false };
    if !alert.triggers(node) {
        return false;
    }
    for condition in &node.conditions {
        if !mitigation_condition::is_met(condition, alert, isim).await {
            return false;
        }
    }
    true
}

/// Re-scores node `id` against `alert` and appends to its probability
/// history iff the new value differs from the old by at least
/// `config.probability_epsilon`. Returns whether an update occurred.
pub async fn update_probability(
    arena: &mut GraphArena,
    id: i64,
    alert: &Alert,
    isim: &dyn IsimClient,
    config: &ScoringConfig,
) -> bool {
    let before = arena.all_before(id).len();
    let after = arena.all_after(id).len();
    let chain_condition_total: usize = arena
        .all(id)
        .iter()
        .filter_map(|n| arena.get(*n))
        .map(|n| n.conditions.len())
        .sum();

    let (own_condition_count, conditions) = match arena.get(id) {
        Some(node) => (node.conditions.len(), node.conditions.clone()),
        None => return false,
    };

    let mut met = 0usize;
    for condition in &conditions {
        if mitigation_condition::is_met(condition, alert, isim).await {
            met += 1;
        }
    }

    let f1 = scoring::factor1(before, after, config.graph_interest);
    let f2 = scoring::factor2(chain_condition_total, config.max_conditions, config.ease_impact);
    let f3 = scoring::factor3(met, own_condition_count);
    let p_new = scoring::combine(f1, f2, f3);

    let Some(node) = arena.get_mut(id) else { return false };
    let p_old = node.current_probability();
    if (p_new - p_old).abs() >= config.probability_epsilon {
        node.probability_history.push(p_new);
        tracing::debug!(node_id = id, p_old, p_new, "updated node probability");
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitigation_common::AttackNode;
    use mitigation_condition::MockIsimClient;

    fn empty_node(id: i64, prv: Option<i64>, nxt: Option<i64>) -> AttackNode {
        AttackNode {
            id,
            technique: format!("T{id}"),
            conditions: Vec::new(),
            probability_history: Vec::new(),
            prv,
            nxt,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn rescoring_three_empty_condition_nodes_increases_with_progress() {
        let mut arena = GraphArena::new();
        arena.insert(empty_node(1, None, Some(2)));
        arena.insert(empty_node(2, Some(1), Some(3)));
        arena.insert(empty_node(3, Some(2), None));

        let alert = Alert::empty(serde_json::json!({}));
        let isim = MockIsimClient::default();
        let config = ScoringConfig::default();

        for id in [1, 2, 3] {
            update_probability(&mut arena, id, &alert, &isim, &config).await;
        }

        let p1 = arena.get(1).unwrap().current_probability();
        let p2 = arena.get(2).unwrap().current_probability();
        let p3 = arena.get(3).unwrap().current_probability();
        assert!(p1 < p2, "p1={p1} p2={p2}");
        assert!(p2 < p3, "p2={p2} p3={p3}");
    }

    #[tokio::test]
    async fn stable_score_leaves_history_unchanged() {
        let mut arena = GraphArena::new();
        arena.insert(empty_node(1, None, None));
        let alert = Alert::empty(serde_json::json!({}));
        let isim = MockIsimClient::default();
        let config = ScoringConfig::default();

        let updated = update_probability(&mut arena, 1, &alert, &isim, &config).await;
        assert!(updated);
        let len_after_first = arena.get(1).unwrap().probability_history.len();

        let updated_again = update_probability(&mut arena, 1, &alert, &isim, &config).await;
        assert!(!updated_again);
        assert_eq!(arena.get(1).unwrap().probability_history.len(), len_after_first);
    }
}
