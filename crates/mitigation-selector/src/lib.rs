//! Mitigation Selector (spec §4.6): picks the cheapest workflow applicable
//! to a triggered node among the candidates the State Store already
//! filtered by `effective_attacks`.

use mitigation_common::{AttackNode, Workflow};

/// Returns the candidate with the lowest `cost`, breaking ties by the lower
/// `id`. `candidates` is expected to already be filtered to workflows whose
/// `effective_attacks` contains `node.technique` (the State Store's
/// `retrieve_applicable_workflows` does that filtering).
pub fn locate(node: &AttackNode, candidates: &[Workflow]) -> Option<Workflow> {
    let _ = node;
    candidates
        .iter()
        .min_by_key(|w| (w.cost, w.id))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn node() -> AttackNode {
        AttackNode {
            id: 1,
            technique: "T1204.002".into(),
            conditions: Vec::new(),
            probability_history: Vec::new(),
            prv: None,
            nxt: None,
            description: String::new(),
        }
    }

    fn workflow(id: i64, cost: i64) -> Workflow {
        Workflow {
            id,
            name: format!("w{id}"),
            description: String::new(),
            url: "http://actuator.local/run".into(),
            cost,
            effective_attacks: vec!["T1204.002".into()],
            params: HashMap::new(),
            args: HashMap::new(),
            conditions: Vec::new(),
        }
    }

    #[test]
    fn picks_minimum_cost() {
        let candidates = vec![workflow(1, 5), workflow(2, 1), workflow(3, 9)];
        let chosen = locate(&node(), &candidates).unwrap();
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn breaks_cost_ties_by_lower_id() {
        let candidates = vec![workflow(9, 3), workflow(2, 3)];
        let chosen = locate(&node(), &candidates).unwrap();
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn none_when_no_candidates() {
        assert!(locate(&node(), &[]).is_none());
    }
}
