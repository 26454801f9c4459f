use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// A step in an attack graph.
///
/// `prv`/`nxt` are node ids rather than references: chains are built and
/// walked through the state store or an in-memory arena (see
/// `mitigation-graph`), never through owned/shared Rust references, so there
/// is no cycle to worry about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackNode {
    pub id: i64,
    /// MITRE ATT&CK technique id, e.g. `T1204.002`.
    pub technique: String,
    pub conditions: Vec<Condition>,
    /// Ordered; current probability is the last element, or 0 if empty.
    pub probability_history: Vec<f64>,
    pub prv: Option<i64>,
    pub nxt: Option<i64>,
    pub description: String,
}

impl AttackNode {
    pub fn current_probability(&self) -> f64 {
        self.probability_history.last().copied().unwrap_or(0.0)
    }

    pub fn historically_risky(&self, threshold: f64) -> bool {
        if self.probability_history.is_empty() {
            return false;
        }
        let mean: f64 =
            self.probability_history.iter().sum::<f64>() / self.probability_history.len() as f64;
        mean > threshold
    }
}

/// A template chain, identified by its initial node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AttackGraph {
    pub initial_node: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_node(id: i64) -> AttackNode {
        AttackNode {
            id,
            technique: "T1059".into(),
            conditions: Vec::new(),
            probability_history: Vec::new(),
            prv: None,
            nxt: None,
            description: String::new(),
        }
    }

    #[test]
    fn current_probability_defaults_to_zero() {
        let node = empty_node(1);
        assert_eq!(node.current_probability(), 0.0);
    }

    #[test]
    fn historically_risky_requires_mean_strictly_above_threshold() {
        let mut node = empty_node(1);
        node.probability_history = vec![0.8, 0.8];
        assert!(node.historically_risky(0.75));
        node.probability_history = vec![0.75, 0.75];
        assert!(!node.historically_risky(0.75));
    }
}
