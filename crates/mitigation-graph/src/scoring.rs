/// Tunable constants for the probability score (spec §4.3).
#[derive(Debug, Clone, Copy)]
pub struct ScoringConfig {
    pub max_conditions: u32,
    pub graph_interest: f64,
    pub ease_impact: f64,
    pub probability_epsilon: f64,
    pub probability_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            max_conditions: 100,
            graph_interest: 0.5,
            ease_impact: 0.3,
            probability_epsilon: 1e-4,
            probability_threshold: 0.75,
        }
    }
}

/// Factor 1 (progress): grows with how far along the chain the node is.
pub fn factor1(before: usize, after: usize, graph_interest: f64) -> f64 {
    let ratio = before as f64 / (before as f64 + 1.0 + after as f64);
    ratio.powf((1.0 - graph_interest) * 4.0 + 1.0)
}

/// Factor 2 (ease): scales with how many conditions the whole chain carries.
pub fn factor2(total_conditions: usize, max_conditions: u32, ease_impact: f64) -> f64 {
    ((total_conditions as f64 / max_conditions as f64) * ease_impact).clamp(0.0, 1.0)
}

/// Factor 3 (alignment): fraction of this node's own conditions met by the
/// alert, or 1 if it has none.
pub fn factor3(conditions_met: usize, total_conditions: usize) -> f64 {
    if total_conditions == 0 {
        1.0
    } else {
        conditions_met as f64 / total_conditions as f64
    }
}

pub fn combine(f1: f64, f2: f64, f3: f64) -> f64 {
    (f1 + f2 + f3) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor1_is_strictly_increasing_in_progress() {
        let gi = 0.5;
        // A fixed 3-node chain: before=0/after=2, before=1/after=1, before=2/after=0.
        let f_n1 = factor1(0, 2, gi);
        let f_n2 = factor1(1, 1, gi);
        let f_n3 = factor1(2, 0, gi);
        assert!(f_n1 < f_n2);
        assert!(f_n2 < f_n3);
    }

    #[test]
    fn factor2_clamps_to_unit_interval() {
        assert_eq!(factor2(1000, 100, 1.0), 1.0);
        assert_eq!(factor2(0, 100, 0.3), 0.0);
    }

    #[test]
    fn factor3_is_one_when_no_conditions() {
        assert_eq!(factor3(0, 0), 1.0);
        assert_eq!(factor3(1, 2), 0.5);
    }
}
