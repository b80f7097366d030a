//! Activation age selection

use serde::{Deserialize, Serialize};

use crate::model::Scenario;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivationOptimum {
    pub age: u32,
    pub grand_total: f64,
    /// Number of scenarios compared
    pub evaluated: usize,
}

/// Scenario with the highest lifetime income.
///
/// Scans in input order and only replaces the incumbent on a strictly greater
/// total, so ties resolve to the earliest age. Returns `None` when no
/// scenario pays anything.
pub fn optimize_activation_age(scenarios: &[Scenario]) -> Option<ActivationOptimum> {
    let mut best: Option<&Scenario> = None;
    let mut best_total = 0.0;

    for scenario in scenarios {
        if scenario.grand_total > best_total {
            best_total = scenario.grand_total;
            best = Some(scenario);
        }
    }

    best.map(|s| ActivationOptimum {
        age: s.activate_at_age,
        grand_total: s.grand_total,
        evaluated: scenarios.len(),
    })
}
