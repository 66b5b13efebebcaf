use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::input::Problem;
use crate::solve::{SolveStatus, SolvedModel};

/// Half-width of the bands around 0 and 1 inside which a bound variable
/// value counts as cleanly binary.
pub const BINARY_TOLERANCE: f64 = 1e-6;

/// Full binary table: tier → item → lane → 0/1.
pub type Assignment = BTreeMap<String, BTreeMap<String, BTreeMap<String, u8>>>;

/// A bound variable value that fell outside the binary tolerance bands.
/// The value is still rounded and the run proceeds; the caller decides
/// whether to distrust the assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecisionWarning {
    pub item: String,
    pub lane: String,
    pub tier: String,
    pub value: f64,
}

/// Domain-level result of one optimization run.
///
/// Numeric fields are present only when the status is optimal; loads and
/// the total difference are recomputed from the rounded variable values
/// and item weights rather than read back from the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub status: SolveStatus,
    pub objective_value: Option<f64>,
    pub loads_by_tier: Option<BTreeMap<String, f64>>,
    pub total_difference: Option<f64>,
    pub assignment: Option<Assignment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub precision_warnings: Vec<PrecisionWarning>,
}

/// Projects raw solver output back into the domain result.
pub fn project(problem: &Problem, solved: &SolvedModel) -> Report {
    if solved.status != SolveStatus::Optimal {
        return Report {
            status: solved.status,
            objective_value: None,
            loads_by_tier: None,
            total_difference: None,
            assignment: None,
            precision_warnings: Vec::new(),
        };
    }

    let mut warnings = Vec::new();
    let mut assignment = Assignment::new();
    let mut loads = vec![0.0; problem.tiers.len()];

    for (t, tier) in problem.tiers.iter().enumerate() {
        let per_tier = assignment.entry(tier.clone()).or_default();
        for (i, item) in problem.items.iter().enumerate() {
            let per_item: &mut BTreeMap<String, u8> =
                per_tier.entry(item.name.clone()).or_default();
            for (l, lane) in problem.lanes.iter().enumerate() {
                let value = solved.value(i, l, t);
                if !is_cleanly_binary(value) {
                    tracing::warn!(
                        item = item.name.as_str(),
                        lane = lane.as_str(),
                        tier = tier.as_str(),
                        value,
                        "bound value outside binary tolerance, rounding"
                    );
                    warnings.push(PrecisionWarning {
                        item: item.name.clone(),
                        lane: lane.clone(),
                        tier: tier.clone(),
                        value,
                    });
                }
                let bit = round_binary(value);
                per_item.insert(lane.clone(), bit);
                loads[t] += f64::from(bit) * item.weight;
            }
        }
    }

    let total_difference = loads
        .windows(2)
        .map(|pair| pair[0] - pair[1])
        .sum::<f64>();

    let loads_by_tier = problem
        .tiers
        .iter()
        .cloned()
        .zip(loads.iter().copied())
        .collect();

    Report {
        status: solved.status,
        objective_value: solved.objective_value,
        loads_by_tier: Some(loads_by_tier),
        total_difference: Some(total_difference),
        assignment: Some(assignment),
        precision_warnings: warnings,
    }
}

fn is_cleanly_binary(value: f64) -> bool {
    value.abs() <= BINARY_TOLERANCE || (value - 1.0).abs() <= BINARY_TOLERANCE
}

fn round_binary(value: f64) -> u8 {
    value.round().clamp(0.0, 1.0) as u8
}
