use std::time::Duration;

use good_lp::solvers::coin_cbc::coin_cbc;
use good_lp::{IntoAffineExpression, ResolutionError, Solution, SolutionStatus, SolverModel};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Model, Shape};

/// Terminal outcome of one solver run.
///
/// Infeasible, unbounded, and undefined are ordinary outcomes reported to
/// the caller, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// The solver stopped (e.g. at the time limit) without proving
    /// optimality.
    Undefined,
}

/// Knobs forwarded to the backend for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveOptions {
    /// Wall-clock budget handed to CBC. No limit when absent.
    pub time_limit: Option<Duration>,
    /// CBC log level; 0 keeps the backend quiet.
    pub log_level: u32,
}

/// The backend could not be invoked or failed abnormally.
#[derive(Debug, Error)]
#[error("solver unavailable: {reason}")]
pub struct SolverUnavailable {
    pub reason: String,
}

/// Variable values bound by the solver, plus the status and achieved
/// objective. Values are present only for an optimal run.
pub struct SolvedModel {
    pub status: SolveStatus,
    pub objective_value: Option<f64>,
    pub(crate) values: Vec<f64>,
    pub(crate) shape: Shape,
}

impl SolvedModel {
    pub(crate) fn value(&self, item: usize, lane: usize, tier: usize) -> f64 {
        self.values[self.shape.flat(item, lane, tier)]
    }

    fn without_values(status: SolveStatus, shape: Shape) -> SolvedModel {
        SolvedModel {
            status,
            objective_value: None,
            values: Vec::new(),
            shape,
        }
    }
}

/// Hands the model to CBC and maps the outcome.
///
/// # Errors
///
/// Returns [`SolverUnavailable`] only when the backend fails abnormally;
/// an infeasible or unbounded model is a success value carrying that
/// status.
pub fn solve(model: Model, options: &SolveOptions) -> Result<SolvedModel, SolverUnavailable> {
    let Model {
        vars,
        table,
        tier_loads: _,
        constraints,
        objective,
    } = model;

    let mut solver = vars.maximise(objective.clone()).using(coin_cbc);
    solver.set_parameter("loglevel", &options.log_level.to_string());
    if let Some(limit) = options.time_limit {
        solver.set_parameter("seconds", &limit.as_secs_f64().to_string());
    }
    let solver = constraints.into_iter().fold(solver, |solver, c| solver.with(c));

    tracing::info!(variables = table.vars.len(), "handing model to cbc");
    match solver.solve() {
        Ok(solution) => match solution.status() {
            SolutionStatus::Optimal => {
                let values = table.vars.iter().map(|&var| solution.value(var)).collect();
                let objective_value = objective.eval_with(&solution);
                tracing::info!(objective = objective_value, "proven optimum found");
                Ok(SolvedModel {
                    status: SolveStatus::Optimal,
                    objective_value: Some(objective_value),
                    values,
                    shape: table.shape,
                })
            }
            _ => {
                tracing::info!("solver stopped without a proven optimum");
                Ok(SolvedModel::without_values(SolveStatus::Undefined, table.shape))
            }
        },
        Err(ResolutionError::Infeasible) => {
            tracing::info!("model is infeasible");
            Ok(SolvedModel::without_values(SolveStatus::Infeasible, table.shape))
        }
        Err(ResolutionError::Unbounded) => {
            tracing::info!("model is unbounded");
            Ok(SolvedModel::without_values(SolveStatus::Unbounded, table.shape))
        }
        Err(error) => Err(SolverUnavailable {
            reason: error.to_string(),
        }),
    }
}
