//! Balance weighted assignments across ordered tiers.
//!
//! Given named, weighted items, an ordered sequence of tiers, and a set of
//! lanes, `tierpack` decides which (item, lane) pair lands in which tier so
//! that every pair is placed exactly once, no two items share a (lane,
//! tier) cell, and the per-tier weighted loads form a non-increasing
//! sequence whose extremes are as close together as possible.
//!
//! The problem is formulated as a mixed-integer program and solved with
//! CBC through [`good_lp`]. One run is a pure pipeline with no shared
//! state: validate the raw payload, build the model, solve, project the
//! result.
//!
//! ```no_run
//! use tierpack::{RawProblem, SolveOptions};
//!
//! let payload: RawProblem = serde_yaml::from_str(
//!     r#"
//!     items: [alpha, beta]
//!     weights: [10, 10]
//!     tiers: [front, back]
//!     lanes: [solo]
//!     "#,
//! )?;
//! let report = tierpack::optimize(payload, &SolveOptions::default())?;
//! println!("{}", serde_yaml::to_string(&report)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use thiserror::Error;

pub mod api;
pub mod config;
pub mod input;
pub mod model;
pub mod report;
pub mod solve;
pub mod table;

pub use input::{InputError, Item, Problem, RawProblem, RawWeight};
pub use report::{Assignment, BINARY_TOLERANCE, PrecisionWarning, Report};
pub use solve::{SolveOptions, SolveStatus, SolvedModel, SolverUnavailable};

/// Fatal pipeline failure: either the payload never became a model, or the
/// solver backend could not run. Infeasible and unbounded models are *not*
/// errors; they come back as a [`Report`] with that status.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Solver(#[from] SolverUnavailable),
}

/// Builds, solves, and projects one validated problem.
///
/// # Errors
///
/// Returns [`SolverUnavailable`] if the backend fails abnormally.
pub fn run(problem: &Problem, options: &SolveOptions) -> Result<Report, SolverUnavailable> {
    let model = model::build(problem);
    let solved = solve::solve(model, options)?;
    Ok(report::project(problem, &solved))
}

/// Full pipeline from the raw wire payload to the domain report.
pub fn optimize(payload: RawProblem, options: &SolveOptions) -> Result<Report, Error> {
    let problem = payload.validate()?;
    Ok(run(&problem, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use std::fs::{read_dir, read_to_string};
    use std::path::Path;

    const TOLERANCE: f64 = 1e-6;

    /// Expected outcome listed under the `expect:` key of a test file.
    #[derive(Debug, Deserialize)]
    struct Expected {
        expect: Expect,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Expect {
        status: SolveStatus,
        #[serde(default)]
        loads_by_tier: Option<BTreeMap<String, f64>>,
        #[serde(default)]
        total_difference: Option<f64>,
    }

    // Runs one scenario file: everything above `expect:` is the raw
    // problem payload, the rest is the expected outcome.
    fn run_test_file(test_file: &Path) {
        println!("Running test for file: {:?}", test_file);

        let failure_message = format!("Failed to read test file: {}", test_file.display());
        let yaml_content = read_to_string(test_file).expect(&failure_message);

        let parts: Vec<&str> = yaml_content.split("expect:").collect();

        let failure_message = format!("Failed to parse payload: {}", test_file.display());
        let payload_yaml = parts.first().expect("No payload found in test file").trim();
        let payload: RawProblem = serde_yaml::from_str(payload_yaml).expect(&failure_message);

        let failure_message = format!("Failed to parse expectation: {}", test_file.display());
        let expected_yaml = format!("expect:{}", parts.get(1).expect(&failure_message));
        let expected: Expected = serde_yaml::from_str(&expected_yaml).expect(&failure_message);
        let expect = expected.expect;

        let failure_message = format!("Failed to validate payload: {}", test_file.display());
        let problem = payload.validate().expect(&failure_message);

        let failure_message = format!("Failed to solve: {}", test_file.display());
        let report = run(&problem, &SolveOptions::default()).expect(&failure_message);

        assert_eq!(report.status, expect.status, "{}", test_file.display());

        if expect.status == SolveStatus::Optimal {
            assert_solution_invariants(&problem, &report, test_file);

            if let Some(expected_loads) = &expect.loads_by_tier {
                let loads = report.loads_by_tier.as_ref().unwrap();
                for (tier, expected_load) in expected_loads {
                    let load = loads[tier];
                    assert!(
                        (load - expected_load).abs() < TOLERANCE,
                        "{}: tier {tier} load {load}, expected {expected_load}",
                        test_file.display()
                    );
                }
            }
            if let Some(expected_difference) = expect.total_difference {
                let difference = report.total_difference.unwrap();
                assert!(
                    (difference - expected_difference).abs() < TOLERANCE,
                    "{}: total difference {difference}, expected {expected_difference}",
                    test_file.display()
                );
            }
        } else {
            assert_eq!(report.objective_value, None, "{}", test_file.display());
            assert_eq!(report.loads_by_tier, None, "{}", test_file.display());
            assert_eq!(report.total_difference, None, "{}", test_file.display());
            assert_eq!(report.assignment, None, "{}", test_file.display());
        }
    }

    // The contract every optimal solution must honor, checked directly on
    // the projected report.
    fn assert_solution_invariants(problem: &Problem, report: &Report, test_file: &Path) {
        let file = test_file.display();
        let assignment = report.assignment.as_ref().unwrap();
        let loads = report.loads_by_tier.as_ref().unwrap();

        // Every (item, lane) pair placed exactly once.
        for item in &problem.items {
            for lane in &problem.lanes {
                let placements: u32 = problem
                    .tiers
                    .iter()
                    .map(|tier| u32::from(assignment[tier][&item.name][lane]))
                    .sum();
                assert_eq!(
                    placements, 1,
                    "{file}: {}/{lane} placed {placements} times",
                    item.name
                );
            }
        }

        // No two items share a (lane, tier) cell.
        for lane in &problem.lanes {
            for tier in &problem.tiers {
                let occupants: u32 = problem
                    .items
                    .iter()
                    .map(|item| u32::from(assignment[tier][&item.name][lane]))
                    .sum();
                assert!(occupants <= 1, "{file}: {occupants} items in {lane}/{tier}");
            }
        }

        // Loads non-negative and non-increasing along the tier order.
        let ordered: Vec<f64> = problem.tiers.iter().map(|tier| loads[tier]).collect();
        let mut total = 0.0;
        for load in &ordered {
            assert!(*load >= -TOLERANCE, "{file}: negative load {load}");
            total += load;
        }
        assert!(total >= -TOLERANCE, "{file}: negative aggregate load {total}");
        for pair in ordered.windows(2) {
            assert!(
                pair[0] >= pair[1] - TOLERANCE,
                "{file}: loads increase from {} to {}",
                pair[0],
                pair[1]
            );
        }

        // The consecutive differences telescope to first minus last, and
        // the solver's objective is their negated sum.
        let difference = report.total_difference.unwrap();
        let telescoped = ordered.first().unwrap() - ordered.last().unwrap();
        assert!(
            (difference - telescoped).abs() < TOLERANCE,
            "{file}: total difference {difference} != first - last {telescoped}"
        );
        let objective = report.objective_value.unwrap();
        assert!(
            (objective + difference).abs() < TOLERANCE,
            "{file}: objective {objective} != negated difference {difference}"
        );
    }

    #[test]
    fn run_all_test_files() {
        let test_data_dir = Path::new("test_data");
        let mut entries: Vec<_> = read_dir(test_data_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.is_file() && path.extension().map(|ext| ext == "yaml").unwrap_or(false)
            })
            .collect();

        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        for path in entries {
            run_test_file(&path);
        }
    }

    #[test]
    fn zero_tiers_is_rejected_before_any_solve() {
        let payload: RawProblem = serde_yaml::from_str(
            r#"
            items: [alpha]
            weights: [10]
            tiers: []
            lanes: [solo]
            "#,
        )
        .unwrap();

        let err = optimize(payload, &SolveOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Input(InputError::NoTiers)));
    }

    #[test]
    fn declared_count_mismatch_is_rejected_before_any_solve() {
        let payload: RawProblem = serde_yaml::from_str(
            r#"
            itemCount: 3
            items: [alpha, beta]
            weights: [10, 20]
            tiers: [front]
            lanes: [solo]
            "#,
        )
        .unwrap();

        let err = optimize(payload, &SolveOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Input(InputError::CountMismatch { .. })
        ));
    }
}
