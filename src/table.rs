//! Console rendering of a solved assignment.

use crate::input::Problem;
use crate::report::Report;

/// Renders the assignment as a grid: one row per (lane, item) pair, one
/// column per tier in order, each cell the weight contributed by that pair
/// to that tier. Returns `None` when the report carries no assignment.
pub fn render(problem: &Problem, report: &Report) -> Option<String> {
    let assignment = report.assignment.as_ref()?;

    let mut header = vec!["lane, item".to_owned()];
    header.extend(problem.tiers.iter().cloned());

    let mut rows = vec![header];
    for lane in &problem.lanes {
        for item in &problem.items {
            let mut row = vec![format!("{lane}, {}", item.name)];
            for tier in &problem.tiers {
                let bit = assignment[tier][&item.name][lane];
                row.push(format!("{}", f64::from(bit) * item.weight));
            }
            rows.push(row);
        }
    }

    let widths: Vec<usize> = (0..rows[0].len())
        .map(|column| rows.iter().map(|row| row[column].len()).max().unwrap_or(0))
        .collect();

    let separator = widths
        .iter()
        .map(|width| "-".repeat(width + 2))
        .fold(String::from("+"), |line, dashes| line + &dashes + "+");

    let mut out = String::new();
    out.push_str(&separator);
    out.push('\n');
    for (index, row) in rows.iter().enumerate() {
        out.push('|');
        for (cell, &width) in row.iter().zip(&widths) {
            out.push_str(&format!(" {cell:<width$} |"));
        }
        out.push('\n');
        if index == 0 {
            out.push_str(&separator);
            out.push('\n');
        }
    }
    out.push_str(&separator);
    out.push('\n');

    Some(out)
}
