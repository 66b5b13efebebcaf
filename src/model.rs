use good_lp::{Constraint, Expression, ProblemVariables, Variable, variable, variables};

use crate::input::Problem;

/// Axis sizes of one run's variable space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Shape {
    pub items: usize,
    pub lanes: usize,
    pub tiers: usize,
}

impl Shape {
    pub(crate) fn of(problem: &Problem) -> Shape {
        Shape {
            items: problem.items.len(),
            lanes: problem.lanes.len(),
            tiers: problem.tiers.len(),
        }
    }

    /// Flat offset of the (item, lane, tier) triple. Iteration order is
    /// item-major, then lane, then tier.
    pub(crate) fn flat(&self, item: usize, lane: usize, tier: usize) -> usize {
        debug_assert!(item < self.items && lane < self.lanes && tier < self.tiers);
        (item * self.lanes + lane) * self.tiers + tier
    }

    pub(crate) fn len(&self) -> usize {
        self.items * self.lanes * self.tiers
    }
}

/// Dense arena of assignment variables, one per (item, lane, tier).
pub(crate) struct VarTable {
    pub shape: Shape,
    pub vars: Vec<Variable>,
}

impl VarTable {
    pub(crate) fn get(&self, item: usize, lane: usize, tier: usize) -> Variable {
        self.vars[self.shape.flat(item, lane, tier)]
    }
}

/// An assembled optimization model: variables, per-tier load expressions,
/// the ordered constraint set, and the objective. Immutable once built;
/// consumed by the solver adapter.
pub struct Model {
    pub(crate) vars: ProblemVariables,
    pub(crate) table: VarTable,
    pub(crate) tier_loads: Vec<Expression>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: Expression,
}

/// Builds the model for a validated problem.
///
/// Cannot fail: every input precondition is established by
/// [`crate::input::RawProblem::validate`].
pub fn build(problem: &Problem) -> Model {
    let shape = Shape::of(problem);

    // All variables up front, in arena order.
    let mut vars = variables!();
    let mut table = Vec::with_capacity(shape.len());
    for _ in 0..shape.len() {
        table.push(vars.add(variable().binary()));
    }
    let table = VarTable { shape, vars: table };

    let tier_loads: Vec<Expression> = (0..shape.tiers)
        .map(|tier| {
            problem
                .items
                .iter()
                .enumerate()
                .fold(Expression::from(0.0), |load, (item, spec)| {
                    (0..shape.lanes)
                        .fold(load, |load, lane| load + table.get(item, lane, tier) * spec.weight)
                })
        })
        .collect();

    let mut constraints = Vec::new();

    // Each (item, lane) pair lands in exactly one tier.
    for item in 0..shape.items {
        for lane in 0..shape.lanes {
            let placed = (0..shape.tiers)
                .fold(Expression::from(0.0), |sum, tier| sum + table.get(item, lane, tier));
            constraints.push(placed.eq(1.0));
        }
    }

    // At most one item per (lane, tier) cell, summed over every item.
    for lane in 0..shape.lanes {
        for tier in 0..shape.tiers {
            let occupied = (0..shape.items)
                .fold(Expression::from(0.0), |sum, item| sum + table.get(item, lane, tier));
            constraints.push(occupied.leq(1.0));
        }
    }

    // Load bounds: each tier, then the aggregate.
    for load in &tier_loads {
        constraints.push(load.clone().geq(0.0));
    }
    let total = tier_loads
        .iter()
        .fold(Expression::from(0.0), |sum, load| sum + load.clone());
    constraints.push(total.geq(0.0));

    // Loads must not increase along the tier order.
    for pair in tier_loads.windows(2) {
        constraints.push((pair[0].clone() - pair[1].clone()).geq(0.0));
    }

    // Maximizing the negated sum of consecutive drops telescopes to
    // minimizing load(first) - load(last), so the solver squeezes the
    // extreme tiers together while the ordering constraints hold.
    let objective = tier_loads
        .windows(2)
        .fold(Expression::from(0.0), |sum, pair| {
            sum + (pair[1].clone() - pair[0].clone())
        });

    tracing::debug!(
        variables = table.vars.len(),
        constraints = constraints.len(),
        "assembled model"
    );

    Model {
        vars,
        table,
        tier_loads,
        constraints,
        objective,
    }
}
