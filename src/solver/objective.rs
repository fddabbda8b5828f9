//! Objective assembly from soft-constraint violations.

use crate::constraints::ConstraintInstance;
use crate::solver::model::{CpModel, LinearExpr};

/// Folds every applied soft constraint into a single weighted objective:
/// `minimize sum_c weight_c * sum_v priority_c(v) * v`.
#[derive(Debug, Default)]
pub struct ObjectiveBuilder {
    terms: Vec<(i64, crate::solver::model::VarId)>,
}

impl ObjectiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the violation indicators of an applied constraint.
    ///
    /// Must be called after `apply`; the instance's weight multiplies each
    /// violation's own priority.
    pub fn add_constraint(&mut self, constraint: &ConstraintInstance) {
        let weight = constraint.weight();
        for (name, var) in constraint.violation_variables() {
            let priority = constraint.violation_priority(name);
            self.terms.push((weight * priority, *var));
        }
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Posts the minimize objective; with no violation terms the model is
    /// left without an objective (pure satisfaction).
    pub fn build(&self, model: &mut CpModel) -> bool {
        if self.terms.is_empty() {
            return false;
        }
        let mut expr = LinearExpr::new();
        for (coefficient, var) in &self.terms {
            expr.add_term(*coefficient, *var);
        }
        model.minimize(expr);
        true
    }
}
