//! Decision and aggregate variable construction.

use std::collections::HashMap;

use crate::models::{ShiftType, Worker};
use crate::solver::model::{CmpOp, CpModel, LinearExpr, VarId};
use crate::solver::result::SolverError;

/// Lookup failure on a variable accessor.
///
/// Constraints tolerate this for tuples that were never created (for
/// example an unknown shift type id from an external record); anywhere else
/// it indicates a programming bug.
#[derive(Debug, Clone, thiserror::Error)]
#[error("no {kind} variable for worker '{worker_id}', period {period:?}, shift type {shift_type_id:?}")]
pub struct VariableLookupError {
    pub kind: &'static str,
    pub worker_id: String,
    pub period: Option<usize>,
    pub shift_type_id: Option<String>,
}

/// All solver variables for one run, keyed by domain ids.
#[derive(Debug, Default)]
pub struct SolverVariables {
    assignment: HashMap<(String, usize, String), VarId>,
    shift_counts: HashMap<(String, String), VarId>,
    undesirable_totals: HashMap<String, VarId>,
}

impl SolverVariables {
    /// The binary assignment variable `x[w, p, s]`.
    pub fn assignment(
        &self,
        worker_id: &str,
        period: usize,
        shift_type_id: &str,
    ) -> Result<VarId, VariableLookupError> {
        self.assignment
            .get(&(worker_id.to_string(), period, shift_type_id.to_string()))
            .copied()
            .ok_or_else(|| VariableLookupError {
                kind: "assignment",
                worker_id: worker_id.to_string(),
                period: Some(period),
                shift_type_id: Some(shift_type_id.to_string()),
            })
    }

    /// The integer counter `count[w, s] = sum_p x[w, p, s]`.
    pub fn count(
        &self,
        worker_id: &str,
        shift_type_id: &str,
    ) -> Result<VarId, VariableLookupError> {
        self.shift_counts
            .get(&(worker_id.to_string(), shift_type_id.to_string()))
            .copied()
            .ok_or_else(|| VariableLookupError {
                kind: "count",
                worker_id: worker_id.to_string(),
                period: None,
                shift_type_id: Some(shift_type_id.to_string()),
            })
    }

    /// The integer counter of assignments to undesirable shift types.
    pub fn undesirable_total(&self, worker_id: &str) -> Result<VarId, VariableLookupError> {
        self.undesirable_totals
            .get(worker_id)
            .copied()
            .ok_or_else(|| VariableLookupError {
                kind: "undesirable_total",
                worker_id: worker_id.to_string(),
                period: None,
                shift_type_id: None,
            })
    }

    /// Iterates every assignment tuple in unspecified order.
    pub fn assignment_tuples(&self) -> impl Iterator<Item = (&str, usize, &str, VarId)> {
        self.assignment
            .iter()
            .map(|((w, p, s), var)| (w.as_str(), *p, s.as_str(), *var))
    }

    pub fn num_assignment_vars(&self) -> usize {
        self.assignment.len()
    }
}

/// Builds all decision and aggregate variables and their linking equalities.
pub struct VariableBuilder<'a> {
    model: &'a mut CpModel,
    workers: &'a [Worker],
    shift_types: &'a [ShiftType],
    num_periods: usize,
}

impl<'a> VariableBuilder<'a> {
    pub fn new(
        model: &'a mut CpModel,
        workers: &'a [Worker],
        shift_types: &'a [ShiftType],
        num_periods: usize,
    ) -> Result<Self, SolverError> {
        if workers.is_empty() {
            return Err(SolverError::InvalidInput(
                "workers list cannot be empty".to_string(),
            ));
        }
        if shift_types.is_empty() {
            return Err(SolverError::InvalidInput(
                "shift_types list cannot be empty".to_string(),
            ));
        }
        if num_periods == 0 {
            return Err(SolverError::InvalidInput(
                "num_periods must be positive".to_string(),
            ));
        }
        Ok(Self {
            model,
            workers,
            shift_types,
            num_periods,
        })
    }

    pub fn build(self) -> SolverVariables {
        let Self {
            model,
            workers,
            shift_types,
            num_periods,
        } = self;

        let mut variables = SolverVariables::default();

        for worker in workers {
            for period in 0..num_periods {
                for shift_type in shift_types {
                    let name = format!("assign_{}_p{}_{}", worker.id, period, shift_type.id);
                    let var = model.new_bool_var(name);
                    variables
                        .assignment
                        .insert((worker.id.clone(), period, shift_type.id.clone()), var);
                }
            }
        }

        for worker in workers {
            for shift_type in shift_types {
                let name = format!("count_{}_{}", worker.id, shift_type.id);
                let count = model.new_int_var(0, num_periods as i64, name);
                variables
                    .shift_counts
                    .insert((worker.id.clone(), shift_type.id.clone()), count);

                // count == sum_p x[w, p, s]
                let mut link = LinearExpr::from(count);
                for period in 0..num_periods {
                    let var =
                        variables.assignment[&(worker.id.clone(), period, shift_type.id.clone())];
                    link.add_term(-1, var);
                }
                model.add_linear(link, CmpOp::Eq, 0);
            }
        }

        let undesirable_ids: Vec<String> = shift_types
            .iter()
            .filter(|s| s.is_undesirable)
            .map(|s| s.id.clone())
            .collect();
        let max_undesirable = num_periods as i64 * undesirable_ids.len().max(1) as i64;

        for worker in workers {
            let name = format!("undesirable_total_{}", worker.id);
            let total = model.new_int_var(0, max_undesirable, name);
            variables
                .undesirable_totals
                .insert(worker.id.clone(), total);

            let mut link = LinearExpr::from(total);
            for period in 0..num_periods {
                for shift_id in &undesirable_ids {
                    let var = variables.assignment[&(worker.id.clone(), period, shift_id.clone())];
                    link.add_term(-1, var);
                }
            }
            // With no undesirable shift types this pins the total to 0.
            model.add_linear(link, CmpOp::Eq, 0);
        }

        variables
    }
}
