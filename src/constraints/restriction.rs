//! Restriction constraint: workers never take shifts they are barred from.

use crate::constraints::context::ConstraintContext;
use crate::constraints::ConstraintInstance;
use crate::solver::model::{CmpOp, CpModel, LinearExpr};
use crate::solver::variables::SolverVariables;

/// Pins `x[w, p, s] = 0` for every shift type in each worker's
/// `restricted_shifts`, and for every shift type whose
/// `required_attributes` the worker does not carry. Restrictions naming
/// unknown shift types are silently ignored.
pub(crate) fn apply(
    _instance: &mut ConstraintInstance,
    model: &mut CpModel,
    variables: &SolverVariables,
    ctx: &ConstraintContext<'_>,
) {
    for worker in ctx.workers {
        for shift_type_id in &worker.restricted_shifts {
            for period in 0..ctx.num_periods {
                let Ok(var) = variables.assignment(&worker.id, period, shift_type_id) else {
                    continue;
                };
                model.add_linear(LinearExpr::from(var), CmpOp::Eq, 0);
            }
        }

        for shift_type in ctx.shift_types {
            if worker_meets_attributes(worker, shift_type) {
                continue;
            }
            for period in 0..ctx.num_periods {
                let Ok(var) = variables.assignment(&worker.id, period, &shift_type.id) else {
                    continue;
                };
                model.add_linear(LinearExpr::from(var), CmpOp::Eq, 0);
            }
        }
    }
}

/// Whether the worker carries every attribute the shift type demands.
pub(crate) fn worker_meets_attributes(
    worker: &crate::models::Worker,
    shift_type: &crate::models::ShiftType,
) -> bool {
    shift_type
        .required_attributes
        .iter()
        .all(|(key, value)| worker.attributes.get(key) == Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::testing::{build_context, solve, vars_for, TestSetup};
    use crate::constraints::{ConstraintConfig, ConstraintKind};

    #[test]
    fn restricted_worker_never_assigned() {
        let mut setup = TestSetup::default();
        setup.workers[0].restricted_shifts.insert("night".to_string());

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        let mut instance =
            ConstraintInstance::new(ConstraintKind::Restriction, ConstraintConfig::hard());
        instance.apply(&mut model, &variables, &ctx);

        // Ask for as much work as possible to make sure the pin holds under
        // pressure.
        let all_vars: Vec<_> = variables.assignment_tuples().map(|(_, _, _, v)| v).collect();
        let mut objective = LinearExpr::new();
        for var in all_vars {
            objective.add_term(-1, var);
        }
        model.minimize(objective);

        let solver = solve(&model);
        for period in 0..setup.num_periods() {
            let x = variables.assignment("W001", period, "night").unwrap();
            assert_eq!(solver.value(x), Some(0));
            let day = variables.assignment("W001", period, "day").unwrap();
            assert_eq!(solver.value(day), Some(1));
        }
    }

    #[test]
    fn missing_required_attribute_blocks_assignment() {
        let mut setup = TestSetup::default();
        setup.shift_types[1]
            .required_attributes
            .insert("certification".to_string(), "icu".to_string());
        setup.workers[0]
            .attributes
            .insert("certification".to_string(), "icu".to_string());
        // W002 and W003 lack the certification entirely.

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        let mut instance =
            ConstraintInstance::new(ConstraintKind::Restriction, ConstraintConfig::hard());
        instance.apply(&mut model, &variables, &ctx);

        let mut objective = LinearExpr::new();
        for (_, _, _, var) in variables.assignment_tuples() {
            objective.add_term(-1, var);
        }
        model.minimize(objective);

        let solver = solve(&model);
        for period in 0..setup.num_periods() {
            for worker_id in ["W002", "W003"] {
                let x = variables.assignment(worker_id, period, "night").unwrap();
                assert_eq!(solver.value(x), Some(0));
            }
            let x = variables.assignment("W001", period, "night").unwrap();
            assert_eq!(solver.value(x), Some(1));
        }
    }

    #[test]
    fn unknown_restricted_shift_ignored() {
        let mut setup = TestSetup::default();
        setup.workers[0]
            .restricted_shifts
            .insert("ghost_shift".to_string());

        let mut model = CpModel::new();
        let variables = vars_for(&mut model, &setup);
        let ctx = build_context(&setup);

        let mut instance =
            ConstraintInstance::new(ConstraintKind::Restriction, ConstraintConfig::hard());
        instance.apply(&mut model, &variables, &ctx);

        let solver = solve(&model);
        assert!(solver.value(variables.assignment("W001", 0, "day").unwrap()).is_some());
    }
}
